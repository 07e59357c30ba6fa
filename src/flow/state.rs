//! Flow cursor state machine.

use std::fmt;

/// Position of a flow in its sequence of screens.
///
/// ```text
/// idle ──start──→ active(0) ──advance──→ active(1) … ──advance──→ finished
///   │                 │
///   └──cancel──→ cancelled ←──cancel───┘      finish: active(i) → finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Active {
        index: usize,
    },
    Finished,
    Cancelled,
}

/// A requested move of the flow cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Start,
    Advance,
    Finish,
    Cancel,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Finished | FlowState::Cancelled)
    }

    pub fn is_active(self) -> bool {
        matches!(self, FlowState::Active { .. })
    }

    /// Index of the mounted screen, if any.
    pub fn index(self) -> Option<usize> {
        match self {
            FlowState::Active { index } => Some(index),
            _ => None,
        }
    }

    /// Where `step` leads from here in a flow of `len` screens.
    ///
    /// `None` means the step is not allowed from this state.
    pub fn next(self, step: FlowStep, len: usize) -> Option<FlowState> {
        match (self, step) {
            (FlowState::Idle, FlowStep::Start) if len > 0 => Some(FlowState::Active { index: 0 }),
            (FlowState::Active { index }, FlowStep::Advance) => {
                if index + 1 < len {
                    Some(FlowState::Active { index: index + 1 })
                } else {
                    Some(FlowState::Finished)
                }
            }
            (FlowState::Active { .. }, FlowStep::Finish) => Some(FlowState::Finished),
            (FlowState::Idle | FlowState::Active { .. }, FlowStep::Cancel) => {
                Some(FlowState::Cancelled)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Idle => write!(f, "idle"),
            FlowState::Active { index } => write!(f, "active({index})"),
            FlowState::Finished => write!(f, "finished"),
            FlowState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::Start => "start",
            FlowStep::Advance => "advance",
            FlowStep::Finish => "finish",
            FlowStep::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_start_enters_first_screen() {
        let next = FlowState::Idle.next(FlowStep::Start, 3);
        assert_eq!(next, Some(FlowState::Active { index: 0 }));
    }

    #[test]
    fn empty_flow_cannot_start() {
        assert_eq!(FlowState::Idle.next(FlowStep::Start, 0), None);
    }

    #[test]
    fn advance_walks_then_finishes() {
        let mut state = FlowState::Idle.next(FlowStep::Start, 3).unwrap();
        let mut seen = vec![state];
        while !state.is_terminal() {
            state = state.next(FlowStep::Advance, 3).unwrap();
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                FlowState::Active { index: 0 },
                FlowState::Active { index: 1 },
                FlowState::Active { index: 2 },
                FlowState::Finished,
            ]
        );
    }

    #[test]
    fn finish_ends_early() {
        let state = FlowState::Active { index: 0 };
        assert_eq!(state.next(FlowStep::Finish, 5), Some(FlowState::Finished));
    }

    #[test]
    fn cancel_from_idle_and_active() {
        assert_eq!(
            FlowState::Idle.next(FlowStep::Cancel, 1),
            Some(FlowState::Cancelled)
        );
        assert_eq!(
            FlowState::Active { index: 2 }.next(FlowStep::Cancel, 3),
            Some(FlowState::Cancelled)
        );
    }

    #[test]
    fn terminal_states_reject_everything() {
        for state in [FlowState::Finished, FlowState::Cancelled] {
            for step in [
                FlowStep::Start,
                FlowStep::Advance,
                FlowStep::Finish,
                FlowStep::Cancel,
            ] {
                assert_eq!(state.next(step, 3), None, "{state} / {step}");
            }
        }
    }

    #[test]
    fn idle_cannot_advance_or_finish() {
        assert_eq!(FlowState::Idle.next(FlowStep::Advance, 2), None);
        assert_eq!(FlowState::Idle.next(FlowStep::Finish, 2), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(FlowState::Active { index: 4 }.to_string(), "active(4)");
        assert_eq!(FlowState::Cancelled.to_string(), "cancelled");
        assert_eq!(FlowStep::Finish.to_string(), "finish");
    }
}

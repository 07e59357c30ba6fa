//! Flow units: ordered sequences of screens with a cursor.
//!
//! A flow mounts one unit at a time. Moving the cursor always releases the
//! previous unit before the next one is built; finishing or cancelling
//! releases everything.

mod state;
mod unit;

pub use state::{FlowState, FlowStep};
pub use unit::{FlowSpec, FlowUnit};

use crate::error::{FlowError, RoutingError};
use crate::router::Trigger;

/// What a mounted unit may ask of its owning flow.
///
/// Units only ever hold this as a `Weak<dyn FlowControl>`.
pub trait FlowControl {
    fn advance(&self) -> Result<FlowState, FlowError>;

    fn finish(&self) -> Result<FlowState, FlowError>;

    fn cancel(&self) -> Result<FlowState, FlowError>;

    /// Ask the navigator above the flow to dispatch `trigger`.
    fn navigate(&self, trigger: Trigger) -> Result<(), RoutingError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use std::sync::Arc;

    use crate::deps::LogSurfaceProvider;
    use crate::mvi::{Intent, ViewState};
    use crate::router::{Navigator, RouteId};
    use crate::unit::{factory, Effects, Postbox, Screen, UnitEnv};

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug, Clone, PartialEq)]
    struct Label(&'static str);
    impl ViewState for Label {}

    #[derive(Debug)]
    struct Noop;
    impl Intent for Noop {}

    struct Step {
        label: &'static str,
        log: Log,
    }

    impl Screen for Step {
        type State = Label;
        type Intent = Noop;
        const NAME: &'static str = "step";

        fn view_state(&self) -> Label {
            Label(self.label)
        }

        fn handle(&mut self, _intent: Noop, _fx: &mut Effects<'_>) {}

        fn on_release(&mut self) {
            self.log.borrow_mut().push(format!("release:{}", self.label));
        }
    }

    fn step(label: &'static str, log: &Log) -> crate::unit::UnitFactory {
        let log = Rc::clone(log);
        factory(move |_| {
            log.borrow_mut().push(format!("mount:{label}"));
            Step {
                label,
                log: Rc::clone(&log),
            }
        })
    }

    struct Refusing(RefCell<Vec<String>>);

    impl Navigator for Refusing {
        fn navigate(&self, trigger: Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
            self.0.borrow_mut().push(trigger.to_string());
            Err(RoutingError::UnresolvedTrigger {
                trigger: trigger.to_string(),
            })
        }
    }

    fn env(postbox: &Postbox) -> UnitEnv {
        UnitEnv::new(postbox, Arc::new(LogSurfaceProvider))
    }

    fn detached_navigator() -> Weak<dyn Navigator> {
        Weak::<Refusing>::new()
    }

    fn three_steps(log: &Log) -> Rc<FlowSpec> {
        Rc::new(
            FlowSpec::new("wizard")
                .step(step("a", log))
                .step(step("b", log))
                .step(step("c", log)),
        )
    }

    #[test]
    fn three_unit_flow_releases_before_creating() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let flow = FlowUnit::new(
            RouteId::from("wizard"),
            three_steps(&log),
            env(&postbox),
            None,
            detached_navigator(),
        );

        let mut states = vec![flow.start().unwrap()];
        states.push(flow.advance().unwrap());
        states.push(flow.advance().unwrap());
        states.push(flow.advance().unwrap());

        assert_eq!(
            states,
            vec![
                FlowState::Active { index: 0 },
                FlowState::Active { index: 1 },
                FlowState::Active { index: 2 },
                FlowState::Finished,
            ]
        );
        assert_eq!(
            *log.borrow(),
            vec![
                "mount:a", "release:a", "mount:b", "release:b", "mount:c", "release:c"
            ]
        );
        assert!(flow.current().is_none());
        assert_eq!(flow.mounted(), 3);
    }

    #[test]
    fn only_one_unit_alive_at_a_time() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let flow = FlowUnit::new(
            RouteId::from("wizard"),
            three_steps(&log),
            env(&postbox),
            None,
            detached_navigator(),
        );

        flow.start().unwrap();
        let first = flow.current().unwrap();
        flow.advance().unwrap();
        assert!(first.is_released());
        assert!(!flow.current().unwrap().is_released());
    }

    #[test]
    fn terminal_flow_rejects_steps() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let flow = FlowUnit::new(
            RouteId::from("wizard"),
            three_steps(&log),
            env(&postbox),
            None,
            detached_navigator(),
        );
        flow.start().unwrap();
        assert_eq!(flow.cancel().unwrap(), FlowState::Cancelled);
        assert_eq!(*log.borrow(), vec!["mount:a", "release:a"]);

        let err = flow.advance().unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidTransition {
                from: FlowState::Cancelled,
                step: FlowStep::Advance,
                ..
            }
        ));
    }

    #[test]
    fn empty_flow_fails_to_start() {
        let postbox = Postbox::new();
        let flow = FlowUnit::new(
            RouteId::from("nothing"),
            Rc::new(FlowSpec::new("nothing")),
            env(&postbox),
            None,
            detached_navigator(),
        );
        assert!(matches!(flow.start(), Err(FlowError::Empty { .. })));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn failed_handoff_is_reported() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let navigator = Rc::new(Refusing(RefCell::new(Vec::new())));
        let weak: Weak<dyn Navigator> = Rc::downgrade(&navigator) as Weak<dyn Navigator>;
        let spec = Rc::new(FlowSpec::new("once").step(step("a", &log)).then("next"));
        let flow = FlowUnit::new(RouteId::from("once"), spec, env(&postbox), None, weak);

        flow.start().unwrap();
        let err = flow.finish().unwrap_err();
        assert!(matches!(err, FlowError::Handoff { .. }));
        assert_eq!(flow.state(), FlowState::Finished);
        assert_eq!(*navigator.0.borrow(), vec!["next"]);
    }

    #[test]
    fn navigate_without_navigator_is_detached() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let flow = FlowUnit::new(
            RouteId::from("wizard"),
            three_steps(&log),
            env(&postbox),
            None,
            detached_navigator(),
        );
        let err = flow.navigate(Trigger::from("home")).unwrap_err();
        assert!(matches!(err, RoutingError::Detached));
    }

    #[test]
    fn dropping_flow_releases_live_unit() {
        let postbox = Postbox::new();
        let log: Log = Rc::default();
        let flow = FlowUnit::new(
            RouteId::from("wizard"),
            three_steps(&log),
            env(&postbox),
            None,
            detached_navigator(),
        );
        flow.start().unwrap();
        drop(flow);
        assert_eq!(*log.borrow(), vec!["mount:a", "release:a"]);
    }
}

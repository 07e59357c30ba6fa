//! Reducer for the application lifecycle.

use crate::mvi::Reducer;

use super::intent::LifecycleEvent;
use super::state::LifecycleState;

/// Reducer for lifecycle state transitions.
///
/// Pure function. Navigation and event forwarding are handled by the root
/// around the dispatch call.
pub struct LifecycleReducer;

impl Reducer for LifecycleReducer {
    type State = LifecycleState;
    type Intent = LifecycleEvent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        use LifecycleState::*;

        match (state, intent) {
            (Terminated, _) => Terminated,

            (NotRunning, LifecycleEvent::Launch(_)) => Active,
            (other, LifecycleEvent::Launch(_)) => other,

            (Background, LifecycleEvent::Foreground) => Active,
            (other, LifecycleEvent::Foreground) => other,

            (Active, LifecycleEvent::Background) => Background,
            (other, LifecycleEvent::Background) => other,

            (_, LifecycleEvent::Terminate) => Terminated,

            // Opening a link or continuing an activity brings the app forward.
            (_, LifecycleEvent::Continue(_) | LifecycleEvent::OpenUrl(_)) => Active,
        }
    }
}

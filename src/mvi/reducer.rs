//! Reducer trait.

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where the state transition happens.
/// It must be a pure function: (State, Intent) -> State
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// The intent type this reducer handles.
    type Intent;

    /// Process an intent and return the new state.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}

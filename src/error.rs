//! Error types for every layer of the unit hierarchy.
//!
//! Errors only travel upwards as values. Dependency failures stop at the
//! screen that made the call and become view state; routing and flow
//! failures are always returned to whoever asked for the transition.

use thiserror::Error;

use crate::config::ConfigError;
use crate::flow::{FlowState, FlowStep};
use crate::router::RouteId;

/// Failures while resolving or dispatching a navigation trigger.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No route table entry matches the trigger.
    #[error("no route resolves trigger '{trigger}'")]
    UnresolvedTrigger { trigger: String },

    /// The route resolved but its flow refused to start.
    #[error("route '{route}' rejected the transition: {source}")]
    FlowRejected {
        route: RouteId,
        #[source]
        source: Box<FlowError>,
    },

    /// The navigator that should receive the trigger has been torn down.
    #[error("navigator is no longer attached")]
    Detached,
}

impl RoutingError {
    /// Short machine-readable kind, used in logs and view state.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::UnresolvedTrigger { .. } => "unresolved_trigger",
            RoutingError::FlowRejected { .. } => "flow_rejected",
            RoutingError::Detached => "detached",
        }
    }
}

/// Failures of the flow state machine.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("flow '{route}' cannot {step} while {from}")]
    InvalidTransition {
        route: RouteId,
        from: FlowState,
        step: FlowStep,
    },

    #[error("flow '{route}' has no screens")]
    Empty { route: RouteId },

    /// The flow finished but its follow-up route could not be dispatched.
    #[error("flow '{route}' finished but hand-off failed: {source}")]
    Handoff {
        route: RouteId,
        #[source]
        source: Box<RoutingError>,
    },
}

/// A navigation request issued by a screen that could not be carried out.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The unit has no owning flow (mounted standalone or already released).
    #[error("unit is not attached to a flow")]
    Detached,
}

/// Failures surfaced by business-logic dependencies.
///
/// Always caught at the screen boundary and translated into view state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("{service} is unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    #[error("'{what}' not found")]
    NotFound { what: String },

    #[error("invalid credentials for '{user}'")]
    Rejected { user: String },

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Failures while wiring the object graph.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("no implementation provided for interface {interface}")]
    MissingDependency { interface: &'static str },

    #[error("route '{route}' is claimed by both router '{first}' and router '{second}'")]
    DuplicateRoute {
        route: RouteId,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Misuse of the substitution environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("environment accessed before inject()")]
    NotInjected,

    #[error("environment was already injected")]
    AlreadyInjected,

    #[error("no flow is active")]
    NoActiveFlow,

    #[error("no live unit for screen '{screen}'")]
    UnitNotFound { screen: &'static str },

    #[error("no router named '{name}'")]
    RouterNotFound { name: String },

    #[error("intent for screen '{screen}' was dropped: owner released")]
    IntentDropped { screen: &'static str },

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_trigger_names_the_trigger() {
        let err = RoutingError::UnresolvedTrigger {
            trigger: "logout".to_string(),
        };
        assert_eq!(err.to_string(), "no route resolves trigger 'logout'");
        assert_eq!(err.kind(), "unresolved_trigger");
    }

    #[test]
    fn invalid_transition_message() {
        let err = FlowError::InvalidTransition {
            route: RouteId::from("login"),
            from: FlowState::Finished,
            step: FlowStep::Advance,
        };
        assert_eq!(
            err.to_string(),
            "flow 'login' cannot advance while finished"
        );
    }

    #[test]
    fn navigation_error_wraps_routing_transparently() {
        let err: NavigationError = RoutingError::Detached.into();
        assert_eq!(err.to_string(), "navigator is no longer attached");
    }
}

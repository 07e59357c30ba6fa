//! Routing units: deterministic trigger → flow resolution.
//!
//! Resolution never falls back silently. A trigger whose route key is not in
//! any table is an [`UnresolvedTrigger`](crate::error::RoutingError) error;
//! recovering from it is the root's decision, not the router's.

mod routing;
mod switchboard;
mod trigger;

use std::rc::Rc;

pub use routing::{Route, RoutePolicy, RouterPlan, RoutingUnit};
pub use switchboard::Switchboard;
pub use trigger::{RouteId, Transition, Trigger};

use crate::error::RoutingError;
use crate::flow::FlowUnit;

/// Whatever sits above a flow and can dispatch triggers on its behalf.
///
/// Flows hold their navigator weakly.
pub trait Navigator {
    fn navigate(&self, trigger: Trigger) -> Result<Rc<FlowUnit>, RoutingError>;
}

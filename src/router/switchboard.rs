use std::cell::Cell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::{Navigator, RouteId, RouterPlan, RoutingUnit, Trigger};
use crate::app::LifecycleEvent;
use crate::error::{CompositionError, RoutingError};
use crate::flow::FlowUnit;
use crate::unit::UnitEnv;

/// Every router of the app, with route claims partitioned between them.
///
/// Exactly one router is in the foreground. Dispatching to a route owned by
/// another router cancels the old foreground router's active flow, so only
/// one presentation context is ever live.
pub struct Switchboard {
    routers: Vec<Rc<RoutingUnit>>,
    foreground: Cell<Option<usize>>,
}

impl Switchboard {
    /// Fails with [`CompositionError::DuplicateRoute`] when two plans claim
    /// the same route id.
    pub fn new(plans: Vec<RouterPlan>, env: UnitEnv) -> Result<Rc<Self>, CompositionError> {
        let mut claims: HashMap<RouteId, String> = HashMap::new();
        for plan in &plans {
            for route in plan.routes() {
                if let Some(first) = claims.insert(route.id().clone(), plan.name().to_string()) {
                    return Err(CompositionError::DuplicateRoute {
                        route: route.id().clone(),
                        first,
                        second: plan.name().to_string(),
                    });
                }
            }
        }

        Ok(Rc::new_cyclic(|me: &Weak<Switchboard>| {
            let navigator: Weak<dyn Navigator> = me.clone();
            let routers = plans
                .into_iter()
                .map(|plan| Rc::new(RoutingUnit::new(plan, env.clone(), navigator.clone())))
                .collect();
            Self {
                routers,
                foreground: Cell::new(None),
            }
        }))
    }

    pub fn routers(&self) -> &[Rc<RoutingUnit>] {
        &self.routers
    }

    pub fn router(&self, name: &str) -> Option<Rc<RoutingUnit>> {
        self.routers
            .iter()
            .find(|router| router.name() == name)
            .cloned()
    }

    /// The router that dispatched last.
    pub fn foreground(&self) -> Option<Rc<RoutingUnit>> {
        self.foreground
            .get()
            .and_then(|index| self.routers.get(index))
            .cloned()
    }

    pub fn resolve(&self, trigger: &Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
        let (_, router) = self.claimant(trigger)?;
        router.resolve(trigger)
    }

    pub fn dispatch(&self, trigger: &Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
        let (index, router) = self.claimant(trigger)?;
        let flow = router.dispatch(trigger)?;

        let previous = self.foreground.replace(Some(index));
        if let Some(previous) = previous.filter(|previous| *previous != index) {
            if let Some(old) = self.routers.get(previous) {
                tracing::info!(from = old.name(), to = router.name(), "Foreground router changed");
                old.cancel_active();
            }
        }
        Ok(flow)
    }

    pub fn active_flow(&self) -> Option<Rc<FlowUnit>> {
        self.foreground()?.active_flow()
    }

    pub fn lifecycle(&self, event: &LifecycleEvent) {
        if let Some(router) = self.foreground() {
            router.lifecycle(event);
        }
    }

    pub fn teardown(&self) {
        self.foreground.set(None);
        for router in &self.routers {
            router.teardown();
        }
    }

    fn claimant(&self, trigger: &Trigger) -> Result<(usize, Rc<RoutingUnit>), RoutingError> {
        self.routers
            .iter()
            .enumerate()
            .find(|(_, router)| router.claims(trigger))
            .map(|(index, router)| (index, Rc::clone(router)))
            .ok_or_else(|| {
                tracing::warn!(trigger = %trigger, "Unresolved trigger");
                RoutingError::UnresolvedTrigger {
                    trigger: trigger.to_string(),
                }
            })
    }
}

impl Navigator for Switchboard {
    fn navigate(&self, trigger: Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
        self.dispatch(&trigger)
    }
}

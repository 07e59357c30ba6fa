use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::{Navigator, RouteId, Trigger};
use crate::app::LifecycleEvent;
use crate::error::{FlowError, RoutingError};
use crate::flow::{FlowControl, FlowSpec, FlowState, FlowUnit};
use crate::unit::UnitEnv;

/// How a route maps triggers onto flow instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePolicy {
    /// Every dispatch gets a fresh flow; the previous one is cancelled.
    PerTrigger,
    /// Reuse the live flow while it has not finished or been cancelled.
    #[default]
    Singleton,
}

/// One route table entry.
#[derive(Debug, Clone)]
pub struct Route {
    id: RouteId,
    spec: Rc<FlowSpec>,
    policy: RoutePolicy,
}

impl Route {
    pub fn new(id: impl Into<RouteId>, spec: FlowSpec, policy: RoutePolicy) -> Self {
        Self {
            id: id.into(),
            spec: Rc::new(spec),
            policy,
        }
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn policy(&self) -> RoutePolicy {
        self.policy
    }
}

/// Route table for one router, built before wiring.
#[derive(Debug, Clone)]
pub struct RouterPlan {
    name: String,
    routes: Vec<Route>,
}

impl RouterPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, route: Route) -> Self {
        self.add(route);
        self
    }

    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Resolves triggers to flows and owns every live flow of its table.
pub struct RoutingUnit {
    name: String,
    table: BTreeMap<RouteId, Route>,
    live: RefCell<BTreeMap<RouteId, Rc<FlowUnit>>>,
    active: RefCell<Option<RouteId>>,
    env: UnitEnv,
    navigator: Weak<dyn Navigator>,
}

impl RoutingUnit {
    pub(crate) fn new(plan: RouterPlan, env: UnitEnv, navigator: Weak<dyn Navigator>) -> Self {
        let table = plan
            .routes
            .into_iter()
            .map(|route| (route.id.clone(), route))
            .collect();
        Self {
            name: plan.name,
            table,
            live: RefCell::new(BTreeMap::new()),
            active: RefCell::new(None),
            env,
            navigator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> Vec<RouteId> {
        self.table.keys().cloned().collect()
    }

    /// Whether this router's table has an entry for the trigger.
    pub fn claims(&self, trigger: &Trigger) -> bool {
        trigger
            .route_key()
            .is_some_and(|key| self.table.contains_key(key))
    }

    /// Map a trigger to the flow that should handle it, applying the route's
    /// policy. Read-only: a singleton's live flow is returned as is, anything
    /// else is a fresh idle flow that nothing owns yet.
    pub fn resolve(&self, trigger: &Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
        let route = trigger
            .route_key()
            .and_then(|key| self.table.get(key))
            .ok_or_else(|| RoutingError::UnresolvedTrigger {
                trigger: trigger.to_string(),
            })?;

        if route.policy == RoutePolicy::Singleton {
            if let Some(flow) = self.flow(&route.id).filter(|flow| !flow.state().is_terminal()) {
                tracing::debug!(router = %self.name, route = %route.id, "Reusing live flow");
                return Ok(flow);
            }
        }

        tracing::debug!(
            router = %self.name,
            route = %route.id,
            policy = ?route.policy,
            trigger = %trigger,
            "Resolved trigger"
        );
        Ok(FlowUnit::new(
            route.id.clone(),
            Rc::clone(&route.spec),
            self.env.clone(),
            Some(trigger.clone()),
            self.navigator.clone(),
        ))
    }

    /// Resolve, cancel the previously active flow if it differs, start the
    /// resolved flow if idle and make it the active one.
    ///
    /// A flow that cannot start is rejected before anything is cancelled.
    pub fn dispatch(&self, trigger: &Trigger) -> Result<Rc<FlowUnit>, RoutingError> {
        let flow = self.resolve(trigger)?;
        let fresh = flow.state() == FlowState::Idle;
        if fresh {
            flow.can_start().map_err(|source| rejected(&flow, source))?;
        }

        if let Some(previous) = self.active_flow() {
            if !Rc::ptr_eq(&previous, &flow) {
                cancel(&previous);
            }
        }

        if fresh {
            let replaced = self
                .live
                .borrow_mut()
                .insert(flow.route().clone(), Rc::clone(&flow));
            if let Some(replaced) = replaced {
                cancel(&replaced);
            }
            if let Err(source) = flow.start() {
                self.live.borrow_mut().remove(flow.route());
                self.active.borrow_mut().take();
                return Err(rejected(&flow, source));
            }
        }
        *self.active.borrow_mut() = Some(flow.route().clone());
        self.prune();
        tracing::info!(router = %self.name, route = %flow.route(), state = %flow.state(), "Dispatched");
        Ok(flow)
    }

    /// The flow currently presenting for this router.
    pub fn active_flow(&self) -> Option<Rc<FlowUnit>> {
        let active = self.active.borrow().clone()?;
        self.flow(&active).filter(|flow| flow.state().is_active())
    }

    /// The live flow for a route, if one exists.
    pub fn flow(&self, route: &RouteId) -> Option<Rc<FlowUnit>> {
        self.live.borrow().get(route).cloned()
    }

    /// Cancel the active flow and forget it.
    pub fn cancel_active(&self) {
        if let Some(flow) = self.active_flow() {
            cancel(&flow);
        }
        self.active.borrow_mut().take();
        self.prune();
    }

    pub fn lifecycle(&self, event: &LifecycleEvent) {
        if let Some(flow) = self.active_flow() {
            flow.lifecycle(event);
        }
    }

    /// Cancel and drop every live flow.
    pub fn teardown(&self) {
        self.active.borrow_mut().take();
        let flows: Vec<Rc<FlowUnit>> = std::mem::take(&mut *self.live.borrow_mut())
            .into_values()
            .collect();
        for flow in &flows {
            cancel(flow);
        }
        tracing::debug!(router = %self.name, flows = flows.len(), "Router torn down");
    }

    fn prune(&self) {
        self.live
            .borrow_mut()
            .retain(|_, flow| !flow.state().is_terminal());
    }
}

fn rejected(flow: &FlowUnit, source: FlowError) -> RoutingError {
    RoutingError::FlowRejected {
        route: flow.route().clone(),
        source: Box::new(source),
    }
}

fn cancel(flow: &FlowUnit) {
    if flow.state().is_terminal() {
        return;
    }
    if let Err(error) = flow.cancel() {
        tracing::warn!(route = %flow.route(), error = %error, "Failed to cancel flow");
    }
}

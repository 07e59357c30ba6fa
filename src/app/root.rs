use std::cell::RefCell;
use std::rc::Rc;

use super::lifecycle::{Activity, LaunchOptions, LifecycleEvent, LifecycleReducer, LifecycleState};
use crate::deps::Dependencies;
use crate::error::RoutingError;
use crate::flow::FlowUnit;
use crate::mvi::dispatch_mvi;
use crate::router::{RouteId, Switchboard, Transition, Trigger};
use crate::unit::{Postbox, PumpReport};

/// Outcome of a lenient navigation through the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The trigger resolved to `route`.
    Direct { route: RouteId },
    /// The trigger did not resolve; the fallback route was dispatched.
    Fallback { requested: String, route: RouteId },
    /// The app has terminated; nothing happened.
    Ignored,
}

impl Navigation {
    /// The route that ended up presenting, if any.
    pub fn route(&self) -> Option<&RouteId> {
        match self {
            Navigation::Direct { route } | Navigation::Fallback { route, .. } => Some(route),
            Navigation::Ignored => None,
        }
    }
}

/// Top of the ownership tree.
///
/// Owns the switchboard (and through it every router, flow and unit), the
/// completion postbox and the resolved dependency table. Built once by
/// [`CompositionFactory`](crate::compose::CompositionFactory) and passed
/// around explicitly.
pub struct RootUnit {
    switchboard: Rc<Switchboard>,
    postbox: Postbox,
    dependencies: Dependencies,
    lifecycle: RefCell<LifecycleState>,
    initial_route: RouteId,
    fallback_route: Option<RouteId>,
}

impl RootUnit {
    pub fn new(
        switchboard: Rc<Switchboard>,
        postbox: Postbox,
        dependencies: Dependencies,
        initial_route: RouteId,
        fallback_route: Option<RouteId>,
    ) -> Self {
        Self {
            switchboard,
            postbox,
            dependencies,
            lifecycle: RefCell::new(LifecycleState::NotRunning),
            initial_route,
            fallback_route,
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.lifecycle.borrow()
    }

    pub fn switchboard(&self) -> &Rc<Switchboard> {
        &self.switchboard
    }

    pub fn postbox(&self) -> &Postbox {
        &self.postbox
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn initial_route(&self) -> &RouteId {
        &self.initial_route
    }

    pub fn fallback_route(&self) -> Option<&RouteId> {
        self.fallback_route.as_ref()
    }

    pub fn active_flow(&self) -> Option<Rc<FlowUnit>> {
        self.switchboard.active_flow()
    }

    /// Launch into the deep link if one was given, otherwise the initial
    /// route. A second launch is ignored.
    pub fn launch(&self, options: LaunchOptions) -> Result<Navigation, RoutingError> {
        if self.lifecycle_state() != LifecycleState::NotRunning {
            tracing::debug!(state = %self.lifecycle_state(), "Launch ignored");
            return Ok(Navigation::Ignored);
        }
        let event = LifecycleEvent::Launch(options.clone());
        self.reduce(&event);

        let navigation = match options.url {
            Some(url) => self.navigate(Trigger::Link(url))?,
            None => {
                let flow = self.dispatch(Trigger::Route(self.initial_route.clone()))?;
                Navigation::Direct {
                    route: flow.route().clone(),
                }
            }
        };
        self.switchboard.lifecycle(&event);
        Ok(navigation)
    }

    pub fn enter_foreground(&self) -> LifecycleState {
        self.forward(LifecycleEvent::Foreground)
    }

    pub fn enter_background(&self) -> LifecycleState {
        self.forward(LifecycleEvent::Background)
    }

    /// Forward termination, then tear every router down.
    pub fn terminate(&self) -> LifecycleState {
        if self.lifecycle_state() == LifecycleState::Terminated {
            return LifecycleState::Terminated;
        }
        let state = self.forward(LifecycleEvent::Terminate);
        self.switchboard.teardown();
        self.postbox.pump();
        tracing::info!("Application terminated");
        state
    }

    /// Route a platform activity by its kind, payload included.
    pub fn continue_activity(&self, activity: Activity) -> Result<Navigation, RoutingError> {
        if self.is_terminated() {
            return Ok(Navigation::Ignored);
        }
        let event = LifecycleEvent::Continue(activity.clone());
        self.reduce(&event);
        let trigger = Transition::new(activity.kind)
            .from_source("activity")
            .with_payload(activity.payload);
        let navigation = self.navigate(trigger)?;
        self.switchboard.lifecycle(&event);
        Ok(navigation)
    }

    pub fn open_url(&self, url: impl Into<String>) -> Result<Navigation, RoutingError> {
        if self.is_terminated() {
            return Ok(Navigation::Ignored);
        }
        let url = url.into();
        let event = LifecycleEvent::OpenUrl(url.clone());
        self.reduce(&event);
        let navigation = self.navigate(Trigger::Link(url))?;
        self.switchboard.lifecycle(&event);
        Ok(navigation)
    }

    /// Strict dispatch: unresolved triggers are returned as errors.
    pub fn dispatch(&self, trigger: impl Into<Trigger>) -> Result<Rc<FlowUnit>, RoutingError> {
        self.switchboard.dispatch(&trigger.into())
    }

    /// Lenient dispatch: an unresolved trigger falls back to the configured
    /// fallback route when there is one.
    pub fn navigate(&self, trigger: impl Into<Trigger>) -> Result<Navigation, RoutingError> {
        if self.is_terminated() {
            return Ok(Navigation::Ignored);
        }
        let trigger = trigger.into();
        match self.switchboard.dispatch(&trigger) {
            Ok(flow) => Ok(Navigation::Direct {
                route: flow.route().clone(),
            }),
            Err(RoutingError::UnresolvedTrigger { trigger: requested }) => {
                let Some(fallback) = self.fallback_route.clone() else {
                    return Err(RoutingError::UnresolvedTrigger { trigger: requested });
                };
                tracing::warn!(requested = %requested, fallback = %fallback, "Falling back");
                let flow = self.switchboard.dispatch(&Trigger::Route(fallback))?;
                Ok(Navigation::Fallback {
                    requested,
                    route: flow.route().clone(),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Deliver queued dependency completions.
    pub fn pump(&self) -> PumpReport {
        self.postbox.pump()
    }

    fn is_terminated(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Terminated
    }

    fn forward(&self, event: LifecycleEvent) -> LifecycleState {
        if self.is_terminated() {
            tracing::debug!(event = event.name(), "Lifecycle event after termination ignored");
            return LifecycleState::Terminated;
        }
        let state = self.reduce(&event);
        self.switchboard.lifecycle(&event);
        state
    }

    fn reduce(&self, event: &LifecycleEvent) -> LifecycleState {
        let mut state = self.lifecycle.borrow_mut();
        let before = *state;
        dispatch_mvi!(*state, LifecycleReducer, event.clone());
        if before != *state {
            tracing::info!(from = %before, to = %*state, event = event.name(), "Lifecycle changed");
        }
        *state
    }
}

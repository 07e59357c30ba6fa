use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::{FlowControl, FlowState, FlowStep};
use crate::app::LifecycleEvent;
use crate::error::{FlowError, RoutingError};
use crate::router::{Navigator, RouteId, Trigger};
use crate::unit::{Mount, UnitEnv, UnitFactory, UnitRef};

/// Ordered recipe for a flow: one factory per screen, plus an optional
/// follow-up route dispatched when the flow finishes.
#[derive(Clone)]
pub struct FlowSpec {
    name: String,
    steps: Vec<UnitFactory>,
    then: Option<RouteId>,
}

impl FlowSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            then: None,
        }
    }

    pub fn step(mut self, factory: UnitFactory) -> Self {
        self.steps.push(factory);
        self
    }

    /// Hand off to `route` once this flow finishes.
    pub fn then(mut self, route: impl Into<RouteId>) -> Self {
        self.then = Some(route.into());
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for FlowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowSpec")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("then", &self.then)
            .finish()
    }
}

/// Drives one sequence of screens. Owns at most one live unit at a time.
pub struct FlowUnit {
    route: RouteId,
    spec: Rc<FlowSpec>,
    env: UnitEnv,
    trigger: Option<Trigger>,
    navigator: Weak<dyn Navigator>,
    me: Weak<FlowUnit>,
    state: Cell<FlowState>,
    current: RefCell<Option<UnitRef>>,
    mounted: Cell<usize>,
}

impl FlowUnit {
    pub fn new(
        route: RouteId,
        spec: Rc<FlowSpec>,
        env: UnitEnv,
        trigger: Option<Trigger>,
        navigator: Weak<dyn Navigator>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            route,
            spec,
            env,
            trigger,
            navigator,
            me: me.clone(),
            state: Cell::new(FlowState::Idle),
            current: RefCell::new(None),
            mounted: Cell::new(0),
        })
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    pub fn spec(&self) -> &FlowSpec {
        &self.spec
    }

    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    /// The trigger this flow was created for.
    pub fn trigger(&self) -> Option<&Trigger> {
        self.trigger.as_ref()
    }

    /// The live unit, if the flow is active.
    pub fn current(&self) -> Option<UnitRef> {
        self.current.borrow().clone()
    }

    /// Units mounted over the flow's whole life.
    pub fn mounted(&self) -> usize {
        self.mounted.get()
    }

    pub fn start(&self) -> Result<FlowState, FlowError> {
        self.step(FlowStep::Start)
    }

    /// Whether [`FlowUnit::start`] would be accepted. Touches nothing.
    pub fn can_start(&self) -> Result<(), FlowError> {
        if self.spec.is_empty() {
            return Err(FlowError::Empty {
                route: self.route.clone(),
            });
        }
        let from = self.state.get();
        match from.next(FlowStep::Start, self.spec.len()) {
            Some(_) => Ok(()),
            None => Err(FlowError::InvalidTransition {
                route: self.route.clone(),
                from,
                step: FlowStep::Start,
            }),
        }
    }

    /// Forward a lifecycle event to the live unit.
    pub fn lifecycle(&self, event: &LifecycleEvent) {
        let current = self.current();
        if let Some(unit) = current {
            unit.lifecycle(event);
        }
    }

    fn step(&self, step: FlowStep) -> Result<FlowState, FlowError> {
        if step == FlowStep::Start {
            self.can_start()?;
        }
        let from = self.state.get();
        let to = from
            .next(step, self.spec.len())
            .ok_or_else(|| FlowError::InvalidTransition {
                route: self.route.clone(),
                from,
                step,
            })?;

        self.release_current();
        self.state.set(to);
        tracing::info!(route = %self.route, from = %from, to = %to, "Flow transition");

        match to {
            FlowState::Active { index } => self.mount(index)?,
            FlowState::Finished => self.hand_off()?,
            FlowState::Idle | FlowState::Cancelled => {}
        }
        Ok(to)
    }

    fn mount(&self, index: usize) -> Result<(), FlowError> {
        let factory = self
            .spec
            .steps
            .get(index)
            .cloned()
            .ok_or_else(|| FlowError::Empty {
                route: self.route.clone(),
            })?;
        let flow: Weak<dyn FlowControl> = self.me.clone();
        let mount = Mount::in_flow(self.env.clone(), flow, self.trigger.clone());
        let unit = factory(&mount);
        self.mounted.set(self.mounted.get() + 1);
        *self.current.borrow_mut() = Some(unit);
        Ok(())
    }

    fn release_current(&self) {
        let previous = self.current.borrow_mut().take();
        if let Some(unit) = previous {
            unit.release();
        }
    }

    fn hand_off(&self) -> Result<(), FlowError> {
        let Some(next) = self.spec.then.clone() else {
            return Ok(());
        };
        tracing::debug!(route = %self.route, next = %next, "Flow handing off");
        let handoff_failed = |source: RoutingError| FlowError::Handoff {
            route: self.route.clone(),
            source: Box::new(source),
        };
        let navigator = self
            .navigator
            .upgrade()
            .ok_or_else(|| handoff_failed(RoutingError::Detached))?;
        navigator
            .navigate(Trigger::Route(next))
            .map(drop)
            .map_err(handoff_failed)
    }
}

impl FlowControl for FlowUnit {
    fn advance(&self) -> Result<FlowState, FlowError> {
        self.step(FlowStep::Advance)
    }

    fn finish(&self) -> Result<FlowState, FlowError> {
        self.step(FlowStep::Finish)
    }

    fn cancel(&self) -> Result<FlowState, FlowError> {
        self.step(FlowStep::Cancel)
    }

    fn navigate(&self, trigger: Trigger) -> Result<(), RoutingError> {
        let navigator = self.navigator.upgrade().ok_or(RoutingError::Detached)?;
        navigator.navigate(trigger).map(drop)
    }
}

impl fmt::Debug for FlowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowUnit")
            .field("route", &self.route)
            .field("state", &self.state.get())
            .field("spec", &self.spec)
            .finish()
    }
}

impl Drop for FlowUnit {
    fn drop(&mut self) {
        self.release_current();
    }
}

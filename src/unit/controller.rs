//! The generic logic unit: one screen's business logic plus the binding that
//! presents it and the child units embedded in it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::binding::{view_state_channel, IntentTarget, PresentationBinding, ViewStatePublisher};
use super::mailbox::{Completion, Courier, Delivery, DiscardReason, Reply, Tickets};
use super::{LogicUnit, Mount, UnitFactory, UnitId, UnitRef};
use crate::app::LifecycleEvent;
use crate::error::NavigationError;
use crate::flow::FlowControl;
use crate::mvi::{Intent, ViewState};
use crate::router::Trigger;

/// The business half of a logic unit.
///
/// A screen owns its internal state and the dependencies it was constructed
/// with. It derives a view state and reacts to intents; everything else
/// (binding, children, tickets, flow link) is handled by [`Controller`].
pub trait Screen: 'static {
    type State: ViewState;
    type Intent: Intent;

    /// Stable screen name, used for surfaces, logs and lookups.
    const NAME: &'static str;

    /// Pure derivation from internal state and dependency snapshots.
    fn view_state(&self) -> Self::State;

    fn handle(&mut self, intent: Self::Intent, fx: &mut Effects<'_>);

    /// A dependency answered an earlier [`Effects::reply`].
    fn on_completion(&mut self, _completion: Completion, _fx: &mut Effects<'_>) {}

    /// A child unit called [`Effects::signal_parent`].
    fn on_child_signal(&mut self, _from: &'static str, _topic: &'static str, _fx: &mut Effects<'_>) {}

    fn on_lifecycle(&mut self, _event: &LifecycleEvent, _fx: &mut Effects<'_>) {}

    /// A navigation request made during the last event failed.
    fn on_navigation_failed(&mut self, _error: &NavigationError) {}

    /// The owning flow or parent released this unit.
    fn on_release(&mut self) {}
}

#[derive(Debug)]
enum Request {
    Advance,
    Finish,
    Cancel,
    Navigate(Trigger),
    SignalParent(&'static str),
    RefreshChildren,
}

/// Side-effect collector handed to a screen while it handles an event.
///
/// Navigation requests are queued and carried out after the new view state
/// has been published.
pub struct Effects<'a> {
    unit: UnitId,
    courier: &'a Courier,
    tickets: &'a mut Tickets,
    requests: Vec<Request>,
}

impl<'a> Effects<'a> {
    fn new(unit: UnitId, courier: &'a Courier, tickets: &'a mut Tickets) -> Self {
        Self {
            unit,
            courier,
            tickets,
            requests: Vec::new(),
        }
    }

    /// Issue a reply handle for an asynchronous dependency call.
    pub fn reply<T: Send + 'static>(&mut self) -> Reply<T> {
        let ticket = self.tickets.issue();
        Reply::new(self.unit, ticket, self.courier.clone())
    }

    /// Forget every outstanding reply; their results will be discarded.
    pub fn discard_pending(&mut self) -> usize {
        self.tickets.discard_all()
    }

    pub fn advance(&mut self) {
        self.requests.push(Request::Advance);
    }

    pub fn finish(&mut self) {
        self.requests.push(Request::Finish);
    }

    pub fn cancel(&mut self) {
        self.requests.push(Request::Cancel);
    }

    pub fn navigate(&mut self, trigger: impl Into<Trigger>) {
        self.requests.push(Request::Navigate(trigger.into()));
    }

    pub fn signal_parent(&mut self, topic: &'static str) {
        self.requests.push(Request::SignalParent(topic));
    }

    pub fn refresh_children(&mut self) {
        self.requests.push(Request::RefreshChildren);
    }

    fn into_requests(self) -> Vec<Request> {
        self.requests
    }
}

/// Owns one screen, its presentation binding and its child units.
pub struct Controller<S: Screen> {
    id: UnitId,
    screen: RefCell<S>,
    binding: PresentationBinding<S::State, S::Intent>,
    publisher: ViewStatePublisher<S::State>,
    children: RefCell<Vec<UnitRef>>,
    tickets: RefCell<Tickets>,
    courier: Courier,
    parent: Option<Weak<dyn LogicUnit>>,
    flow: Option<Weak<dyn FlowControl>>,
    released: Cell<bool>,
}

impl<S: Screen> Controller<S> {
    /// Mount a screen: bind its presentation, register it for completions,
    /// build its children and publish the first view state.
    pub fn mount(screen: S, mount: &Mount, children: &[UnitFactory]) -> Rc<Self> {
        let id = UnitId::next();
        let env = mount.env();
        let binding = PresentationBinding::new(id, S::NAME, env.surfaces.surface(S::NAME));
        let (publisher, stream) = view_state_channel();
        binding.bind(stream);

        let controller = Rc::new(Self {
            id,
            screen: RefCell::new(screen),
            binding,
            publisher,
            children: RefCell::new(Vec::new()),
            tickets: RefCell::new(Tickets::default()),
            courier: env.courier.clone(),
            parent: mount.parent.clone(),
            flow: mount.flow.clone(),
            released: Cell::new(false),
        });

        let weak = Rc::downgrade(&controller);
        let target: Weak<dyn IntentTarget<S::Intent>> = weak.clone();
        controller.binding.on_intent(target);
        let unit: Weak<dyn LogicUnit> = weak;
        env.directory.register(id, unit.clone());

        let child_mount = mount.child_of(unit);
        let built: Vec<UnitRef> = children.iter().map(|make| make(&child_mount)).collect();
        *controller.children.borrow_mut() = built;

        tracing::debug!(
            unit = %id,
            screen = S::NAME,
            children = controller.children.borrow().len(),
            "Mounted unit"
        );
        controller.publish();
        controller
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn view_state(&self) -> S::State {
        self.screen.borrow().view_state()
    }

    pub fn binding(&self) -> &PresentationBinding<S::State, S::Intent> {
        &self.binding
    }

    /// Number of asynchronous replies still awaited.
    pub fn pending_replies(&self) -> usize {
        self.tickets.borrow().pending()
    }

    /// First child unit mounted from screen type `C`.
    pub fn child<C: Screen>(&self) -> Option<Rc<Controller<C>>> {
        let children = self.children.borrow().clone();
        children.into_iter().find_map(super::downcast::<C>)
    }

    /// Run a screen callback with an effect collector, then publish and
    /// carry out the queued requests. No-op once released.
    fn with_effects(&self, event: impl FnOnce(&mut S, &mut Effects<'_>)) {
        if self.released.get() {
            return;
        }
        let requests = {
            let mut tickets = self.tickets.borrow_mut();
            let mut fx = Effects::new(self.id, &self.courier, &mut tickets);
            let mut screen = self.screen.borrow_mut();
            event(&mut *screen, &mut fx);
            fx.into_requests()
        };
        self.publish();
        self.run(requests);
    }

    fn publish(&self) {
        if self.released.get() {
            return;
        }
        let state = self.screen.borrow().view_state();
        if self.publisher.publish(state) {
            self.binding.sync();
        }
    }

    fn run(&self, requests: Vec<Request>) {
        for request in requests {
            if self.released.get() {
                tracing::debug!(unit = %self.id, request = ?request, "Request after release skipped");
                continue;
            }
            if let Err(error) = self.run_one(request) {
                tracing::warn!(
                    unit = %self.id,
                    screen = S::NAME,
                    error = %error,
                    "Navigation request failed"
                );
                if !self.released.get() {
                    self.screen.borrow_mut().on_navigation_failed(&error);
                    self.publish();
                }
            }
        }
    }

    fn run_one(&self, request: Request) -> Result<(), NavigationError> {
        match request {
            Request::SignalParent(topic) => {
                if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                    parent.child_signal(S::NAME, topic);
                }
                Ok(())
            }
            Request::RefreshChildren => {
                let children = self.children.borrow().clone();
                for child in children {
                    child.refresh();
                }
                Ok(())
            }
            Request::Advance => self.flow()?.advance().map(drop).map_err(Into::into),
            Request::Finish => self.flow()?.finish().map(drop).map_err(Into::into),
            Request::Cancel => self.flow()?.cancel().map(drop).map_err(Into::into),
            Request::Navigate(trigger) => self.flow()?.navigate(trigger).map_err(Into::into),
        }
    }

    fn flow(&self) -> Result<Rc<dyn FlowControl>, NavigationError> {
        self.flow
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(NavigationError::Detached)
    }
}

impl<S: Screen> IntentTarget<S::Intent> for Controller<S> {
    fn handle_intent(&self, intent: S::Intent) {
        if self.released.get() {
            tracing::debug!(unit = %self.id, screen = S::NAME, "Intent after release ignored");
            return;
        }
        tracing::trace!(unit = %self.id, screen = S::NAME, intent = ?intent, "Handling intent");
        self.with_effects(|screen, fx| screen.handle(intent, fx));
    }
}

impl<S: Screen> LogicUnit for Controller<S> {
    fn id(&self) -> UnitId {
        self.id
    }

    fn name(&self) -> &'static str {
        S::NAME
    }

    fn is_released(&self) -> bool {
        self.released.get()
    }

    fn release(&self) {
        if self.released.replace(true) {
            return;
        }
        let children: Vec<UnitRef> = self.children.borrow_mut().drain(..).collect();
        for child in children.iter().rev() {
            child.release();
        }
        drop(children);

        let discarded = self.tickets.borrow_mut().discard_all();
        self.screen.borrow_mut().on_release();
        self.binding.detach();
        tracing::debug!(
            unit = %self.id,
            screen = S::NAME,
            discarded_replies = discarded,
            "Released unit"
        );
    }

    fn children(&self) -> Vec<UnitRef> {
        self.children.borrow().clone()
    }

    fn deliver(&self, completion: Completion) -> Delivery {
        if self.released.get() {
            return Delivery::Discarded(DiscardReason::Released);
        }
        if !self.tickets.borrow_mut().settle(completion.ticket()) {
            return Delivery::Discarded(DiscardReason::StaleTicket);
        }
        self.with_effects(|screen, fx| screen.on_completion(completion, fx));
        Delivery::Applied
    }

    fn child_signal(&self, from: &'static str, topic: &'static str) {
        self.with_effects(|screen, fx| screen.on_child_signal(from, topic, fx));
    }

    fn refresh(&self) {
        self.publish();
    }

    fn lifecycle(&self, event: &LifecycleEvent) {
        self.with_effects(|screen, fx| screen.on_lifecycle(event, fx));
        let children = self.children.borrow().clone();
        for child in children {
            child.lifecycle(event);
        }
    }

    fn frames_rendered(&self) -> u64 {
        self.binding.frames_rendered()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

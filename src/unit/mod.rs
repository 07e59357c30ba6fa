//! Logic units and their presentation bindings.
//!
//! # Ownership
//!
//! ```text
//! FlowUnit ──owns──→ Controller<S> ──owns──→ PresentationBinding ──→ Surface
//!    ↑                   │    ↑                     │
//!    └──── weak ─────────┘    └──────── weak ───────┘ (intents)
//!                        │
//!                        └──owns──→ child Controller* ──weak──→ parent
//! ```
//!
//! Every upward edge is a `Weak`, so teardown runs leaves-first and no
//! reference cycle can keep a released unit alive.

mod binding;
mod controller;
mod mailbox;

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use binding::{
    view_state_channel, Frame, IntentTarget, PresentationBinding, Surface, SurfaceProvider,
    ViewStatePublisher, ViewStateStream,
};
pub use controller::{Controller, Effects, Screen};
pub use mailbox::{
    Completion, Courier, Delivery, DiscardReason, Postbox, PumpReport, Reply, Ticket,
};

use crate::app::LifecycleEvent;
use crate::flow::FlowControl;
use crate::router::Trigger;
use mailbox::Directory;

/// Process-unique identity of a mounted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// The interface every logic unit exposes to its owners.
///
/// Flows, parents, the postbox and the test harness only ever see a unit
/// through this trait.
pub trait LogicUnit {
    fn id(&self) -> UnitId;

    fn name(&self) -> &'static str;

    fn is_released(&self) -> bool;

    /// Release children (last first), discard pending replies and detach the
    /// binding. Idempotent.
    fn release(&self);

    fn children(&self) -> Vec<UnitRef>;

    fn deliver(&self, completion: Completion) -> Delivery;

    fn child_signal(&self, from: &'static str, topic: &'static str);

    /// Recompute and publish the view state without any event.
    fn refresh(&self);

    fn lifecycle(&self, event: &LifecycleEvent);

    fn frames_rendered(&self) -> u64;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

pub type UnitRef = Rc<dyn LogicUnit>;

/// Builds one unit on demand. Flows hold one per step, parents one per child.
pub type UnitFactory = Rc<dyn Fn(&Mount) -> UnitRef>;

/// Structural services every mounted unit needs.
#[derive(Clone)]
pub struct UnitEnv {
    courier: Courier,
    directory: Rc<Directory>,
    surfaces: Arc<dyn SurfaceProvider>,
}

impl UnitEnv {
    pub fn new(postbox: &Postbox, surfaces: Arc<dyn SurfaceProvider>) -> Self {
        Self {
            courier: postbox.courier(),
            directory: postbox.directory(),
            surfaces,
        }
    }
}

/// Where a unit is being mounted: its environment and its weak links upward.
#[derive(Clone)]
pub struct Mount {
    env: UnitEnv,
    parent: Option<Weak<dyn LogicUnit>>,
    flow: Option<Weak<dyn FlowControl>>,
    trigger: Option<Trigger>,
}

impl Mount {
    /// A mount point with no flow and no parent.
    pub fn detached(env: UnitEnv) -> Self {
        Self {
            env,
            parent: None,
            flow: None,
            trigger: None,
        }
    }

    pub(crate) fn in_flow(
        env: UnitEnv,
        flow: Weak<dyn FlowControl>,
        trigger: Option<Trigger>,
    ) -> Self {
        Self {
            env,
            parent: None,
            flow: Some(flow),
            trigger,
        }
    }

    fn child_of(&self, parent: Weak<dyn LogicUnit>) -> Self {
        Self {
            parent: Some(parent),
            ..self.clone()
        }
    }

    pub fn env(&self) -> &UnitEnv {
        &self.env
    }

    /// The navigation trigger that created the owning flow, payload included.
    pub fn trigger(&self) -> Option<&Trigger> {
        self.trigger.as_ref()
    }
}

/// Factory for a leaf unit built from `make`.
pub fn factory<S: Screen>(make: impl Fn(&Mount) -> S + 'static) -> UnitFactory {
    composite(make, Vec::new())
}

/// Factory for a unit that owns the given child units.
pub fn composite<S: Screen>(
    make: impl Fn(&Mount) -> S + 'static,
    children: Vec<UnitFactory>,
) -> UnitFactory {
    Rc::new(move |mount: &Mount| -> UnitRef { Controller::mount(make(mount), mount, &children) })
}

/// Recover the typed controller behind a unit reference.
pub fn downcast<S: Screen>(unit: UnitRef) -> Option<Rc<Controller<S>>> {
    unit.into_any().downcast::<Controller<S>>().ok()
}

/// Depth-first search for the first live unit of screen type `S`.
pub fn find<S: Screen>(root: &UnitRef) -> Option<Rc<Controller<S>>> {
    if root.name() == S::NAME {
        if let Some(found) = downcast::<S>(Rc::clone(root)) {
            return Some(found);
        }
    }
    root.children().iter().find_map(find::<S>)
}

/// The unit and every descendant, parents before children.
pub fn descendants(root: &UnitRef) -> Vec<UnitRef> {
    let mut out = vec![Rc::clone(root)];
    for child in root.children() {
        out.extend(descendants(&child));
    }
    out
}

//! Presentation bindings: the only link between a logic unit and the surface
//! that draws it.
//!
//! A binding renders whatever view states its owner publishes, in the order
//! they were produced, and forwards user intents back through a weak
//! reference. It never derives presentation state itself and never holds a
//! dependency, flow or router.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Weak;

use tokio::sync::mpsc;

use super::UnitId;
use crate::mvi::{Intent, ViewState};

/// One rendered instant, handed to the surface.
pub struct Frame<'a> {
    pub unit: UnitId,
    pub screen: &'static str,
    /// 1-based position of this frame in the binding's render order.
    pub sequence: u64,
    pub state: &'a dyn fmt::Debug,
}

/// External presentation surface. Toolkit-specific drawing lives behind it.
pub trait Surface {
    fn render(&self, frame: &Frame<'_>);

    /// Called once when the owning unit is released.
    fn dismiss(&self, _unit: UnitId, _screen: &'static str) {}
}

/// Creates one surface per mounted unit.
pub trait SurfaceProvider: Send + Sync {
    fn surface(&self, screen: &'static str) -> Box<dyn Surface>;
}

/// Receiver of user intents emitted by a binding.
pub trait IntentTarget<I> {
    fn handle_intent(&self, intent: I);
}

/// Producing half of a view-state stream, held by the logic unit.
pub struct ViewStatePublisher<S> {
    tx: mpsc::UnboundedSender<S>,
}

impl<S> ViewStatePublisher<S> {
    /// Returns false once the binding side is gone.
    pub fn publish(&self, state: S) -> bool {
        self.tx.send(state).is_ok()
    }
}

/// Consuming half of a view-state stream, bound to a presentation binding.
pub struct ViewStateStream<S> {
    rx: mpsc::UnboundedReceiver<S>,
}

/// FIFO stream of view states from one unit to one binding.
pub fn view_state_channel<S>() -> (ViewStatePublisher<S>, ViewStateStream<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ViewStatePublisher { tx }, ViewStateStream { rx })
}

pub struct PresentationBinding<S, I> {
    unit: UnitId,
    screen: &'static str,
    surface: Box<dyn Surface>,
    stream: RefCell<Option<ViewStateStream<S>>>,
    current: RefCell<Option<S>>,
    rendered: Cell<u64>,
    intents: RefCell<Option<Weak<dyn IntentTarget<I>>>>,
}

impl<S: ViewState, I: Intent> PresentationBinding<S, I> {
    pub fn new(unit: UnitId, screen: &'static str, surface: Box<dyn Surface>) -> Self {
        Self {
            unit,
            screen,
            surface,
            stream: RefCell::new(None),
            current: RefCell::new(None),
            rendered: Cell::new(0),
            intents: RefCell::new(None),
        }
    }

    pub fn screen(&self) -> &'static str {
        self.screen
    }

    /// Attach the stream of view states to render. Replaces any earlier one.
    pub fn bind(&self, stream: ViewStateStream<S>) {
        *self.stream.borrow_mut() = Some(stream);
    }

    /// Install the owner that receives user intents. The binding does not
    /// keep it alive.
    pub fn on_intent(&self, target: Weak<dyn IntentTarget<I>>) {
        *self.intents.borrow_mut() = Some(target);
    }

    pub fn is_bound(&self) -> bool {
        self.stream.borrow().is_some()
    }

    /// Render every pending view state in production order.
    ///
    /// Returns the number of frames rendered.
    pub fn sync(&self) -> usize {
        let mut pending = Vec::new();
        if let Some(stream) = self.stream.borrow_mut().as_mut() {
            while let Ok(state) = stream.rx.try_recv() {
                pending.push(state);
            }
        }

        let count = pending.len();
        for state in pending {
            let sequence = self.rendered.get() + 1;
            self.rendered.set(sequence);
            self.surface.render(&Frame {
                unit: self.unit,
                screen: self.screen,
                sequence,
                state: &state,
            });
            *self.current.borrow_mut() = Some(state);
        }
        count
    }

    /// Forward a user intent to the owning unit.
    ///
    /// Returns false when the binding was detached or the owner is gone.
    pub fn emit(&self, intent: I) -> bool {
        let target = self.intents.borrow().as_ref().and_then(Weak::upgrade);
        match target {
            Some(target) => {
                target.handle_intent(intent);
                true
            }
            None => {
                tracing::debug!(
                    unit = %self.unit,
                    screen = self.screen,
                    intent = ?intent,
                    "Intent dropped, binding has no owner"
                );
                false
            }
        }
    }

    /// Last rendered view state.
    pub fn current(&self) -> Option<S> {
        self.current.borrow().clone()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered.get()
    }

    /// Unbind the stream and the intent target, and dismiss the surface.
    ///
    /// Anything still queued in the stream is dropped unrendered.
    pub fn detach(&self) {
        let was_bound = self.stream.borrow_mut().take().is_some();
        self.intents.borrow_mut().take();
        if was_bound {
            self.surface.dismiss(self.unit, self.screen);
        }
    }
}

//! Delivery of asynchronous dependency results back to logic units.
//!
//! A dependency that cannot answer synchronously receives a [`Reply`]. It is
//! `Send`, so the dependency may complete it from any thread. Completing posts a
//! [`Completion`] into the root's [`Postbox`]; the postbox is pumped on the
//! presentation turn and routes each completion by [`UnitId`] through a weak
//! directory. Units that were released or dropped in the meantime never see
//! the result.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tokio::sync::mpsc;

use super::{LogicUnit, UnitId, UnitRef};

/// Identifies one outstanding asynchronous request of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket#{}", self.0)
    }
}

#[cfg(test)]
impl Ticket {
    pub(crate) fn new(value: u64) -> Self {
        Ticket(value)
    }
}

/// Per-unit ticket book: issues tickets and remembers which are still wanted.
#[derive(Debug, Default)]
pub(crate) struct Tickets {
    next: u64,
    outstanding: HashSet<Ticket>,
}

impl Tickets {
    pub(crate) fn issue(&mut self) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.outstanding.insert(ticket);
        ticket
    }

    /// Consume a ticket. Returns false when it was never issued or has
    /// already been settled or discarded.
    pub(crate) fn settle(&mut self, ticket: Ticket) -> bool {
        self.outstanding.remove(&ticket)
    }

    pub(crate) fn discard_all(&mut self) -> usize {
        let count = self.outstanding.len();
        self.outstanding.clear();
        count
    }

    pub(crate) fn pending(&self) -> usize {
        self.outstanding.len()
    }
}

/// A dependency result travelling back to the unit that asked for it.
pub struct Completion {
    target: UnitId,
    ticket: Ticket,
    payload: Box<dyn Any + Send>,
}

impl Completion {
    pub fn target(&self) -> UnitId {
        self.target
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Take the payload as `T`. Returns `None` when the payload has a
    /// different type.
    pub fn into_value<T: 'static>(self) -> Option<T> {
        self.payload.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("target", &self.target)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Sending half of the postbox. Cheap to clone, safe to move across threads.
#[derive(Clone)]
pub struct Courier {
    tx: mpsc::UnboundedSender<Completion>,
}

impl Courier {
    fn post(&self, completion: Completion) {
        let target = completion.target;
        if self.tx.send(completion).is_err() {
            tracing::debug!(unit = %target, "postbox closed, completion dropped");
        }
    }
}

/// One-shot handle a dependency uses to answer an asynchronous request.
pub struct Reply<T> {
    target: UnitId,
    ticket: Ticket,
    courier: Courier,
    _payload: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Reply<T> {
    pub(crate) fn new(target: UnitId, ticket: Ticket, courier: Courier) -> Self {
        Self {
            target,
            ticket,
            courier,
            _payload: PhantomData,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn target(&self) -> UnitId {
        self.target
    }

    /// Post the result. It is delivered on the next postbox pump.
    pub fn complete(self, value: T) {
        self.courier.post(Completion {
            target: self.target,
            ticket: self.ticket,
            payload: Box::new(value),
        });
    }
}

impl<T> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("target", &self.target)
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Why a completion was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The target unit no longer exists.
    UnknownUnit,
    /// The target unit exists but has been released by its flow.
    Released,
    /// The ticket was already settled or explicitly discarded.
    StaleTicket,
}

/// Outcome of handing one completion to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Discarded(DiscardReason),
}

/// Counters for one pump of the postbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub applied: usize,
    pub discarded: usize,
}

impl PumpReport {
    pub fn is_idle(&self) -> bool {
        self.applied == 0 && self.discarded == 0
    }
}

/// Weak index of every mounted unit, keyed by id.
#[derive(Default)]
pub(crate) struct Directory {
    units: RefCell<HashMap<UnitId, Weak<dyn LogicUnit>>>,
}

impl Directory {
    /// Add a unit, forgetting any that were released or dropped since the
    /// last pump.
    pub(crate) fn register(&self, id: UnitId, unit: Weak<dyn LogicUnit>) {
        self.prune();
        self.units.borrow_mut().insert(id, unit);
    }

    fn lookup(&self, id: UnitId) -> Option<UnitRef> {
        self.units.borrow().get(&id).and_then(Weak::upgrade)
    }

    fn prune(&self) {
        self.units
            .borrow_mut()
            .retain(|_, unit| unit.upgrade().is_some_and(|u| !u.is_released()));
    }

    fn len(&self) -> usize {
        self.units.borrow().len()
    }
}

/// Receiving half: owned by the root unit and pumped once per turn.
pub struct Postbox {
    courier: Courier,
    inbox: RefCell<mpsc::UnboundedReceiver<Completion>>,
    directory: Rc<Directory>,
    totals: Cell<PumpReport>,
}

impl Postbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            courier: Courier { tx },
            inbox: RefCell::new(rx),
            directory: Rc::new(Directory::default()),
            totals: Cell::new(PumpReport::default()),
        }
    }

    pub fn courier(&self) -> Courier {
        self.courier.clone()
    }

    pub(crate) fn directory(&self) -> Rc<Directory> {
        Rc::clone(&self.directory)
    }

    /// Number of units currently reachable for delivery.
    pub fn reachable_units(&self) -> usize {
        self.directory.len()
    }

    /// Lifetime totals across every pump.
    pub fn totals(&self) -> PumpReport {
        self.totals.get()
    }

    /// Deliver every queued completion, including ones posted while
    /// delivering, until the inbox is empty.
    pub fn pump(&self) -> PumpReport {
        let mut report = PumpReport::default();
        loop {
            let next = self.inbox.borrow_mut().try_recv();
            let Ok(completion) = next else {
                break;
            };
            let target = completion.target;
            let ticket = completion.ticket;
            let delivery = match self.directory.lookup(target) {
                Some(unit) => unit.deliver(completion),
                None => Delivery::Discarded(DiscardReason::UnknownUnit),
            };
            match delivery {
                Delivery::Applied => report.applied += 1,
                Delivery::Discarded(reason) => {
                    report.discarded += 1;
                    tracing::debug!(
                        unit = %target,
                        ticket = %ticket,
                        reason = ?reason,
                        "Discarded completion"
                    );
                }
            }
        }
        self.directory.prune();

        let mut totals = self.totals.get();
        totals.applied += report.applied;
        totals.discarded += report.discarded;
        self.totals.set(totals);
        report
    }
}

impl Default for Postbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_settle_once() {
        let mut tickets = Tickets::default();
        let first = tickets.issue();
        let second = tickets.issue();
        assert_ne!(first, second);
        assert_eq!(tickets.pending(), 2);
        assert!(tickets.settle(first));
        assert!(!tickets.settle(first));
        assert_eq!(tickets.discard_all(), 1);
        assert!(!tickets.settle(second));
    }

    #[test]
    fn completion_payload_downcasts() {
        let completion = Completion {
            target: UnitId::next(),
            ticket: Ticket(1),
            payload: Box::new(42u32),
        };
        assert_eq!(completion.into_value::<u32>(), Some(42));
    }

    #[test]
    fn completion_payload_wrong_type_is_none() {
        let completion = Completion {
            target: UnitId::next(),
            ticket: Ticket(1),
            payload: Box::new("text"),
        };
        assert!(completion.into_value::<u32>().is_none());
    }

    #[test]
    fn pump_discards_completion_for_unknown_unit() {
        let postbox = Postbox::new();
        let reply: Reply<u8> = Reply::new(UnitId::next(), Ticket(1), postbox.courier());
        reply.complete(7);

        let report = postbox.pump();
        assert_eq!(report.applied, 0);
        assert_eq!(report.discarded, 1);
        assert!(postbox.pump().is_idle());
        assert_eq!(postbox.totals().discarded, 1);
    }

    #[test]
    fn reply_can_complete_from_another_thread() {
        let postbox = Postbox::new();
        let reply: Reply<String> = Reply::new(UnitId::next(), Ticket(3), postbox.courier());
        std::thread::spawn(move || reply.complete("done".to_string()))
            .join()
            .expect("worker thread");
        assert_eq!(postbox.pump().discarded, 1);
    }
}

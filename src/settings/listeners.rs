//! Synchronous callback registry

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callbacks invoked in subscription order with a borrowed payload.
///
/// Callbacks may subscribe, unsubscribe or emit again while being notified;
/// each emit works on the list as it was when the emit started.
pub struct Listeners<A: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(&A)>)>>,
}

impl<A: ?Sized> Default for Listeners<A> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<A: ?Sized> Listeners<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, callback: Rc<dyn Fn(&A)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn emit(&self, payload: &A) {
        let callbacks: Vec<Rc<dyn Fn(&A)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

use crate::SubscriptionId;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Observer<T> = Rc<dyn Fn(&T)>;

/// Single-threaded "value changed" broadcaster.
///
/// Every call to [`notify`](Self::notify) reaches each subscriber once, in
/// subscription order. Inside [`batch`](Self::batch) notifications are held
/// back and only the latest value is emitted when the outermost batch ends.
///
/// Observers are invoked with no internal borrow held, so they may subscribe,
/// unsubscribe, or notify again from inside the callback.
pub struct ChangeNotifier<T> {
    subscribers: RefCell<SlotMap<SubscriptionId, Observer<T>>>,
    batch_depth: Cell<usize>,
    pending: RefCell<Option<T>>,
    emitted: Cell<u64>,
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(SlotMap::with_key()),
            batch_depth: Cell::new(0),
            pending: RefCell::new(None),
            emitted: Cell::new(0),
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = self.subscribers.borrow_mut().insert(Rc::new(observer));
        tracing::trace!(?id, "observer subscribed");
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    /// Number of notifications actually delivered (coalesced batches count once).
    pub fn emitted_count(&self) -> u64 {
        self.emitted.get()
    }

    pub fn notify(&self, value: T) {
        if self.is_batching() {
            *self.pending.borrow_mut() = Some(value);
            return;
        }
        self.emit(&value);
    }

    pub fn batch<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.batch_depth.set(self.batch_depth.get() + 1);
        let result = f();
        self.batch_depth.set(self.batch_depth.get() - 1);

        if self.batch_depth.get() == 0 {
            let pending = self.pending.borrow_mut().take();
            if let Some(value) = pending {
                self.emit(&value);
            }
        }
        result
    }

    fn emit(&self, value: &T) {
        // Snapshot the observer list so callbacks can mutate subscriptions.
        let observers: SmallVec<[Observer<T>; 4]> =
            self.subscribers.borrow().values().cloned().collect();

        self.emitted.set(self.emitted.get() + 1);
        for observer in observers {
            observer(value);
        }
    }
}

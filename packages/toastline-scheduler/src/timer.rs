use slotmap::{SlotMap, new_key_type};
use std::collections::BTreeMap;

new_key_type! {
    pub struct TimerId;
}

struct Timer<T> {
    deadline: u64,
    seq: u64,
    payload: T,
}

/// Deadline-ordered one-shot timers with O(log n) cancellation.
///
/// Timers sharing a deadline fire in the order they were scheduled. A
/// cancelled timer never fires, and its `TimerId` is never handed out again
/// (slotmap versioning), so a stale id cannot cancel a newer timer.
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, Timer<T>>,
    order: BTreeMap<(u64, u64), TimerId>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, deadline: u64, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;

        let id = self.timers.insert(Timer {
            deadline,
            seq,
            payload,
        });
        self.order.insert((deadline, seq), id);
        tracing::trace!(?id, deadline, "timer scheduled");
        id
    }

    /// Cancels a pending timer, returning its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let timer = self.timers.remove(id)?;
        self.order.remove(&(timer.deadline, timer.seq));
        tracing::trace!(?id, "timer cancelled");
        Some(timer.payload)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.timers.get(id).map(|t| t.deadline)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.order.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Removes and returns every timer whose deadline is `<= now`, earliest first.
    pub fn drain_due(&mut self, now: u64) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(entry) = self.order.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let id = entry.remove();
            if let Some(timer) = self.timers.remove(id) {
                due.push(timer.payload);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.order.clear();
    }
}

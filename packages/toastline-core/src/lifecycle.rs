//! Countdown, pause sources, and exit sequencing for queued toasts.
//!
//! A single [`advance`](LifecycleController::advance) call drives every toast:
//! running countdowns shrink by the time elapsed since the previous call,
//! expired toasts are marked exiting, and toasts whose exit window has passed
//! are removed from the queue. Callers must `advance` to the current time
//! before pausing or resuming so the countdown is settled at that instant.
//! The same holds before [`QueueEngine::insert`] when the two are driven
//! directly: a toast inserted between two `advance` calls would otherwise be
//! charged for time that passed before it existed.

use crate::config::Callback;
use crate::queue::QueueEngine;
use crate::toast::{Toast, ToastId, ToastPatch};
use rustc_hash::FxHashMap;
use toastline_scheduler::{TimerId, TimerQueue};

/// Independent reasons for suspending a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseSource {
    /// `pause` / `resume` calls.
    Manual,
    Hover,
    FocusLoss,
    Drag,
}

impl PauseSource {
    const fn bit(self) -> u8 {
        match self {
            PauseSource::Manual => 1 << 0,
            PauseSource::Hover => 1 << 1,
            PauseSource::FocusLoss => 1 << 2,
            PauseSource::Drag => 1 << 3,
        }
    }
}

/// Set of active pause sources for one toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseSources(u8);

impl PauseSources {
    pub fn contains(self, source: PauseSource) -> bool {
        self.0 & source.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, source: PauseSource) {
        self.0 |= source.bit();
    }

    fn remove(&mut self, source: PauseSource) {
        self.0 &= !source.bit();
    }
}

/// What a call to [`LifecycleController::advance`] did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Toasts whose countdown hit zero and are now exiting.
    pub expired: Vec<ToastId>,
    /// Toasts whose exit window elapsed, already removed from the queue.
    pub removed: Vec<Toast>,
}

pub struct LifecycleController {
    exit_duration_ms: u64,
    exit_timers: TimerQueue<ToastId>,
    pending_exit: FxHashMap<ToastId, TimerId>,
    pause_sources: FxHashMap<ToastId, PauseSources>,
    last_tick: Option<u64>,
}

impl LifecycleController {
    pub fn new(exit_duration_ms: u64) -> Self {
        Self {
            exit_duration_ms,
            exit_timers: TimerQueue::new(),
            pending_exit: FxHashMap::default(),
            pause_sources: FxHashMap::default(),
            last_tick: None,
        }
    }

    pub fn exit_duration_ms(&self) -> u64 {
        self.exit_duration_ms
    }

    /// Clock reading of the last `advance`.
    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    pub fn advance(&mut self, queue: &mut QueueEngine, now: u64) -> TickReport {
        let start = self.last_tick.unwrap_or(now).min(now);
        let elapsed = now - start;
        self.last_tick = Some(now);

        let mut report = TickReport::default();

        if elapsed > 0 {
            // Stable collection order decides simultaneous expirations.
            let running: Vec<(ToastId, u64)> = queue
                .get_all()
                .iter()
                .filter(|t| !t.is_exiting && !t.is_paused)
                .filter_map(|t| t.remaining_ms.map(|remaining| (t.id, remaining)))
                .collect();

            for (id, remaining) in running {
                let left = remaining.saturating_sub(elapsed);
                queue.update(id, ToastPatch::new().remaining(left));

                if left == 0 {
                    // Start the exit window at the instant the countdown ran
                    // out, not at this (possibly late) tick.
                    let expired_at = start + remaining;
                    if self.dismiss(queue, id, expired_at) {
                        tracing::debug!(%id, expired_at, "toast expired");
                        report.expired.push(id);
                    }
                }
            }
        }

        for id in self.exit_timers.drain_due(now) {
            self.pending_exit.remove(&id);
            self.pause_sources.remove(&id);
            if let Some(toast) = queue.take(id) {
                tracing::debug!(%id, "toast removed after exit");
                report.removed.push(toast);
            }
        }

        report
    }

    /// Marks the toast exiting and schedules its removal. Returns `false` for
    /// unknown or already-exiting toasts.
    pub fn dismiss(&mut self, queue: &mut QueueEngine, id: ToastId, now: u64) -> bool {
        match queue.get(id) {
            Some(toast) if !toast.is_exiting => {}
            _ => return false,
        }

        queue.update(id, ToastPatch::new().exiting(true).swipe_progress(0.0));

        if let Some(stale) = self.pending_exit.remove(&id) {
            self.exit_timers.cancel(stale);
        }
        let timer = self
            .exit_timers
            .schedule(now + self.exit_duration_ms, id);
        self.pending_exit.insert(id, timer);

        tracing::debug!(%id, remove_at = now + self.exit_duration_ms, "toast dismissed");
        true
    }

    pub fn pause(&mut self, queue: &mut QueueEngine, id: ToastId, source: PauseSource) -> bool {
        if !queue.contains(id) {
            return false;
        }

        let sources = self.pause_sources.entry(id).or_default();
        sources.insert(source);

        if queue.get(id).is_some_and(|t| !t.is_paused) {
            tracing::trace!(%id, ?source, "countdown paused");
            queue.update(id, ToastPatch::new().paused(true));
        }
        true
    }

    /// Clears one pause source; the countdown resumes once none are left.
    pub fn resume(&mut self, queue: &mut QueueEngine, id: ToastId, source: PauseSource) -> bool {
        if !queue.contains(id) {
            return false;
        }

        let remaining = match self.pause_sources.get_mut(&id) {
            Some(sources) => {
                sources.remove(source);
                *sources
            }
            None => PauseSources::default(),
        };

        if remaining.is_empty() {
            self.pause_sources.remove(&id);
            if queue.get(id).is_some_and(|t| t.is_paused) {
                tracing::trace!(%id, ?source, "countdown resumed");
                queue.update(id, ToastPatch::new().paused(false));
            }
        }
        true
    }

    pub fn pause_sources(&self, id: ToastId) -> PauseSources {
        self.pause_sources.get(&id).copied().unwrap_or_default()
    }

    /// Restarts a toast's countdown and revives it if it was exiting.
    ///
    /// Returns the retry callback for the caller to invoke; `None` (and no
    /// state change) when the toast is unknown or has no retry callback.
    pub fn retry(&mut self, queue: &mut QueueEngine, id: ToastId) -> Option<Callback> {
        let toast = queue.get(id)?;
        let callback = toast.config.on_retry.clone()?;
        let retries = toast.retry_count + 1;
        let full = toast.config.duration.as_millis();

        if let Some(timer) = self.pending_exit.remove(&id) {
            self.exit_timers.cancel(timer);
        }

        let mut patch = ToastPatch::new().exiting(false);
        patch.retry_count = Some(retries);
        if let Some(full) = full {
            patch.remaining_ms = Some(full);
        }
        queue.update(id, patch);

        tracing::debug!(%id, retries, "toast retried");
        Some(callback)
    }

    /// Dismisses a toast that has an undo callback and returns that callback.
    pub fn undo(&mut self, queue: &mut QueueEngine, id: ToastId, now: u64) -> Option<Callback> {
        let callback = queue.get(id)?.config.on_undo.clone()?;
        self.dismiss(queue, id, now);
        Some(callback)
    }

    pub fn is_exit_pending(&self, id: ToastId) -> bool {
        self.pending_exit.contains_key(&id)
    }

    /// Drops timers and pause state for a toast that left the queue some
    /// other way (eviction, clear).
    pub fn forget(&mut self, id: ToastId) {
        if let Some(timer) = self.pending_exit.remove(&id) {
            self.exit_timers.cancel(timer);
        }
        self.pause_sources.remove(&id);
    }

    pub fn forget_all(&mut self) {
        self.exit_timers.clear();
        self.pending_exit.clear();
        self.pause_sources.clear();
    }

    /// Earliest clock reading at which `advance` would change something.
    pub fn next_deadline(&self, queue: &QueueEngine) -> Option<u64> {
        let expiry = self.last_tick.and_then(|tick| {
            queue
                .get_all()
                .iter()
                .filter(|t| !t.is_exiting && !t.is_paused)
                .filter_map(|t| t.remaining_ms)
                .min()
                .map(|remaining| tick + remaining)
        });

        match (expiry, self.exit_timers.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_sources_track_each_bit() {
        let mut sources = PauseSources::default();
        sources.insert(PauseSource::Hover);
        sources.insert(PauseSource::FocusLoss);
        sources.remove(PauseSource::Hover);

        assert!(sources.contains(PauseSource::FocusLoss));
        assert!(!sources.contains(PauseSource::Hover));
        assert!(!sources.is_empty());

        sources.remove(PauseSource::FocusLoss);
        assert!(sources.is_empty());
    }
}

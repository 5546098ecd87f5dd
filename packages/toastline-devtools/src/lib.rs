use serde::{Deserialize, Serialize};

/// One toast as seen by the inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastEntry {
    pub id: u64,
    pub category: String,
    pub priority: String,
    pub position: String,
    pub group_id: Option<String>,
    pub exiting: bool,
    pub paused: bool,
    pub remaining_ms: Option<u64>,
    pub stack_count: u32,
    pub retry_count: u32,
}

/// Queue transitions counted by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    Added,
    Merged,
    Evicted,
    Dismissed,
    Removed,
}

#[cfg(debug_assertions)]
mod internal {
    use super::{QueueEvent, ToastEntry};
    use serde::{Deserialize, Serialize};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
    pub struct QueueMetrics {
        pub added: u64,
        pub merged: u64,
        pub evicted: u64,
        pub dismissed: u64,
        pub removed: u64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct DevToolsSnapshot {
        pub toasts: Vec<ToastEntry>,
        pub metrics: QueueMetrics,
        pub snapshot_count: u64,
        pub timestamp_ms: u64,
    }

    pub struct DevToolsContext {
        snapshot: Mutex<DevToolsSnapshot>,
        bridge: Mutex<Option<Box<dyn DevBridge>>>,
    }

    pub trait DevBridge: Send + Sync {
        fn send_snapshot(&self, snapshot: &DevToolsSnapshot);
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        // The inspector must keep working after a panicking test thread.
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl Default for DevToolsContext {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DevToolsContext {
        pub fn new() -> Self {
            Self {
                snapshot: Mutex::new(DevToolsSnapshot::default()),
                bridge: Mutex::new(None),
            }
        }

        pub fn set_bridge(&self, bridge: Box<dyn DevBridge>) {
            *lock(&self.bridge) = Some(bridge);
        }

        pub fn record_event(&self, event: QueueEvent, count: u64) {
            let mut snapshot = lock(&self.snapshot);
            let metrics = &mut snapshot.metrics;
            match event {
                QueueEvent::Added => metrics.added += count,
                QueueEvent::Merged => metrics.merged += count,
                QueueEvent::Evicted => metrics.evicted += count,
                QueueEvent::Dismissed => metrics.dismissed += count,
                QueueEvent::Removed => metrics.removed += count,
            }
        }

        pub fn record_snapshot(&self, toasts: Vec<ToastEntry>, timestamp_ms: u64) {
            let mut snapshot = lock(&self.snapshot);
            snapshot.toasts = toasts;
            snapshot.timestamp_ms = timestamp_ms;
            snapshot.snapshot_count += 1;

            if let Some(bridge) = lock(&self.bridge).as_ref() {
                bridge.send_snapshot(&snapshot);
            }
        }

        pub fn snapshot(&self) -> DevToolsSnapshot {
            lock(&self.snapshot).clone()
        }

        pub fn reset(&self) {
            *lock(&self.snapshot) = DevToolsSnapshot::default();
        }

        pub fn export_state(&self) -> String {
            let snapshot = lock(&self.snapshot);
            serde_json::to_string(&*snapshot).unwrap_or_default()
        }
    }

    use std::sync::OnceLock;
    pub static DEVTOOLS: OnceLock<DevToolsContext> = OnceLock::new();
}

#[cfg(debug_assertions)]
pub use internal::*;

// Production no-op implementation
#[cfg(not(debug_assertions))]
pub mod production {
    use super::{QueueEvent, ToastEntry};

    pub struct DevToolsContext;
    impl DevToolsContext {
        pub fn record_event(&self, _: QueueEvent, _: u64) {}
        pub fn record_snapshot(&self, _: Vec<ToastEntry>, _: u64) {}
        pub fn reset(&self) {}
        pub fn export_state(&self) -> String {
            String::new()
        }
    }
    pub static DEVTOOLS: DevToolsContext = DevToolsContext;
}

#[cfg(not(debug_assertions))]
pub use production::*;

/// Whether snapshots are worth building in this build profile.
pub const ENABLED: bool = cfg!(debug_assertions);

pub fn devtools() -> &'static DevToolsContext {
    #[cfg(debug_assertions)]
    {
        DEVTOOLS.get_or_init(DevToolsContext::new)
    }
    #[cfg(not(debug_assertions))]
    {
        &DEVTOOLS
    }
}

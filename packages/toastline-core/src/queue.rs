//! The authoritative ordered collection of toasts.
//!
//! Every mutation resolves insertion order, stacking, and both capacity
//! limits before returning, and hands back the whole collection rather than a
//! diff. Capacity evictions remove records immediately, without an exit
//! transition.

use crate::config::{QueueConfig, QueueConfigPatch, Strategy};
use crate::error::ConfigError;
use crate::toast::{Toast, ToastId, ToastPatch};

/// Where an incoming toast ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inserted(ToastId),
    /// Stacked onto an existing group member; the incoming record is gone.
    Merged { into: ToastId },
    /// A record with the same id is already held; nothing changed.
    Duplicate(ToastId),
}

/// Result of [`QueueEngine::insert`].
#[derive(Debug)]
pub struct Insertion {
    pub placement: Placement,
    /// Records removed to honor group or global capacity, in eviction order.
    pub evicted: Vec<Toast>,
}

#[derive(Debug, Default)]
pub struct QueueEngine {
    toasts: Vec<Toast>,
    config: QueueConfig,
    next_seq: u64,
    revision: u64,
}

impl QueueEngine {
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            toasts: Vec::new(),
            config,
            next_seq: 0,
            revision: 0,
        })
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Merges new settings. Existing records are not re-sorted or re-evicted.
    pub fn set_config(&mut self, patch: &QueueConfigPatch) -> Result<(), ConfigError> {
        let config = self.config.merged(patch);
        config.validate()?;
        tracing::debug!(?config, "queue config updated");
        self.config = config;
        Ok(())
    }

    /// Inserts `toast` and returns the resulting collection.
    pub fn add(&mut self, toast: Toast) -> &[Toast] {
        let insertion = self.insert(toast);
        if !insertion.evicted.is_empty() {
            tracing::debug!(count = insertion.evicted.len(), "evicted on add");
        }
        &self.toasts
    }

    /// Like [`add`](Self::add), but reports what happened.
    pub fn insert(&mut self, mut toast: Toast) -> Insertion {
        if self.contains(toast.id) {
            tracing::warn!(id = %toast.id, "ignoring toast with duplicate id");
            return Insertion {
                placement: Placement::Duplicate(toast.id),
                evicted: Vec::new(),
            };
        }

        let mut evicted = Vec::new();
        let grouped = self.config.grouping && toast.group_id().is_some();

        if grouped {
            if toast.stackable() {
                if let Some(into) = self.stack_into(&toast) {
                    self.revision += 1;
                    return Insertion {
                        placement: Placement::Merged { into },
                        evicted,
                    };
                }
            }
            self.enforce_group_capacity(&toast, &mut evicted);
        }

        toast.seq = self.next_seq;
        self.next_seq += 1;
        let id = toast.id;

        let index = self.insertion_index(&toast);
        tracing::trace!(%id, index, strategy = ?self.config.strategy, "toast inserted");
        self.toasts.insert(index, toast);

        self.enforce_capacity(id, &mut evicted);
        self.revision += 1;

        Insertion {
            placement: Placement::Inserted(id),
            evicted,
        }
    }

    pub fn remove(&mut self, id: ToastId) -> &[Toast] {
        self.take(id);
        &self.toasts
    }

    /// Removes and returns a record, if present.
    pub fn take(&mut self, id: ToastId) -> Option<Toast> {
        let index = self.index_of(id)?;
        self.revision += 1;
        Some(self.toasts.remove(index))
    }

    pub fn remove_group(&mut self, group_id: &str) -> &[Toast] {
        self.take_group(group_id);
        &self.toasts
    }

    pub fn take_group(&mut self, group_id: &str) -> Vec<Toast> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.toasts)
            .into_iter()
            .partition(|t| t.group_id() == Some(group_id));
        self.toasts = kept;
        if !taken.is_empty() {
            self.revision += 1;
        }
        taken
    }

    /// Merges `patch` into the record with `id`; unknown ids are ignored.
    pub fn update(&mut self, id: ToastId, patch: ToastPatch) -> &[Toast] {
        if let Some(index) = self.index_of(id) {
            self.toasts[index].apply(patch);
            self.revision += 1;
        }
        &self.toasts
    }

    pub fn clear(&mut self) -> &[Toast] {
        self.drain();
        &self.toasts
    }

    /// Empties the collection, returning what it held.
    pub fn drain(&mut self) -> Vec<Toast> {
        if !self.toasts.is_empty() {
            self.revision += 1;
        }
        std::mem::take(&mut self.toasts)
    }

    pub fn get_all(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Members of `group_id`, exiting ones included.
    pub fn group_len(&self, group_id: &str) -> usize {
        self.toasts
            .iter()
            .filter(|t| t.group_id() == Some(group_id))
            .count()
    }

    /// Bumped by every mutation that changed the collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn index_of(&self, id: ToastId) -> Option<usize> {
        self.toasts.iter().position(|t| t.id == id)
    }

    /// Folds a stackable toast into the earliest live member of its group.
    fn stack_into(&mut self, incoming: &Toast) -> Option<ToastId> {
        let group = incoming.group_id()?;
        let representative = self
            .toasts
            .iter_mut()
            .filter(|t| t.group_id() == Some(group) && !t.is_exiting)
            .min_by_key(|t| t.seq)?;

        representative.absorb(incoming);
        tracing::debug!(
            into = %representative.id,
            stack_count = representative.stack_count,
            group,
            "stacked toast"
        );
        Some(representative.id)
    }

    fn enforce_group_capacity(&mut self, incoming: &Toast, evicted: &mut Vec<Toast>) {
        let Some(group) = incoming.group_id() else {
            return;
        };
        let limit = self.config.max_per_group;

        while self.group_len(group) >= limit {
            let members = self.toasts.iter().filter(|t| t.group_id() == Some(group));
            let victim = match self.config.strategy {
                Strategy::Lifo => members.max_by_key(|t| t.seq),
                Strategy::Fifo | Strategy::Priority => members.min_by_key(|t| t.seq),
            }
            .map(|t| t.id);

            let Some(victim) = victim.and_then(|id| self.take(id)) else {
                break;
            };
            tracing::debug!(id = %victim.id, group, "group capacity eviction");
            evicted.push(victim);
        }
    }

    fn insertion_index(&self, toast: &Toast) -> usize {
        match self.config.strategy {
            Strategy::Fifo => self.toasts.len(),
            Strategy::Lifo => 0,
            // Stable: after every entry of equal or higher priority.
            Strategy::Priority => self
                .toasts
                .iter()
                .position(|t| t.priority() < toast.priority())
                .unwrap_or(self.toasts.len()),
        }
    }

    fn enforce_capacity(&mut self, just_inserted: ToastId, evicted: &mut Vec<Toast>) {
        while self.toasts.len() > self.config.max_toasts {
            let victim = match self.config.strategy {
                Strategy::Fifo => self.toasts.iter().min_by_key(|t| t.seq),
                Strategy::Lifo => self
                    .toasts
                    .iter()
                    .filter(|t| t.id != just_inserted)
                    .max_by_key(|t| t.seq),
                Strategy::Priority => self.toasts.iter().min_by_key(|t| (t.priority(), t.seq)),
            }
            .map(|t| t.id);

            let Some(victim) = victim.and_then(|id| self.take(id)) else {
                break;
            };
            tracing::debug!(id = %victim.id, "capacity eviction");
            evicted.push(victim);
        }
    }
}

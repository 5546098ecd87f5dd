use crate::config::{ToastConfig, ToastConfigPatch};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned when a toast is created. Never reused by the same toaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToastId(u64);

impl ToastId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Semantic kind of a toast. Informational only to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Success,
    Error,
    #[default]
    Info,
    Warning,
    Loading,
    Custom,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Error => "error",
            Category::Info => "info",
            Category::Warning => "warning",
            Category::Loading => "loading",
            Category::Custom => "custom",
        }
    }
}

/// Ordering used by [`Strategy::Priority`](crate::Strategy::Priority).
/// Variants are declared lowest first so the derived `Ord` matches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Screen anchor a renderer should place the toast at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    Center,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Position {
    /// Every anchor, in the order snapshots list them.
    pub const ALL: [Position; 7] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::Center,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopCenter => "top-center",
            Position::TopRight => "top-right",
            Position::Center => "center",
            Position::BottomLeft => "bottom-left",
            Position::BottomCenter => "bottom-center",
            Position::BottomRight => "bottom-right",
        }
    }
}

/// How long a toast stays before auto-dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastDuration {
    /// Milliseconds of countdown.
    Finite(u64),
    /// Only explicit dismissal removes the toast.
    Never,
}

impl ToastDuration {
    pub const fn from_millis(ms: u64) -> Self {
        ToastDuration::Finite(ms)
    }

    pub fn as_millis(self) -> Option<u64> {
        match self {
            ToastDuration::Finite(ms) => Some(ms),
            ToastDuration::Never => None,
        }
    }

    pub fn is_never(self) -> bool {
        matches!(self, ToastDuration::Never)
    }
}

impl Default for ToastDuration {
    fn default() -> Self {
        ToastDuration::Finite(5000)
    }
}

impl From<std::time::Duration> for ToastDuration {
    fn from(duration: std::time::Duration) -> Self {
        ToastDuration::Finite(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Renderer-defined payload. The queue only looks inside `Text` when stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Content {
    Text(String),
    Custom(serde_json::Value),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Custom(_) => None,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Custom(value)
    }
}

/// The state tracked per notification.
///
/// Records handed out by the queue are read-only views; the only way to
/// change a stored record is [`QueueEngine::update`](crate::QueueEngine::update).
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub content: Content,
    pub category: Category,
    pub config: ToastConfig,
    /// Clock reading (ms) at creation.
    pub created_at: u64,
    pub is_exiting: bool,
    pub is_paused: bool,
    /// `None` for toasts that never expire.
    pub remaining_ms: Option<u64>,
    pub retry_count: u32,
    pub stack_count: u32,
    /// Horizontal drag progress in `[0, 1]`, reset to 0 when a swipe is cancelled.
    pub swipe_progress: f32,
    /// Arrival order, assigned by the queue on insertion.
    pub(crate) seq: u64,
    /// Text the stack suffix is appended to.
    pub(crate) stack_base: Option<String>,
}

impl Toast {
    pub fn new(
        id: ToastId,
        content: impl Into<Content>,
        category: Category,
        config: ToastConfig,
        created_at: u64,
    ) -> Self {
        let remaining_ms = config.duration.as_millis();
        Self {
            id,
            content: content.into(),
            category,
            config,
            created_at,
            is_exiting: false,
            is_paused: false,
            remaining_ms,
            retry_count: 0,
            stack_count: 1,
            swipe_progress: 0.0,
            seq: 0,
            stack_base: None,
        }
    }

    pub fn priority(&self) -> Priority {
        self.config.priority
    }

    pub fn duration(&self) -> ToastDuration {
        self.config.duration
    }

    /// Group id, treating an empty string as "no group".
    pub fn group_id(&self) -> Option<&str> {
        self.config.group_id.as_deref().filter(|g| !g.is_empty())
    }

    pub fn stackable(&self) -> bool {
        self.config.stackable
    }

    pub fn position(&self) -> Position {
        self.config.position
    }

    /// Fraction of the countdown left, `1.0` for toasts that never expire.
    pub fn progress(&self) -> f32 {
        match (self.remaining_ms, self.config.duration.as_millis()) {
            (Some(_), Some(0)) => 0.0,
            (Some(remaining), Some(total)) => (remaining as f32 / total as f32).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// Folds a stackable newcomer into this representative.
    pub(crate) fn absorb(&mut self, incoming: &Toast) {
        self.stack_count = self.stack_count.saturating_add(1);

        if let (Some(current), Some(_)) = (self.content.as_text(), incoming.content.as_text()) {
            let base = self
                .stack_base
                .get_or_insert_with(|| current.to_owned())
                .clone();
            self.content = Content::Text(format!("{base} (+{})", self.stack_count));
        }

        // A fresh duplicate keeps the representative on screen for a full period.
        self.remaining_ms = self.config.duration.as_millis();
    }

    pub(crate) fn apply(&mut self, patch: ToastPatch) {
        if let Some(content) = patch.content {
            self.content = content;
            self.stack_base = None;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(config) = patch.config {
            let before = self.config.duration;
            self.config.apply(config);
            if self.config.duration != before {
                self.remaining_ms = self.config.duration.as_millis();
            }
        }
        if let Some(exiting) = patch.is_exiting {
            self.is_exiting = exiting;
        }
        if let Some(paused) = patch.is_paused {
            self.is_paused = paused;
        }
        if let Some(remaining) = patch.remaining_ms {
            // Clamped to [0, duration]; meaningless for never-expiring toasts.
            self.remaining_ms = self
                .config
                .duration
                .as_millis()
                .map(|total| remaining.min(total));
        }
        if let Some(retries) = patch.retry_count {
            self.retry_count = retries;
        }
        if let Some(stack) = patch.stack_count {
            self.stack_count = stack.max(1);
        }
        if let Some(progress) = patch.swipe_progress {
            self.swipe_progress = if progress.is_finite() {
                progress.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }
}

/// Partial update for a stored [`Toast`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ToastPatch {
    pub content: Option<Content>,
    pub category: Option<Category>,
    pub config: Option<ToastConfigPatch>,
    pub is_exiting: Option<bool>,
    pub is_paused: Option<bool>,
    pub remaining_ms: Option<u64>,
    pub retry_count: Option<u32>,
    pub stack_count: Option<u32>,
    pub swipe_progress: Option<f32>,
}

impl ToastPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn config(mut self, config: ToastConfigPatch) -> Self {
        self.config = Some(config);
        self
    }

    pub fn exiting(mut self, exiting: bool) -> Self {
        self.is_exiting = Some(exiting);
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.is_paused = Some(paused);
        self
    }

    pub fn remaining(mut self, ms: u64) -> Self {
        self.remaining_ms = Some(ms);
        self
    }

    pub fn swipe_progress(mut self, progress: f32) -> Self {
        self.swipe_progress = Some(progress);
        self
    }
}

use crate::error::ConfigError;
use crate::toast::{Position, Priority, ToastDuration, ToastId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A user callback stored with a toast (undo, retry, close, action click).
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(ToastId)>);

impl Callback {
    pub fn new(f: impl Fn(ToastId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, id: ToastId) {
        (self.0)(id)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Newest last; capacity evicts the oldest.
    #[default]
    Fifo,
    /// Newest first; capacity evicts the newest entries behind the one just added.
    Lifo,
    /// Higher priority first, arrival order among equals; capacity evicts the
    /// lowest priority, oldest first.
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub max_toasts: usize,
    pub strategy: Strategy,
    pub grouping: bool,
    pub max_per_group: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_toasts: 5,
            strategy: Strategy::Fifo,
            grouping: false,
            max_per_group: 3,
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_toasts == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.grouping && self.max_per_group == 0 {
            return Err(ConfigError::ZeroGroupCapacity);
        }
        Ok(())
    }

    pub fn merged(&self, patch: &QueueConfigPatch) -> Self {
        Self {
            max_toasts: patch.max_toasts.unwrap_or(self.max_toasts),
            strategy: patch.strategy.unwrap_or(self.strategy),
            grouping: patch.grouping.unwrap_or(self.grouping),
            max_per_group: patch.max_per_group.unwrap_or(self.max_per_group),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfigPatch {
    pub max_toasts: Option<usize>,
    pub strategy: Option<Strategy>,
    pub grouping: Option<bool>,
    pub max_per_group: Option<usize>,
}

/// Swipe-to-dismiss thresholds. Distances in px, velocity in px/ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub enabled: bool,
    pub threshold: f64,
    pub velocity: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 100.0,
            velocity: 0.3,
        }
    }
}

impl SwipeConfig {
    pub const MIN_THRESHOLD: f64 = 1.0;

    /// Threshold below 1px becomes 1px, negative or non-finite velocity becomes 0.
    pub fn normalized(self) -> Self {
        let threshold = if self.threshold.is_finite() {
            self.threshold.max(Self::MIN_THRESHOLD)
        } else {
            Self::default().threshold
        };
        let velocity = if self.velocity.is_finite() {
            self.velocity.max(0.0)
        } else {
            0.0
        };
        Self {
            enabled: self.enabled,
            threshold,
            velocity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    #[default]
    Primary,
    Secondary,
    Danger,
}

/// A button rendered on the toast.
#[derive(Debug, Clone)]
pub struct ToastAction {
    pub label: String,
    pub style: ActionStyle,
    /// While loading, clicks are ignored.
    pub loading: bool,
    pub on_click: Callback,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, on_click: impl Fn(ToastId) + 'static) -> Self {
        Self {
            label: label.into(),
            style: ActionStyle::default(),
            loading: false,
            on_click: Callback::new(on_click),
        }
    }

    pub fn style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }
}

/// Per-toast settings, fixed at creation and changeable through `update`.
#[derive(Debug, Clone)]
pub struct ToastConfig {
    pub position: Position,
    pub duration: ToastDuration,
    pub priority: Priority,
    pub dismissible: bool,
    pub pause_on_hover: bool,
    pub pause_on_focus_loss: bool,
    pub swipe: SwipeConfig,
    pub icon: bool,
    pub sound: bool,
    pub vibrate: bool,
    pub actions: Vec<ToastAction>,
    pub on_close: Option<Callback>,
    pub on_undo: Option<Callback>,
    pub on_retry: Option<Callback>,
    pub group_id: Option<String>,
    pub stackable: bool,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            position: Position::TopRight,
            duration: ToastDuration::Finite(5000),
            priority: Priority::Normal,
            dismissible: true,
            pause_on_hover: true,
            pause_on_focus_loss: true,
            swipe: SwipeConfig::default(),
            icon: true,
            sound: false,
            vibrate: false,
            actions: Vec::new(),
            on_close: None,
            on_undo: None,
            on_retry: None,
            group_id: None,
            stackable: false,
        }
    }
}

impl ToastConfig {
    pub fn apply(&mut self, patch: ToastConfigPatch) {
        let ToastConfigPatch {
            position,
            duration,
            priority,
            dismissible,
            pause_on_hover,
            pause_on_focus_loss,
            swipe,
            icon,
            sound,
            vibrate,
            actions,
            on_close,
            on_undo,
            on_retry,
            group_id,
            stackable,
        } = patch;

        if let Some(position) = position {
            self.position = position;
        }
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(dismissible) = dismissible {
            self.dismissible = dismissible;
        }
        if let Some(pause_on_hover) = pause_on_hover {
            self.pause_on_hover = pause_on_hover;
        }
        if let Some(pause_on_focus_loss) = pause_on_focus_loss {
            self.pause_on_focus_loss = pause_on_focus_loss;
        }
        if let Some(swipe) = swipe {
            self.swipe = swipe;
        }
        if let Some(icon) = icon {
            self.icon = icon;
        }
        if let Some(sound) = sound {
            self.sound = sound;
        }
        if let Some(vibrate) = vibrate {
            self.vibrate = vibrate;
        }
        if let Some(actions) = actions {
            self.actions = actions;
        }
        if let Some(stackable) = stackable {
            self.stackable = stackable;
        }
        if on_close.is_some() {
            self.on_close = on_close;
        }
        if on_undo.is_some() {
            self.on_undo = on_undo;
        }
        if on_retry.is_some() {
            self.on_retry = on_retry;
        }
        if group_id.is_some() {
            self.group_id = group_id;
        }
    }

    pub fn merged(&self, patch: ToastConfigPatch) -> Self {
        let mut config = self.clone();
        config.apply(patch);
        config
    }
}

/// Partial [`ToastConfig`]: options at creation time and patches for `update`.
#[derive(Debug, Clone, Default)]
pub struct ToastConfigPatch {
    pub position: Option<Position>,
    pub duration: Option<ToastDuration>,
    pub priority: Option<Priority>,
    pub dismissible: Option<bool>,
    pub pause_on_hover: Option<bool>,
    pub pause_on_focus_loss: Option<bool>,
    pub swipe: Option<SwipeConfig>,
    pub icon: Option<bool>,
    pub sound: Option<bool>,
    pub vibrate: Option<bool>,
    pub actions: Option<Vec<ToastAction>>,
    pub on_close: Option<Callback>,
    pub on_undo: Option<Callback>,
    pub on_retry: Option<Callback>,
    pub group_id: Option<String>,
    pub stackable: Option<bool>,
}

impl ToastConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn duration(mut self, duration: impl Into<ToastDuration>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn duration_ms(self, ms: u64) -> Self {
        self.duration(ToastDuration::Finite(ms))
    }

    pub fn persistent(self) -> Self {
        self.duration(ToastDuration::Never)
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    pub fn pause_on_hover(mut self, enabled: bool) -> Self {
        self.pause_on_hover = Some(enabled);
        self
    }

    pub fn pause_on_focus_loss(mut self, enabled: bool) -> Self {
        self.pause_on_focus_loss = Some(enabled);
        self
    }

    pub fn swipe(mut self, swipe: SwipeConfig) -> Self {
        self.swipe = Some(swipe);
        self
    }

    pub fn icon(mut self, icon: bool) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn sound(mut self, sound: bool) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn vibrate(mut self, vibrate: bool) -> Self {
        self.vibrate = Some(vibrate);
        self
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.actions.get_or_insert_with(Vec::new).push(action);
        self
    }

    pub fn on_close(mut self, f: impl Fn(ToastId) + 'static) -> Self {
        self.on_close = Some(Callback::new(f));
        self
    }

    pub fn on_undo(mut self, f: impl Fn(ToastId) + 'static) -> Self {
        self.on_undo = Some(Callback::new(f));
        self
    }

    pub fn on_retry(mut self, f: impl Fn(ToastId) + 'static) -> Self {
        self.on_retry = Some(Callback::new(f));
        self
    }

    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = Some(stackable);
        self
    }
}

/// Color scheme hint passed through to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    /// Resolves `Auto` against the host's color-scheme preference.
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if system_prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            explicit => explicit,
        }
    }
}

/// Construction-time settings for a [`Toaster`](crate::Toaster).
#[derive(Debug, Clone)]
pub struct ToasterOptions {
    pub queue: QueueConfig,
    /// Base config every new toast starts from.
    pub defaults: ToastConfig,
    pub theme: Theme,
    /// Grace interval between marking a toast exiting and removing it.
    pub exit_duration_ms: u64,
    /// Suggested cadence for [`Toaster::tick`](crate::Toaster::tick).
    pub tick_interval_ms: u64,
    /// Reverse each position's list in snapshots.
    pub newest_on_top: bool,
}

impl Default for ToasterOptions {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            defaults: ToastConfig::default(),
            theme: Theme::Auto,
            exit_duration_ms: 300,
            tick_interval_ms: 100,
            newest_on_top: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_patch_merges_only_given_fields() {
        let base = QueueConfig::default();
        let merged = base.merged(&QueueConfigPatch {
            strategy: Some(Strategy::Lifo),
            ..Default::default()
        });

        assert_eq!(merged.strategy, Strategy::Lifo);
        assert_eq!(merged.max_toasts, base.max_toasts);
    }

    #[test]
    fn zero_group_capacity_only_fails_with_grouping() {
        let mut config = QueueConfig {
            max_per_group: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.grouping = true;
        assert_eq!(config.validate(), Err(ConfigError::ZeroGroupCapacity));
    }

    #[test]
    fn swipe_config_clamps_degenerate_values() {
        let swipe = SwipeConfig {
            enabled: true,
            threshold: -5.0,
            velocity: f64::NAN,
        }
        .normalized();

        assert_eq!(swipe.threshold, SwipeConfig::MIN_THRESHOLD);
        assert_eq!(swipe.velocity, 0.0);
    }

    #[test]
    fn patch_keeps_existing_callbacks() {
        let config = ToastConfig::default().merged(ToastConfigPatch::new().on_undo(|_| {}));
        let config = config.merged(ToastConfigPatch::new().priority(Priority::High));

        assert!(config.on_undo.is_some());
        assert_eq!(config.priority, Priority::High);
    }

    #[test]
    fn auto_theme_follows_system() {
        assert_eq!(Theme::Auto.resolve(true), Theme::Dark);
        assert_eq!(Theme::Auto.resolve(false), Theme::Light);
        assert_eq!(Theme::Light.resolve(true), Theme::Light);
    }

    #[test]
    fn queue_config_deserializes_partially() {
        let config: QueueConfig = serde_json::from_str(r#"{"strategy":"priority"}"#).unwrap();
        assert_eq!(config.strategy, Strategy::Priority);
        assert_eq!(config.max_toasts, 5);
    }
}

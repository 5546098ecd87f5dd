pub mod config;
pub mod cues;
pub mod error;
pub mod gesture;
pub mod lifecycle;
pub mod queue;
pub mod toast;
pub mod toaster;

pub use config::{
    ActionStyle, Callback, QueueConfig, QueueConfigPatch, Strategy, SwipeConfig, Theme,
    ToastAction, ToastConfig, ToastConfigPatch, ToasterOptions,
};
pub use cues::{CueSink, SilentCues, VIBRATION_PATTERN};
pub use error::{ConfigError, CueError};
pub use gesture::{GestureEvent, GestureState, PointerSample, SwipeGesture};
pub use lifecycle::{LifecycleController, PauseSource, PauseSources, TickReport};
pub use queue::{Insertion, Placement, QueueEngine};
pub use toast::{Category, Content, Position, Priority, Toast, ToastDuration, ToastId, ToastPatch};
pub use toaster::{PositionGroup, Toaster};

pub use toastline_scheduler::{Clock, ManualClock, SystemClock};
pub use toastline_signals::SubscriptionId;

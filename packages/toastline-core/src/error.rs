use thiserror::Error;

/// Rejected queue configuration. Raised when the config is set, never by
/// queue mutations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_toasts must be at least 1")]
    ZeroCapacity,
    #[error("max_per_group must be at least 1 when grouping is enabled")]
    ZeroGroupCapacity,
}

/// An optional sound or vibration cue could not be played.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("sound cue failed: {0}")]
    Sound(String),
    #[error("vibration cue failed: {0}")]
    Vibration(String),
}

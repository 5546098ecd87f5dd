//! Optional sound and vibration feedback when a toast appears.
//!
//! Cues are best effort: a failing [`CueSink`] is logged and otherwise
//! ignored, it never affects the toast itself.

use crate::error::CueError;
use crate::toast::{Category, Toast};

/// Vibration on/off pattern in milliseconds.
pub const VIBRATION_PATTERN: [u64; 3] = [100, 50, 100];

/// Host hook for environment-level feedback.
pub trait CueSink {
    fn play_sound(&self, category: Category) -> Result<(), CueError>;

    fn vibrate(&self, pattern: &[u64]) -> Result<(), CueError>;
}

/// The default sink: does nothing, always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play_sound(&self, _category: Category) -> Result<(), CueError> {
        Ok(())
    }

    fn vibrate(&self, _pattern: &[u64]) -> Result<(), CueError> {
        Ok(())
    }
}

pub(crate) fn emit(sink: &dyn CueSink, toast: &Toast) {
    if toast.config.sound {
        if let Err(error) = sink.play_sound(toast.category) {
            tracing::debug!(id = %toast.id, %error, "sound cue swallowed");
        }
    }
    if toast.config.vibrate {
        if let Err(error) = sink.vibrate(&VIBRATION_PATTERN) {
            tracing::debug!(id = %toast.id, %error, "vibration cue swallowed");
        }
    }
}

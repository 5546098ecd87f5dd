pub mod clock;
pub mod queue;
pub mod timer;

/// A monotonic millisecond time source.
///
/// Lifecycle logic only ever asks "what time is it now"; whoever owns the
/// event loop decides how often to tick. This keeps the engine usable from
/// tokio, a GUI frame callback, or a test that moves time by hand.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin. Must never go backwards.
    fn now_ms(&self) -> u64;
}

pub use clock::{ManualClock, SystemClock};
pub use queue::TaskQueue;
pub use timer::{TimerId, TimerQueue};

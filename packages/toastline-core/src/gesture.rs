//! Swipe-to-dismiss interpretation.
//!
//! Turns a stream of pointer samples into a drag progress and, at the end of
//! the gesture, a commit or cancel decision. Only horizontal movement counts;
//! a drag that turns out to be mostly vertical is abandoned so page scrolling
//! is left alone. Works the same for touch and mouse input.

use crate::config::SwipeConfig;

/// One pointer reading. `time_ms` comes from the same clock for a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub time_ms: u64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, time_ms: u64) -> Self {
        Self { x, y, time_ms }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        start: PointerSample,
        last: PointerSample,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Started,
    /// `min(1, |dx| / threshold)`.
    Progress(f32),
    Committed,
    Cancelled,
    /// No gesture in progress, or swiping is disabled.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SwipeGesture {
    config: SwipeConfig,
    state: GestureState,
}

impl SwipeGesture {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config: config.normalized(),
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn start(&mut self, sample: PointerSample) -> GestureEvent {
        if !self.config.enabled {
            return GestureEvent::Ignored;
        }
        if !sample.is_finite() {
            self.state = GestureState::Idle;
            return GestureEvent::Cancelled;
        }

        self.state = GestureState::Dragging {
            start: sample,
            last: sample,
        };
        GestureEvent::Started
    }

    pub fn update(&mut self, sample: PointerSample) -> GestureEvent {
        let GestureState::Dragging { start, .. } = self.state else {
            return GestureEvent::Ignored;
        };
        if !Self::consistent(&start, &sample) {
            return self.cancel();
        }

        let dx = sample.x - start.x;
        let dy = sample.y - start.y;
        if dy.abs() > dx.abs() {
            tracing::trace!(dx, dy, "vertical movement, abandoning swipe");
            return self.cancel();
        }

        self.state = GestureState::Dragging {
            start,
            last: sample,
        };
        GestureEvent::Progress(self.progress_for(dx))
    }

    /// Finishes the gesture. Without a final sample the last move is used.
    pub fn end(&mut self, sample: Option<PointerSample>) -> GestureEvent {
        let GestureState::Dragging { start, last } = self.state else {
            return GestureEvent::Ignored;
        };
        self.state = GestureState::Idle;

        let end = sample.unwrap_or(last);
        if !Self::consistent(&start, &end) {
            return GestureEvent::Cancelled;
        }

        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        if dy > dx {
            return GestureEvent::Cancelled;
        }

        // A zero-length interval would divide by zero; count it as 1ms.
        let elapsed = (end.time_ms - start.time_ms).max(1) as f64;
        let velocity = dx / elapsed;

        let committed =
            dx >= self.config.threshold || (dx > 0.0 && velocity >= self.config.velocity);
        tracing::trace!(dx, velocity, committed, "swipe ended");

        if committed {
            GestureEvent::Committed
        } else {
            GestureEvent::Cancelled
        }
    }

    pub fn cancel(&mut self) -> GestureEvent {
        let was_dragging = self.is_dragging();
        self.state = GestureState::Idle;
        if was_dragging {
            GestureEvent::Cancelled
        } else {
            GestureEvent::Ignored
        }
    }

    fn progress_for(&self, dx: f64) -> f32 {
        (dx.abs() / self.config.threshold).min(1.0) as f32
    }

    fn consistent(start: &PointerSample, sample: &PointerSample) -> bool {
        sample.is_finite() && sample.time_ms >= start.time_ms
    }
}

use std::time::Instant;

/// Weight of the previous average in each update.
pub const SMOOTHING: f32 = 0.98;

/// Exponentially smoothed per-frame render time, in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct RenderTimer {
    avg_ms: f32,
    started: Option<Instant>,
}

impl RenderTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a frame. `start` is taken by the runtime before it
    /// dispatches the iteration's input events, so event handling is counted.
    pub fn begin_at(&mut self, start: Instant) {
        self.started = Some(start);
    }

    /// Closes the frame opened by [`begin_at`](Self::begin_at) and returns the new
    /// average. Without a matching `begin` the average is left unchanged.
    pub fn end(&mut self) -> f32 {
        match self.started.take() {
            Some(t0) => self.record(t0.elapsed().as_secs_f32() * 1000.0),
            None => self.avg_ms,
        }
    }

    /// Folds one sample into the average.
    pub fn record(&mut self, sample_ms: f32) -> f32 {
        self.avg_ms = SMOOTHING * self.avg_ms + (1.0 - SMOOTHING) * sample_ms;
        self.avg_ms
    }
}

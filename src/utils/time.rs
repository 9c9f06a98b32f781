use std::time::{Duration, Instant};

/// Frame timer with pause support.
///
/// `elapsed` excludes the time spent stopped; a tick while stopped reports a
/// zero delta.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    stopped_at: Option<Instant>,
    paused: Duration,
    /// Time since last tick
    pub delta: Duration,
    /// Running time since creation or the last reset, pauses excluded
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a running timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            stopped_at: None,
            paused: Duration::ZERO,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Restarts the timer from now, running.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Pauses time accumulation. No-op when already stopped.
    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
    }

    /// Resumes after [`stop`](Self::stop); the stopped span is excluded.
    pub fn start(&mut self) {
        if let Some(stopped_at) = self.stopped_at.take() {
            let now = Instant::now();
            self.paused += now - stopped_at;
            self.last_update = now;
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// Advances one frame.
    pub fn tick(&mut self) {
        self.frame_count += 1;
        if self.stopped_at.is_some() {
            self.delta = Duration::ZERO;
            return;
        }

        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.last_update);
        self.elapsed = now
            .saturating_duration_since(self.start_time)
            .saturating_sub(self.paused);
        self.last_update = now;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

use std::time::{Duration, Instant};

const MOTION_TIME_SCALE: f32 = 0.5;
const COLOR_TIME_SCALE: f32 = 0.2;

pub struct Time {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}
impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::from_secs_f32(0.0) }
    }
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Time values sampled once at the start of a frame.
///
/// Every animator reads from the same cache so nothing observes a different
/// instant within one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeCache {
    /// Seconds since the scene started.
    pub now: f32,
    /// Slower clock for the title's bob and sway.
    pub motion: f32,
    /// Slowest clock, used only for the title's color cycle.
    pub color: f32,
}

impl TimeCache {
    pub fn at(now: f32) -> Self {
        Self { now, motion: now * MOTION_TIME_SCALE, color: now * COLOR_TIME_SCALE }
    }

    pub fn refresh(&mut self, now: f32) {
        *self = Self::at(now);
    }
}

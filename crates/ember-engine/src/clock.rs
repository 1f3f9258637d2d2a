//! Clock collaborator: supplies the per-frame delta time in seconds.
//!
//! The core uses whatever value it is given; no clamping or smoothing.

use std::time::Instant;

/// Source of per-frame delta time.
pub trait Clock {
    /// Seconds elapsed since the previous call. Non-negative.
    fn delta_time(&mut self) -> f32;
}

/// Wall-clock time between successive calls.
#[derive(Debug, Clone)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Always reports the same delta time. Used for headless and test runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub dt: f32,
}

impl FixedClock {
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

impl Clock for FixedClock {
    fn delta_time(&mut self) -> f32 {
        self.dt
    }
}

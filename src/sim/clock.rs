//! Clock service and timed tasks
//!
//! Two time sources advance together every frame:
//! - scaled time: multiplied by the global time scale (0 while paused).
//!   Drives movement, AI and knockback windows.
//! - unscaled time: always advances at wall rate. Drives the session
//!   countdown, spawn pacing and cosmetic feedback that must survive a pause.

use serde::{Deserialize, Serialize};

/// Which clock a timed task runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockDomain {
    Scaled,
    Unscaled,
}

/// Global pausable clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    time_scale: f32,
    scaled_time: f32,
    unscaled_time: f32,
    scaled_delta: f32,
    unscaled_delta: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            scaled_time: 0.0,
            unscaled_time: 0.0,
            scaled_delta: 0.0,
            unscaled_delta: 0.0,
        }
    }

    /// Advance both clocks by one frame of wall time
    pub fn advance(&mut self, real_dt: f32) {
        let real_dt = if real_dt.is_finite() { real_dt.max(0.0) } else { 0.0 };
        self.unscaled_delta = real_dt;
        self.scaled_delta = real_dt * self.time_scale;
        self.unscaled_time += self.unscaled_delta;
        self.scaled_time += self.scaled_delta;
    }

    /// Freeze gameplay time, including whatever is left of the current frame
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
        self.scaled_delta = 0.0;
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }

    pub fn scaled_delta(&self) -> f32 {
        self.scaled_delta
    }

    pub fn unscaled_delta(&self) -> f32 {
        self.unscaled_delta
    }

    pub fn scaled_time(&self) -> f32 {
        self.scaled_time
    }

    pub fn unscaled_time(&self) -> f32 {
        self.unscaled_time
    }

    /// Frame delta for the given domain
    pub fn delta(&self, domain: ClockDomain) -> f32 {
        match domain {
            ClockDomain::Scaled => self.scaled_delta,
            ClockDomain::Unscaled => self.unscaled_delta,
        }
    }
}

/// A resumable "wait until elapsed >= duration" task
///
/// Owned by whatever it animates, so dropping the owner cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
    domain: ClockDomain,
    active: bool,
}

impl Countdown {
    pub fn new(seconds: f32, domain: ClockDomain) -> Self {
        Self {
            remaining: seconds.max(0.0),
            domain,
            active: true,
        }
    }

    /// A countdown that has already finished
    pub fn finished(domain: ClockDomain) -> Self {
        Self {
            remaining: 0.0,
            domain,
            active: true,
        }
    }

    /// Advance by this frame's delta on the task's own clock.
    /// Returns true once the wait is over (and on every later call).
    pub fn advance(&mut self, clock: &Clock) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = (self.remaining - clock.delta(self.domain)).max(0.0);
        self.remaining <= 0.0
    }

    /// Stop the task; it never reports completion afterwards
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_finished(&self) -> bool {
        self.active && self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

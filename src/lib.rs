//! Kick Survival - a wave-survival arena simulation core
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (session phases, spawning, registry, combat)
//! - `tuning`: Data-driven game balance
//! - `error`: Error types for configuration loading and spawn attempts

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, SpawnError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame timestep used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Session length used when the configured one is not positive
    pub const DEFAULT_SURVIVAL_DURATION: f32 = 60.0;
    /// Lower bound for the countdown reset at the start of every Playing phase
    pub const MIN_PHASE_DURATION: f32 = 1.0;

    /// Knockback suspension window (seconds of gameplay time)
    pub const KNOCKBACK_DURATION: f32 = 0.2;
    /// Hit-flash duration (seconds of wall time)
    pub const HIT_FLASH_DURATION: f32 = 0.15;

    /// Back-pressure wait when the population cap is reached (wall time)
    pub const SPAWN_RETRY_DELAY: f32 = 0.25;

    /// Directions shorter than this are treated as zero
    pub const MIN_DIRECTION_LENGTH_SQ: f32 = 0.0001;

    /// Camera shake on a kick (intensity, seconds)
    pub const KICK_SHAKE: (f32, f32) = (0.05, 0.1);
    /// Camera shake on a damaging impact, before speed scaling
    pub const IMPACT_SHAKE: (f32, f32) = (0.2, 0.1);

    /// Autopilot kicks at enemies closer than this
    pub const AUTOPILOT_KICK_RANGE: f32 = 8.0;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Linear interpolation, `t` is clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Inverse of [`lerp`]: where `v` sits between `a` and `b`, clamped to [0, 1]
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        0.0
    } else {
        clamp01((v - a) / (b - a))
    }
}

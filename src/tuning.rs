//! Data-driven game balance
//!
//! Every section is `#[serde(default)]`, so a tuning document only needs the
//! keys it wants to override. Values are read-only once a session starts.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::curve::DifficultyCurve;
use crate::sim::enemy::EnemyTemplate;

/// Complete balance sheet for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub session: SessionTuning,
    pub spawn: SpawnConfig,
    pub enemy: EnemyTuning,
    pub elite: EliteTuning,
    pub ball: BallTuning,
    pub player: PlayerTuning,
    pub rewards: RewardTuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Length of one Playing phase (seconds)
    pub survival_duration: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            survival_duration: DEFAULT_SURVIVAL_DURATION,
        }
    }
}

/// Legal spawn rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBounds {
    pub center: Vec2,
    /// Full width and height of the arena
    pub size: Vec2,
    /// Inset from each edge where nothing spawns
    pub edge_padding: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            size: Vec2::new(30.0, 18.0),
            edge_padding: 1.5,
        }
    }
}

impl ArenaBounds {
    /// Half extents of the arena walls
    pub fn half_extents(&self) -> Vec2 {
        self.size.abs() * 0.5
    }

    /// Half extents of the spawnable rectangle (never negative)
    pub fn spawn_half_extents(&self) -> Vec2 {
        (self.half_extents() - Vec2::splat(self.edge_padding.max(0.0))).max(Vec2::ZERO)
    }
}

/// Spawn pacing and population control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Interval at difficulty 0 (seconds)
    pub base_interval: f32,
    /// Interval at difficulty 1 (seconds)
    pub min_interval: f32,
    pub base_batch: u32,
    pub max_batch: u32,
    pub difficulty_curve: DifficultyCurve,
    /// Probability that a spawned enemy is promoted to elite
    pub elite_chance: f32,
    /// Population cap (`<= 0` means uncapped)
    pub max_alive: i32,
    /// Wait before re-checking a full population (wall seconds)
    pub retry_delay: f32,
    pub arena: ArenaBounds,
    /// Enemy templates to pick from; empty disables spawning
    pub templates: Vec<EnemyTemplate>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_interval: 1.5,
            min_interval: 0.4,
            base_batch: 1,
            max_batch: 6,
            difficulty_curve: DifficultyCurve::default(),
            elite_chance: 0.1,
            max_alive: 40,
            retry_delay: SPAWN_RETRY_DELAY,
            arena: ArenaBounds::default(),
            templates: vec![EnemyTemplate::default()],
        }
    }
}

impl SpawnConfig {
    /// Population cap, if enabled
    pub fn cap(&self) -> Option<usize> {
        (self.max_alive > 0).then_some(self.max_alive as usize)
    }
}

/// Per-enemy timing windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Knockback suspension window (gameplay seconds)
    pub knockback_duration: f32,
    /// Hit-flash duration (wall seconds)
    pub flash_duration: f32,
    /// Delay between lethal damage and removal (wall seconds)
    pub death_delay: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            knockback_duration: KNOCKBACK_DURATION,
            flash_duration: HIT_FLASH_DURATION,
            death_delay: 0.0,
        }
    }
}

/// Elite stat transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteTuning {
    pub health_multiplier: f32,
    pub speed_multiplier: f32,
    pub scale_multiplier: f32,
    /// Fraction of knockback force an elite actually receives
    pub knockback_damping: f32,
}

impl Default for EliteTuning {
    fn default() -> Self {
        Self {
            health_multiplier: 1.3,
            speed_multiplier: 1.3,
            scale_multiplier: 1.25,
            knockback_damping: 0.5,
        }
    }
}

/// Kickable ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    /// Used when a kick arrives with non-positive power
    pub default_kick_power: f32,
    /// Contacts slower than this deal no damage
    pub min_damage_speed: f32,
    /// Below this speed an in-flight ball settles
    pub stop_speed: f32,
    /// Restitution on static boundaries (<= 1)
    pub bounce: f32,
    pub knockback_force: f32,
    /// Gameplay seconds after a kick before the owner can catch again
    pub catch_delay: f32,
    /// Carry distance in front of the player
    pub hold_distance: f32,
    pub radius: f32,
    /// Per-second velocity decay applied by the physics backend
    pub linear_damping: f32,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            default_kick_power: 25.0,
            min_damage_speed: 5.0,
            stop_speed: 1.0,
            bounce: 1.0,
            knockback_force: 5.0,
            catch_delay: 0.2,
            hold_distance: 1.2,
            radius: 0.35,
            linear_damping: 0.9,
        }
    }
}

/// Player actor starting stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    pub move_speed: f32,
    pub kick_power: f32,
    pub kick_cooldown: f32,
    pub catch_range: f32,
    pub radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 5,
            move_speed: 7.0,
            kick_power: 25.0,
            kick_cooldown: 0.5,
            catch_range: 1.5,
            radius: 0.5,
        }
    }
}

/// Reward magnitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    pub heal_amount: i32,
    pub move_speed_bonus: f32,
    pub ball_damage_bonus: i32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            heal_amount: 3,
            move_speed_bonus: 1.0,
            ball_damage_bonus: 1,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tuning document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Replace invalid values with sane defaults
    ///
    /// Never fails: a bad value degrades to its default and is logged.
    pub fn sanitized(mut self) -> Self {
        if !(self.session.survival_duration > 0.0) {
            log::warn!(
                "survival_duration {} is not positive, using {}",
                self.session.survival_duration,
                DEFAULT_SURVIVAL_DURATION
            );
            self.session.survival_duration = DEFAULT_SURVIVAL_DURATION;
        }

        let spawn = &mut self.spawn;
        if !(spawn.base_interval > 0.0) {
            log::warn!("base_interval {} is not positive, using 1.5", spawn.base_interval);
            spawn.base_interval = 1.5;
        }
        if !(spawn.min_interval > 0.0) {
            log::warn!("min_interval {} is not positive, using 0.4", spawn.min_interval);
            spawn.min_interval = spawn.base_interval.min(0.4);
        }
        if spawn.min_interval > spawn.base_interval {
            log::warn!("min_interval exceeds base_interval, swapping");
            std::mem::swap(&mut spawn.min_interval, &mut spawn.base_interval);
        }
        if spawn.base_batch > spawn.max_batch {
            log::warn!("base_batch exceeds max_batch, swapping");
            std::mem::swap(&mut spawn.base_batch, &mut spawn.max_batch);
        }
        if !(0.0..=1.0).contains(&spawn.elite_chance) {
            log::warn!("elite_chance {} outside [0, 1], clamping", spawn.elite_chance);
            spawn.elite_chance = crate::clamp01(spawn.elite_chance);
        }
        if !(spawn.retry_delay > 0.0) {
            spawn.retry_delay = SPAWN_RETRY_DELAY;
        }

        if !(self.ball.default_kick_power > 0.0) {
            log::warn!("default_kick_power is not positive, using 25");
            self.ball.default_kick_power = 25.0;
        }
        self.ball.bounce = crate::clamp01(self.ball.bounce);
        if self.player.max_health <= 0 {
            log::warn!("player max_health is not positive, using 5");
            self.player.max_health = 5;
        }
        self.elite.knockback_damping = crate::clamp01(self.elite.knockback_damping);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "session": { "survival_duration": 30 } }"#).unwrap();
        assert_eq!(tuning.session.survival_duration, 30.0);
        assert_eq!(tuning.spawn, SpawnConfig::default());
        assert_eq!(tuning.player.max_health, 5);
    }

    #[test]
    fn test_arena_and_curve_parse() {
        let json = r#"{
            "spawn": {
                "arena": { "center": [2.0, -1.0], "size": [10.0, 6.0], "edge_padding": 1.0 },
                "difficulty_curve": [[0.0, 0.0], [1.0, 1.0]],
                "max_alive": 0
            }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.spawn.arena.center, Vec2::new(2.0, -1.0));
        assert_eq!(tuning.spawn.arena.spawn_half_extents(), Vec2::new(4.0, 2.0));
        assert_eq!(tuning.spawn.cap(), None);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_sanitize_substitutes_defaults() {
        let mut tuning = Tuning::default();
        tuning.session.survival_duration = -5.0;
        tuning.spawn.base_interval = 0.2;
        tuning.spawn.min_interval = 1.0;
        tuning.spawn.base_batch = 8;
        tuning.spawn.max_batch = 2;
        tuning.spawn.elite_chance = 3.0;
        tuning.ball.default_kick_power = 0.0;

        let tuning = tuning.sanitized();
        assert_eq!(tuning.session.survival_duration, DEFAULT_SURVIVAL_DURATION);
        assert_eq!(tuning.spawn.base_interval, 1.0);
        assert_eq!(tuning.spawn.min_interval, 0.2);
        assert_eq!((tuning.spawn.base_batch, tuning.spawn.max_batch), (2, 8));
        assert_eq!(tuning.spawn.elite_chance, 1.0);
        assert_eq!(tuning.ball.default_kick_power, 25.0);
    }

    #[test]
    fn test_degenerate_arena_never_negative() {
        let arena = ArenaBounds {
            center: Vec2::ZERO,
            size: Vec2::new(2.0, 2.0),
            edge_padding: 5.0,
        };
        assert_eq!(arena.spawn_half_extents(), Vec2::ZERO);
    }
}

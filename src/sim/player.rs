//! Player actor stat surface
//!
//! Rewards write `health`, `move_speed` and `ball_damage_bonus` directly.
//! Reaching zero health freezes the player; the session turns that into
//! game over.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::BodyId;
use crate::tuning::PlayerTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub health: i32,
    pub max_health: i32,
    pub move_speed: f32,
    pub kick_power: f32,
    pub ball_damage_bonus: i32,
    pub kick_cooldown: f32,
    pub catch_range: f32,
    pub radius: f32,
    /// Last non-zero movement direction (kick and carry direction)
    pub look_dir: Vec2,
    can_move: bool,
    last_kick_time: Option<f32>,
}

impl Default for Player {
    fn default() -> Self {
        Self::from_tuning(&PlayerTuning::default())
    }
}

impl Player {
    pub fn from_tuning(tuning: &PlayerTuning) -> Self {
        let max_health = tuning.max_health.max(1);
        Self {
            health: max_health,
            max_health,
            move_speed: tuning.move_speed,
            kick_power: tuning.kick_power,
            ball_damage_bonus: 0,
            kick_cooldown: tuning.kick_cooldown,
            catch_range: tuning.catch_range,
            radius: tuning.radius,
            look_dir: Vec2::Y,
            can_move: true,
            last_kick_time: None,
        }
    }

    pub fn body(&self) -> BodyId {
        BodyId::Player
    }

    /// Restore health, clamped to `[0, max_health]`
    pub fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount).clamp(0, self.max_health);
        log::debug!("Player healed, health {}", self.health);
    }

    /// Returns true if this hit brought health to zero
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        log::debug!("Player hit, health {}", self.health);
        if self.health <= 0 {
            self.can_move = false;
            return true;
        }
        false
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    /// Track facing from movement input
    pub fn update_look(&mut self, move_axis: Vec2) {
        if let Some(dir) = move_axis.try_normalize() {
            self.look_dir = dir;
        }
    }

    /// Velocity to command for a movement axis
    pub fn desired_velocity(&self, move_axis: Vec2) -> Vec2 {
        if !self.can_move {
            return Vec2::ZERO;
        }
        move_axis.clamp_length_max(1.0) * self.move_speed
    }

    /// Kick cooldown has elapsed at scaled time `now`
    pub fn can_kick(&self, now: f32) -> bool {
        if !self.can_move {
            return false;
        }
        match self.last_kick_time {
            Some(last) => now >= last + self.kick_cooldown,
            None => true,
        }
    }

    pub fn record_kick(&mut self, now: f32) {
        self.last_kick_time = Some(now);
    }
}

//! The kickable ball
//!
//! Held while carried, InFlight right after a kick (deals contact damage),
//! Settling once it slows under the stop speed (catchable, harmless).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::bounce_velocity;
use super::physics::BodyId;
use crate::consts::MIN_DIRECTION_LENGTH_SQ;
use crate::tuning::BallTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Carried by its owner
    Held,
    /// Kicked and dangerous
    InFlight,
    /// Rolling out; can be caught, deals no damage
    Settling,
}

/// A damaging contact resolved by the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallHit {
    pub damage: i32,
    /// Unit push direction for the knockback
    pub push: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub state: BallState,
    /// `1 + bonus` from the most recent kick
    pub damage: i32,
    /// Velocity as of the last kick/contact/catch
    pub vel: Vec2,
    /// Body that carries the ball; contacts with it are ignored
    pub owner: BodyId,
    /// Scaled time of the last kick
    kicked_at: Option<f32>,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(BodyId::Player)
    }
}

impl Ball {
    pub fn new(owner: BodyId) -> Self {
        Self {
            state: BallState::Held,
            damage: 1,
            vel: Vec2::ZERO,
            owner,
            kicked_at: None,
        }
    }

    pub fn body(&self) -> BodyId {
        BodyId::Ball
    }

    pub fn is_held(&self) -> bool {
        self.state == BallState::Held
    }

    pub fn can_damage(&self) -> bool {
        self.state == BallState::InFlight
    }

    /// Launch the ball. Returns the velocity to hand to physics.
    ///
    /// A near-zero direction falls back to up; non-positive power falls back
    /// to the default kick power.
    pub fn kick(&mut self, direction: Vec2, power: f32, bonus_damage: i32, now: f32, tuning: &BallTuning) -> Vec2 {
        let direction = if direction.length_squared() < MIN_DIRECTION_LENGTH_SQ || !direction.is_finite() {
            Vec2::Y
        } else {
            direction.normalize()
        };
        let power = if power > 0.0 { power } else { tuning.default_kick_power };

        self.state = BallState::InFlight;
        self.damage = bonus_damage.saturating_add(1);
        self.vel = direction * power;
        self.kicked_at = Some(now);
        self.vel
    }

    /// Resolve a contact with an enemy.
    ///
    /// Returns a hit only while InFlight and moving at least `min_damage_speed`.
    pub fn on_contact_enemy(&mut self, ball_pos: Vec2, ball_vel: Vec2, enemy_pos: Vec2, tuning: &BallTuning) -> Option<BallHit> {
        self.vel = ball_vel;
        if !self.can_damage() {
            return None;
        }
        let speed = ball_vel.length();
        if speed < tuning.min_damage_speed {
            return None;
        }

        let push = match ball_vel.try_normalize() {
            Some(dir) => dir,
            None => (enemy_pos - ball_pos).try_normalize().unwrap_or(Vec2::Y),
        };
        Some(BallHit {
            damage: self.damage,
            push,
            speed,
        })
    }

    /// Bounce off a static boundary. Returns the new velocity.
    pub fn on_contact_boundary(&mut self, ball_vel: Vec2, normal: Vec2, tuning: &BallTuning) -> Vec2 {
        if self.is_held() {
            return ball_vel;
        }
        self.vel = bounce_velocity(ball_vel, normal, tuning.bounce);
        self.update_settling(self.vel.length(), tuning);
        self.vel
    }

    /// InFlight -> Settling once speed drops under the stop speed.
    /// Returns true on the transition.
    pub fn update_settling(&mut self, speed: f32, tuning: &BallTuning) -> bool {
        if self.state == BallState::InFlight && speed < tuning.stop_speed {
            self.state = BallState::Settling;
            return true;
        }
        false
    }

    /// True when the owner may pick the ball back up
    pub fn can_be_caught(&self, now: f32, tuning: &BallTuning) -> bool {
        if self.state != BallState::Settling {
            return false;
        }
        match self.kicked_at {
            Some(t) => now - t >= tuning.catch_delay,
            None => true,
        }
    }

    /// Back to Held with zero velocity, whatever the prior state
    pub fn on_caught(&mut self) {
        self.state = BallState::Held;
        self.vel = Vec2::ZERO;
    }

    /// Carry position in front of the owner
    pub fn hold_position(owner_pos: Vec2, look_dir: Vec2, tuning: &BallTuning) -> Vec2 {
        owner_pos + look_dir.normalize_or(Vec2::Y) * tuning.hold_distance
    }
}

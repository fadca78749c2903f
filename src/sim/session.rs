//! Session state machine
//!
//! `Playing -> Reward -> Playing -> ... -> GameOver`. The countdown runs on
//! the unscaled clock. Leaving Playing for Reward stops the spawner and clears
//! every live enemy before the phase flips, then freezes gameplay time until a
//! reward is chosen. GameOver is terminal.

use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::enemy::EnemyStore;
use super::player::Player;
use super::registry::EntityRegistry;
use super::spawner::SpawnScheduler;
use super::state::GameEvent;
use crate::consts::{DEFAULT_SURVIVAL_DURATION, MIN_PHASE_DURATION};
use crate::tuning::RewardTuning;

/// Top-level session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    /// Waiting for a reward choice; gameplay time frozen
    Reward,
    /// Terminal
    GameOver,
}

/// Reward offered between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardChoice {
    Heal,
    MoveSpeedUp,
    BallDamageUp,
}

impl RewardChoice {
    pub const ALL: [RewardChoice; 3] = [
        RewardChoice::Heal,
        RewardChoice::MoveSpeedUp,
        RewardChoice::BallDamageUp,
    ];
}

/// Systems a phase transition touches
pub struct SessionCtx<'a> {
    pub clock: &'a mut Clock,
    pub spawner: &'a mut SpawnScheduler,
    pub registry: &'a mut EntityRegistry,
    pub enemies: &'a mut EnemyStore,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    phase: Phase,
    time_remaining: f32,
    survival_duration: f32,
    /// Survival phases completed so far
    phases_cleared: u32,
}

impl Session {
    /// Non-positive (or non-finite) durations fall back to the default
    pub fn new(survival_duration: f32) -> Self {
        let survival_duration = if survival_duration > 0.0 && survival_duration.is_finite() {
            survival_duration
        } else {
            log::warn!(
                "survival_duration {} is invalid, using {}",
                survival_duration,
                DEFAULT_SURVIVAL_DURATION
            );
            DEFAULT_SURVIVAL_DURATION
        };
        Self {
            phase: Phase::Playing,
            time_remaining: survival_duration.max(MIN_PHASE_DURATION),
            survival_duration,
            phases_cleared: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn survival_duration(&self) -> f32 {
        self.survival_duration
    }

    pub fn phases_cleared(&self) -> u32 {
        self.phases_cleared
    }

    /// Enter (or re-enter) Playing. No-op once the game is over.
    pub fn start_playing(&mut self, ctx: &mut SessionCtx<'_>) {
        if self.phase == Phase::GameOver {
            return;
        }
        ctx.clock.resume();
        self.phase = Phase::Playing;
        self.time_remaining = self.survival_duration.max(MIN_PHASE_DURATION);
        ctx.spawner.start();
        ctx.events.push(GameEvent::PhaseChanged { phase: Phase::Playing });
        log::info!("Phase {} started ({:.0}s)", self.phases_cleared + 1, self.time_remaining);
    }

    /// Count down on wall time; completes the phase at zero
    pub fn tick(&mut self, ctx: &mut SessionCtx<'_>) {
        if self.phase != Phase::Playing {
            return;
        }
        self.time_remaining = (self.time_remaining - ctx.clock.unscaled_delta()).max(0.0);
        if self.time_remaining <= 0.0 {
            self.on_phase_complete(ctx);
        }
    }

    /// Survival phase won: stop spawning, clear the field, offer a reward
    pub fn on_phase_complete(&mut self, ctx: &mut SessionCtx<'_>) {
        if self.phase != Phase::Playing {
            return;
        }
        ctx.spawner.stop();
        let cleared = ctx.registry.clear_all(&mut *ctx.enemies);
        ctx.clock.pause();

        self.phase = Phase::Reward;
        self.phases_cleared += 1;
        ctx.events.push(GameEvent::PhaseChanged { phase: Phase::Reward });
        ctx.events.push(GameEvent::RewardOffered {
            choices: RewardChoice::ALL.to_vec(),
        });
        log::info!("Phase {} cleared, {} enemies removed", self.phases_cleared, cleared);
    }

    /// Apply the chosen reward and resume play.
    /// Returns false outside the Reward phase.
    pub fn apply_reward(
        &mut self,
        choice: RewardChoice,
        player: &mut Player,
        rewards: &RewardTuning,
        ctx: &mut SessionCtx<'_>,
    ) -> bool {
        if self.phase != Phase::Reward {
            return false;
        }
        match choice {
            RewardChoice::Heal => player.heal(rewards.heal_amount),
            RewardChoice::MoveSpeedUp => player.move_speed += rewards.move_speed_bonus,
            RewardChoice::BallDamageUp => {
                let bonus = &mut player.ball_damage_bonus;
                *bonus = bonus.saturating_add(rewards.ball_damage_bonus);
            }
        }
        ctx.events.push(GameEvent::RewardApplied { choice });
        log::info!("Reward applied: {:?}", choice);
        self.start_playing(ctx);
        true
    }

    /// End the run. Only valid from Playing; repeated calls are no-ops.
    pub fn game_over(&mut self, ctx: &mut SessionCtx<'_>) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        ctx.clock.pause();
        ctx.spawner.stop();
        self.phase = Phase::GameOver;
        ctx.events.push(GameEvent::PhaseChanged { phase: Phase::GameOver });
        ctx.events.push(GameEvent::GameOver {
            phases_cleared: self.phases_cleared,
        });
        log::info!("Game over after {} cleared phases", self.phases_cleared);
        true
    }

    /// Remaining time as `MM:SS`, seconds rounded up
    pub fn timer_label(&self) -> String {
        let secs = self.time_remaining.max(0.0).ceil() as u32;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

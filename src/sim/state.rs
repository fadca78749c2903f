//! Game state aggregate
//!
//! Owns every simulation service explicitly; nothing is global. The physics
//! backend is the one collaborator held outside and passed into each call.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::enemy::{EnemyId, EnemyStore};
use super::physics::{BodyDesc, BodyId, PhysicsBackend};
use super::player::Player;
use super::projectile::Ball;
use super::registry::EntityRegistry;
use super::session::{Phase, RewardChoice, Session, SessionCtx};
use super::spawner::SpawnScheduler;
use crate::tuning::Tuning;

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { phase: Phase },
    /// Show the reward picker
    RewardOffered { choices: Vec<RewardChoice> },
    RewardApplied { choice: RewardChoice },
    GameOver { phases_cleared: u32 },
    EnemySpawned { id: EnemyId, position: Vec2, elite: bool },
    EnemyDied { id: EnemyId },
    PlayerDamaged { amount: i32, health: i32 },
    BallKicked { velocity: Vec2 },
    BallCaught,
    /// Camera shake request
    Shake { intensity: f32, duration: f32 },
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub clock: Clock,
    pub session: Session,
    pub spawner: SpawnScheduler,
    pub registry: EntityRegistry,
    /// Enemy entities (sorted by id)
    pub enemies: EnemyStore,
    pub player: Player,
    pub ball: Ball,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub kills: u32,
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a session, create the player and ball bodies, and start the
    /// first Playing phase
    pub fn new(seed: u64, tuning: Tuning, physics: &mut impl PhysicsBackend) -> Self {
        let tuning = tuning.sanitized();
        let player = Player::from_tuning(&tuning.player);
        let ball = Ball::new(player.body());
        let session = Session::new(tuning.session.survival_duration);

        let mut state = Self {
            seed,
            clock: Clock::new(),
            session,
            spawner: SpawnScheduler::new(),
            registry: EntityRegistry::new(),
            enemies: EnemyStore::new(),
            player,
            ball,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            kills: 0,
            events: Vec::new(),
            tuning,
        };

        let start = state.tuning.spawn.arena.center;
        if !physics.spawn_body(BodyId::Player, BodyDesc::circle(start, state.player.radius)) {
            log::warn!("Physics refused the player body");
        }
        let hold = Ball::hold_position(start, state.player.look_dir, &state.tuning.ball);
        let ball_desc = BodyDesc::circle(hold, state.tuning.ball.radius).with_damping(state.tuning.ball.linear_damping);
        if !physics.spawn_body(BodyId::Ball, ball_desc) {
            log::warn!("Physics refused the ball body");
        }

        state.start_playing();
        log::info!("Game state created with seed {}", seed);
        state
    }

    fn session_parts(&mut self) -> (&mut Session, SessionCtx<'_>) {
        (
            &mut self.session,
            SessionCtx {
                clock: &mut self.clock,
                spawner: &mut self.spawner,
                registry: &mut self.registry,
                enemies: &mut self.enemies,
                events: &mut self.events,
            },
        )
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn start_playing(&mut self) {
        let (session, mut ctx) = self.session_parts();
        session.start_playing(&mut ctx);
    }

    /// Advance the phase countdown
    pub fn tick_session(&mut self) {
        let (session, mut ctx) = self.session_parts();
        session.tick(&mut ctx);
    }

    pub fn complete_phase(&mut self) {
        let (session, mut ctx) = self.session_parts();
        session.on_phase_complete(&mut ctx);
    }

    pub fn apply_reward(&mut self, choice: RewardChoice) -> bool {
        let mut ctx = SessionCtx {
            clock: &mut self.clock,
            spawner: &mut self.spawner,
            registry: &mut self.registry,
            enemies: &mut self.enemies,
            events: &mut self.events,
        };
        self.session
            .apply_reward(choice, &mut self.player, &self.tuning.rewards, &mut ctx)
    }

    pub fn game_over(&mut self) -> bool {
        let (session, mut ctx) = self.session_parts();
        session.game_over(&mut ctx)
    }

    /// Live enemy count (pruned)
    pub fn alive_enemies(&mut self) -> usize {
        self.registry.count(&self.enemies)
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::KinematicWorld;

    fn new_state(seed: u64) -> (GameState, KinematicWorld) {
        let tuning = Tuning::default();
        let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
        let state = GameState::new(seed, tuning, &mut physics);
        (state, physics)
    }

    #[test]
    fn test_new_state_is_playing_with_bodies() {
        let (mut state, physics) = new_state(1);
        assert_eq!(state.phase(), Phase::Playing);
        assert!(state.spawner.is_running());
        assert!(physics.contains(BodyId::Player));
        assert!(physics.contains(BodyId::Ball));
        assert!(state.ball.is_held());
        assert_eq!(state.alive_enemies(), 0);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let (mut state, _physics) = new_state(2);
        let events = state.drain_events();
        assert_eq!(events, vec![GameEvent::PhaseChanged { phase: Phase::Playing }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_sanitizes_tuning() {
        let mut tuning = Tuning::default();
        tuning.session.survival_duration = -3.0;
        let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
        let state = GameState::new(3, tuning, &mut physics);
        assert!(state.session.time_remaining() > 0.0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&GameEvent::RewardApplied {
            choice: RewardChoice::Heal,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"reward_applied","choice":"Heal"}"#);
    }
}

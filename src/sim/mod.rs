//! Simulation module
//!
//! All gameplay logic lives here, advanced by one cooperative tick per frame:
//! - Two clocks: scaled (pausable gameplay time) and unscaled (wall time)
//! - Every timed window is a [`Countdown`] owned by the thing it animates
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Physics behind the [`PhysicsBackend`] trait; no rendering or platform code

pub mod clock;
pub mod collision;
pub mod curve;
pub mod enemy;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod registry;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::{Clock, ClockDomain, Countdown};
pub use collision::{CollisionResult, bounce_velocity, circle_arena_collision, circle_circle_collision};
pub use curve::DifficultyCurve;
pub use enemy::{DamageOutcome, Enemy, EnemyId, EnemyStore, EnemyTemplate, LifeState, MotionState};
pub use physics::{BodyDesc, BodyId, Contact, ContactTarget, KinematicWorld, PhysicsBackend};
pub use player::Player;
pub use projectile::{Ball, BallHit, BallState};
pub use registry::{EntityRegistry, EntityStore};
pub use session::{Phase, RewardChoice, Session, SessionCtx};
pub use spawner::{CycleParameters, SpawnScheduler, SpawnTargets, SpawnedEnemy};
pub use state::{GameEvent, GameState};
pub use tick::{TickInput, tick};

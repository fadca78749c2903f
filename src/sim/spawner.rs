//! Difficulty-driven spawn scheduler
//!
//! Interval/batch model. Each cycle:
//! - progress = clamp01(t / survival_duration), t = wall time spent Playing
//! - difficulty = curve(progress)
//! - interval = lerp(base_interval, min_interval, difficulty)
//! - batch = round(lerp(base_batch, max_batch, difficulty)), clipped to the
//!   room left under the population cap
//!
//! Waits run on the unscaled clock. A full population triggers a short fixed
//! retry wait instead of a spawn.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, ClockDomain, Countdown};
use super::enemy::{EnemyId, EnemyStore};
use super::physics::PhysicsBackend;
use super::registry::EntityRegistry;
use super::session::Phase;
use crate::lerp;
use crate::tuning::{ArenaBounds, EliteTuning, SpawnConfig};

/// Pacing values for one spawn cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleParameters {
    pub progress: f32,
    pub difficulty: f32,
    pub interval: f32,
    pub batch: u32,
}

/// One enemy created by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnedEnemy {
    pub id: EnemyId,
    pub position: Vec2,
    pub elite: bool,
}

/// Everything a spawn cycle writes to
pub struct SpawnTargets<'a, P: PhysicsBackend> {
    pub enemies: &'a mut EnemyStore,
    pub registry: &'a mut EntityRegistry,
    pub physics: &'a mut P,
    pub rng: &'a mut Pcg32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    running: bool,
    /// Progress time for the difficulty curve
    elapsed: f32,
    wait: Countdown,
    cycles: u64,
    spawned_total: u64,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            running: false,
            elapsed: 0.0,
            wait: Countdown::finished(ClockDomain::Unscaled),
            cycles: 0,
            spawned_total: 0,
        }
    }

    /// Begin a spawning run. No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.elapsed = 0.0;
        self.wait = Countdown::finished(ClockDomain::Unscaled);
        log::info!("Spawner started");
    }

    /// Stop spawning. No-op if not running.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.wait.cancel();
        log::info!("Spawner stopped after {} cycles", self.cycles);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Seconds until the next cycle
    pub fn time_to_next_cycle(&self) -> f32 {
        self.wait.remaining()
    }

    /// Pacing for a cycle at progress time `elapsed`
    pub fn cycle_parameters(config: &SpawnConfig, elapsed: f32, survival_duration: f32) -> CycleParameters {
        let progress = if survival_duration > 0.0 {
            crate::clamp01(elapsed / survival_duration)
        } else {
            0.0
        };
        let difficulty = config.difficulty_curve.evaluate(progress);
        let interval = lerp(config.base_interval, config.min_interval, difficulty);
        let batch = lerp(config.base_batch as f32, config.max_batch as f32, difficulty).round();
        CycleParameters {
            progress,
            difficulty,
            interval,
            batch: batch.max(0.0) as u32,
        }
    }

    /// Uniform point inside the arena inset by its edge padding
    pub fn random_point_in_arena(arena: &ArenaBounds, rng: &mut Pcg32) -> Vec2 {
        let half = arena.spawn_half_extents();
        let x = if half.x > 0.0 {
            rng.random_range(arena.center.x - half.x..=arena.center.x + half.x)
        } else {
            arena.center.x
        };
        let y = if half.y > 0.0 {
            rng.random_range(arena.center.y - half.y..=arena.center.y + half.y)
        } else {
            arena.center.y
        };
        Vec2::new(x, y)
    }

    /// Advance the scheduler by one frame; returns the enemies created
    pub fn tick<P: PhysicsBackend>(
        &mut self,
        phase: Phase,
        clock: &Clock,
        survival_duration: f32,
        config: &SpawnConfig,
        elite: &EliteTuning,
        targets: SpawnTargets<'_, P>,
    ) -> Vec<SpawnedEnemy> {
        // Idle outside Playing without consuming a spawn slot
        if !self.running || phase != Phase::Playing {
            return Vec::new();
        }

        self.elapsed += clock.unscaled_delta();
        if !self.wait.advance(clock) {
            return Vec::new();
        }

        let alive = targets.registry.count(&*targets.enemies);
        let room = match config.cap() {
            Some(cap) if alive >= cap => {
                self.wait = Countdown::new(config.retry_delay, ClockDomain::Unscaled);
                log::debug!("Population cap reached ({}/{}), retrying", alive, cap);
                return Vec::new();
            }
            Some(cap) => Some((cap - alive) as u32),
            None => None,
        };

        let params = Self::cycle_parameters(config, self.elapsed, survival_duration);
        let batch = room.map_or(params.batch, |room| params.batch.min(room));
        self.cycles += 1;

        let spawned = self.spawn_batch(batch, config, elite, targets);
        log::debug!(
            "Spawn cycle {}: difficulty {:.2}, interval {:.2}s, {} spawned",
            self.cycles,
            params.difficulty,
            params.interval,
            spawned.len()
        );

        self.wait = Countdown::new(params.interval, ClockDomain::Unscaled);
        spawned
    }

    fn spawn_batch<P: PhysicsBackend>(
        &mut self,
        count: u32,
        config: &SpawnConfig,
        elite: &EliteTuning,
        targets: SpawnTargets<'_, P>,
    ) -> Vec<SpawnedEnemy> {
        let SpawnTargets {
            enemies,
            registry,
            physics,
            rng,
        } = targets;

        let mut spawned = Vec::new();
        if config.templates.is_empty() {
            return spawned;
        }

        for _ in 0..count {
            let template = &config.templates[rng.random_range(0..config.templates.len())];
            let position = Self::random_point_in_arena(&config.arena, rng);

            let id = match enemies.spawn(template, position, physics) {
                Ok(id) => id,
                Err(err) => {
                    // One bad spawn must not end the run
                    log::warn!("Spawn attempt failed: {}", err);
                    continue;
                }
            };

            let promoted = rng.random_bool(crate::clamp01(config.elite_chance) as f64)
                && enemies.get_mut(id).is_some_and(|e| e.make_elite(elite));
            registry.register(id, &*enemies);

            self.spawned_total += 1;
            spawned.push(SpawnedEnemy {
                id,
                position,
                elite: promoted,
            });
        }
        spawned
    }
}

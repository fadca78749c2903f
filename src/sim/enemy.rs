//! Enemies: stats, chase/attack AI, damage, elite promotion, knockback
//!
//! Elite and normal enemies share one record and one behavior graph; elite is
//! a flag plus multiplied stats. Every timed window (knockback suspension,
//! hit flash, death delay) is owned by the enemy, so removing the enemy
//! cancels them.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, ClockDomain, Countdown};
use super::physics::{BodyDesc, BodyId, PhysicsBackend};
use super::registry::{EntityRegistry, EntityStore};
use crate::consts::MIN_DIRECTION_LENGTH_SQ;
use crate::error::SpawnError;
use crate::tuning::{EliteTuning, EnemyTuning};

/// Stable enemy handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Base stats an enemy is instantiated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTemplate {
    pub name: String,
    pub max_health: i32,
    pub move_speed: f32,
    pub attack_range: f32,
    /// Gameplay seconds between attacks
    pub attack_cooldown: f32,
    pub attack_damage: i32,
    pub radius: f32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            name: "grunt".to_string(),
            max_health: 3,
            move_speed: 3.0,
            attack_range: 1.2,
            attack_cooldown: 1.0,
            attack_damage: 1,
            radius: 0.5,
        }
    }
}

/// Movement mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    /// Steering toward the player
    Chasing,
    /// Knocked back: AI skipped until scaled time reaches `until`
    Suspended { until: f32 },
}

/// Lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    /// Lethal damage applied; removed once the countdown finishes
    Dying { removal: Countdown },
}

/// Result of a damage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Enemy was already dying (or unknown)
    Ignored,
    Hurt,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub health: i32,
    pub max_health: i32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_damage: i32,
    pub radius: f32,
    /// Visual size multiplier
    pub scale: f32,
    /// Scaled time of the last attack
    pub last_attack_time: Option<f32>,
    is_elite: bool,
    motion: MotionState,
    life: LifeState,
    flash: Option<Countdown>,
}

impl Enemy {
    pub fn from_template(id: EnemyId, template: &EnemyTemplate) -> Self {
        let max_health = template.max_health.max(1);
        Self {
            id,
            health: max_health,
            max_health,
            move_speed: template.move_speed.max(0.0),
            attack_range: template.attack_range.max(0.0),
            attack_cooldown: template.attack_cooldown.max(0.0),
            attack_damage: template.attack_damage.max(0),
            radius: template.radius,
            scale: 1.0,
            last_attack_time: None,
            is_elite: false,
            motion: MotionState::Chasing,
            life: LifeState::Alive,
            flash: None,
        }
    }

    pub fn body(&self) -> BodyId {
        BodyId::Enemy(self.id)
    }

    pub fn is_elite(&self) -> bool {
        self.is_elite
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.life, LifeState::Dying { .. })
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    /// True while a hit flash is showing
    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Scaled time when the current knockback ends, if suspended
    pub fn knockback_until(&self) -> Option<f32> {
        match self.motion {
            MotionState::Suspended { until } => Some(until),
            MotionState::Chasing => None,
        }
    }

    /// One-time elite promotion. Returns false if already elite or dying.
    pub fn make_elite(&mut self, elite: &EliteTuning) -> bool {
        if self.is_elite || self.is_dying() {
            return false;
        }
        self.is_elite = true;
        self.max_health = ((self.max_health as f32 * elite.health_multiplier).trunc() as i32).max(1);
        self.health = self.max_health;
        self.move_speed *= elite.speed_multiplier.max(0.0);
        self.scale *= elite.scale_multiplier.max(0.0);
        true
    }

    /// Subtract health. Lethal damage flips the enemy to dying exactly once.
    pub fn take_damage(&mut self, amount: i32, tuning: &EnemyTuning) -> DamageOutcome {
        if self.is_dying() {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        self.flash = Some(Countdown::new(tuning.flash_duration, ClockDomain::Unscaled));

        if self.health <= 0 {
            self.die(tuning.death_delay);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    /// Enter the dying state. Returns false if already dying.
    pub fn die(&mut self, death_delay: f32) -> bool {
        if self.is_dying() {
            return false;
        }
        self.flash = None;
        self.life = LifeState::Dying {
            removal: Countdown::new(death_delay, ClockDomain::Unscaled),
        };
        true
    }

    /// Start a knockback window at scaled time `now`.
    /// Returns the impulse to hand to physics, or None if rejected.
    pub fn apply_knockback(
        &mut self,
        direction: Vec2,
        force: f32,
        now: f32,
        tuning: &EnemyTuning,
        elite: &EliteTuning,
    ) -> Option<Vec2> {
        if self.is_dying() || direction.length_squared() < MIN_DIRECTION_LENGTH_SQ {
            return None;
        }
        let damping = if self.is_elite { elite.knockback_damping } else { 1.0 };
        self.motion = MotionState::Suspended {
            until: now + tuning.knockback_duration,
        };
        Some(direction.normalize() * force * damping)
    }

    fn can_attack(&self, now: f32) -> bool {
        match self.last_attack_time {
            Some(last) => now - last >= self.attack_cooldown,
            None => true,
        }
    }
}

/// Per-tick summary from [`EnemyStore::update`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnemyTickReport {
    /// Attacks landed on the player this tick: (attacker, damage)
    pub attacks: Vec<(EnemyId, i32)>,
    /// Enemies whose knockback window ended this tick
    pub recovered: Vec<EnemyId>,
    /// Dying enemies removed this tick
    pub removed: Vec<EnemyId>,
}

/// Owns every enemy entity (sorted by id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyStore {
    enemies: Vec<Enemy>,
    next_id: u32,
    /// Destroyed enemies whose physics bodies still need removing
    #[serde(skip)]
    pending_despawn: Vec<EnemyId>,
}

impl EnemyStore {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
            pending_despawn: Vec::new(),
        }
    }

    fn next_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Instantiate an enemy and its physics body
    pub fn spawn(
        &mut self,
        template: &EnemyTemplate,
        position: Vec2,
        physics: &mut impl PhysicsBackend,
    ) -> Result<EnemyId, SpawnError> {
        if !position.is_finite() {
            return Err(SpawnError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let id = self.next_enemy_id();
        let enemy = Enemy::from_template(id, template);
        if !physics.spawn_body(enemy.body(), BodyDesc::circle(position, enemy.radius)) {
            return Err(SpawnError::BodyRejected(id.0));
        }
        self.enemies.push(enemy);
        Ok(id)
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.enemies[i])
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        match self.enemies.binary_search_by_key(&id, |e| e.id) {
            Ok(i) => Some(&mut self.enemies[i]),
            Err(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Damage an enemy; a kill unregisters it immediately
    pub fn damage(
        &mut self,
        id: EnemyId,
        amount: i32,
        registry: &mut EntityRegistry,
        tuning: &EnemyTuning,
    ) -> DamageOutcome {
        let Some(enemy) = self.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = enemy.take_damage(amount, tuning);
        if outcome == DamageOutcome::Killed {
            registry.remove(id);
            log::debug!("Enemy {} died", id);
        }
        outcome
    }

    /// Knock an enemy back, applying the impulse exactly once
    #[allow(clippy::too_many_arguments)]
    pub fn knockback(
        &mut self,
        id: EnemyId,
        direction: Vec2,
        force: f32,
        now: f32,
        physics: &mut impl PhysicsBackend,
        tuning: &EnemyTuning,
        elite: &EliteTuning,
    ) -> bool {
        let Some(enemy) = self.get_mut(id) else {
            return false;
        };
        match enemy.apply_knockback(direction, force, now, tuning, elite) {
            Some(impulse) => {
                physics.apply_impulse(enemy.body(), impulse);
                true
            }
            None => false,
        }
    }

    /// Advance every enemy by one tick
    pub fn update(
        &mut self,
        clock: &Clock,
        player_pos: Option<Vec2>,
        physics: &mut impl PhysicsBackend,
    ) -> EnemyTickReport {
        let mut report = EnemyTickReport::default();
        let now = clock.scaled_time();
        let dt = clock.scaled_delta();

        for enemy in &mut self.enemies {
            if let Some(flash) = enemy.flash.as_mut() {
                if flash.advance(clock) {
                    enemy.flash = None;
                }
            }

            if let LifeState::Dying { removal } = &mut enemy.life {
                if removal.advance(clock) {
                    report.removed.push(enemy.id);
                }
                continue;
            }

            // Frozen gameplay: no AI at all
            if clock.is_paused() {
                continue;
            }

            if let MotionState::Suspended { until } = enemy.motion {
                if now < until {
                    continue;
                }
                enemy.motion = MotionState::Chasing;
                physics.set_velocity(enemy.body(), Vec2::ZERO);
                report.recovered.push(enemy.id);
            }

            let (Some(target), Some(pos)) = (player_pos, physics.position(enemy.body())) else {
                continue;
            };

            let to_player = target - pos;
            let step = enemy.move_speed * dt;
            let next = if to_player.length() <= step {
                target
            } else {
                pos + to_player.normalize_or_zero() * step
            };
            physics.move_position(enemy.body(), next);

            if to_player.length() <= enemy.attack_range && enemy.can_attack(now) {
                enemy.last_attack_time = Some(now);
                report.attacks.push((enemy.id, enemy.attack_damage));
            }
        }

        for &id in &report.removed {
            self.destroy(id);
        }
        self.flush_despawns(physics);
        report
    }

    /// Remove physics bodies of destroyed enemies
    pub fn flush_despawns(&mut self, physics: &mut impl PhysicsBackend) {
        for id in self.pending_despawn.drain(..) {
            physics.despawn_body(BodyId::Enemy(id));
        }
    }
}

impl EntityStore for EnemyStore {
    fn is_alive(&self, id: EnemyId) -> bool {
        self.get(id).is_some()
    }

    fn destroy(&mut self, id: EnemyId) {
        if let Ok(index) = self.enemies.binary_search_by_key(&id, |e| e.id) {
            self.enemies.remove(index);
            self.pending_despawn.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::KinematicWorld;

    fn tuning() -> EnemyTuning {
        EnemyTuning::default()
    }

    fn fresh() -> Enemy {
        Enemy::from_template(EnemyId(1), &EnemyTemplate::default())
    }

    fn world() -> KinematicWorld {
        KinematicWorld::new(Vec2::ZERO, Vec2::new(15.0, 9.0))
    }

    #[test]
    fn test_elite_transform_truncates_and_is_fixed_point() {
        let elite = EliteTuning {
            health_multiplier: 1.3,
            speed_multiplier: 2.3,
            scale_multiplier: 1.25,
            knockback_damping: 0.5,
        };
        let mut enemy = fresh();
        assert!(enemy.make_elite(&elite));
        assert!(enemy.is_elite());
        assert_eq!(enemy.max_health, 3); // 3.9 truncated
        assert_eq!(enemy.health, enemy.max_health);
        assert!((enemy.move_speed - 6.9).abs() < 1e-4);
        assert!((enemy.scale - 1.25).abs() < 1e-6);

        // Second call does not compound
        assert!(!enemy.make_elite(&elite));
        assert_eq!(enemy.max_health, 3);
        assert!((enemy.move_speed - 6.9).abs() < 1e-4);
    }

    #[test]
    fn test_elite_resets_health() {
        let template = EnemyTemplate {
            max_health: 10,
            ..Default::default()
        };
        let mut enemy = Enemy::from_template(EnemyId(3), &template);
        enemy.health = 4;
        enemy.make_elite(&EliteTuning::default());
        assert_eq!(enemy.max_health, 13);
        assert_eq!(enemy.health, 13);
    }

    #[test]
    fn test_damage_to_death_once() {
        let mut enemy = fresh();
        assert_eq!(enemy.take_damage(1, &tuning()), DamageOutcome::Hurt);
        assert_eq!(enemy.take_damage(1, &tuning()), DamageOutcome::Hurt);
        assert!(!enemy.is_dying());
        assert_eq!(enemy.take_damage(1, &tuning()), DamageOutcome::Killed);
        assert!(enemy.is_dying());
        assert!(!enemy.is_flashing());

        assert_eq!(enemy.take_damage(1, &tuning()), DamageOutcome::Ignored);
        assert!(!enemy.die(0.0));
        assert_eq!(enemy.health, 0);
    }

    #[test]
    fn test_knockback_rejected_while_dying() {
        let mut enemy = fresh();
        enemy.die(0.0);
        let out = enemy.apply_knockback(Vec2::X, 5.0, 0.0, &tuning(), &EliteTuning::default());
        assert_eq!(out, None);
        assert_eq!(enemy.motion(), MotionState::Chasing);
    }

    #[test]
    fn test_elite_knockback_is_damped() {
        let elite = EliteTuning::default();
        let mut normal = fresh();
        let mut tough = fresh();
        tough.make_elite(&elite);

        let a = normal.apply_knockback(Vec2::new(2.0, 0.0), 5.0, 1.0, &tuning(), &elite).unwrap();
        let b = tough.apply_knockback(Vec2::new(2.0, 0.0), 5.0, 1.0, &tuning(), &elite).unwrap();
        assert!((a.x - 5.0).abs() < 1e-6);
        assert!((b.x - 2.5).abs() < 1e-6);
        assert_eq!(normal.knockback_until(), Some(1.0 + tuning().knockback_duration));
    }

    #[test]
    fn test_store_kill_unregisters_immediately() {
        let mut physics = world();
        let mut store = EnemyStore::new();
        let mut registry = EntityRegistry::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::new(3.0, 0.0), &mut physics).unwrap();
        registry.register(id, &store);

        for _ in 0..2 {
            store.damage(id, 1, &mut registry, &tuning());
        }
        assert_eq!(registry.count(&store), 1);
        assert_eq!(store.damage(id, 1, &mut registry, &tuning()), DamageOutcome::Killed);
        assert_eq!(registry.count(&store), 0);
        assert_eq!(store.damage(id, 1, &mut registry, &tuning()), DamageOutcome::Ignored);

        // Zero death delay: gone after the next update, body included
        let mut clock = Clock::new();
        clock.advance(1.0 / 60.0);
        let report = store.update(&clock, None, &mut physics);
        assert_eq!(report.removed, vec![id]);
        assert!(store.get(id).is_none());
        assert!(!physics.contains(BodyId::Enemy(id)));
    }

    #[test]
    fn test_death_delay_keeps_body_until_wall_time_elapses() {
        let slow = EnemyTuning {
            death_delay: 0.5,
            ..tuning()
        };
        let mut physics = world();
        let mut store = EnemyStore::new();
        let mut registry = EntityRegistry::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::new(3.0, 0.0), &mut physics).unwrap();
        registry.register(id, &store);

        for _ in 0..3 {
            store.damage(id, 1, &mut registry, &slow);
        }
        assert!(store.get(id).unwrap().is_dying());
        assert!(!registry.contains(id));
        assert_eq!(registry.count(&store), 0);

        let mut clock = Clock::new();
        clock.advance(0.2);
        assert!(store.update(&clock, Some(Vec2::ZERO), &mut physics).removed.is_empty());
        assert!(store.get(id).is_some());
        assert!(physics.contains(BodyId::Enemy(id)));

        // Gameplay frozen: the removal countdown still runs on wall time
        clock.pause();
        clock.advance(0.2);
        assert!(store.update(&clock, Some(Vec2::ZERO), &mut physics).removed.is_empty());
        assert!(physics.contains(BodyId::Enemy(id)));

        clock.advance(0.2);
        let report = store.update(&clock, Some(Vec2::ZERO), &mut physics);
        assert_eq!(report.removed, vec![id]);
        assert!(store.get(id).is_none());
        assert!(!physics.contains(BodyId::Enemy(id)));
    }

    #[test]
    fn test_oversized_damage_does_not_overflow() {
        let mut enemy = fresh();
        assert_eq!(enemy.take_damage(i32::MAX, &tuning()), DamageOutcome::Killed);
        let mut other = fresh();
        assert_eq!(other.take_damage(i32::MIN, &tuning()), DamageOutcome::Hurt);
        assert_eq!(other.health, i32::MAX);
    }

    #[test]
    fn test_suspended_enemy_does_not_chase_then_resumes() {
        let mut physics = world();
        let mut store = EnemyStore::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::new(5.0, 0.0), &mut physics).unwrap();
        let mut clock = Clock::new();
        let player = Some(Vec2::ZERO);

        store.knockback(id, Vec2::X, 5.0, 0.0, &mut physics, &tuning(), &EliteTuning::default());
        physics.set_velocity(BodyId::Enemy(id), Vec2::ZERO);

        // 0.1 s in: still suspended, no steering toward the player
        for _ in 0..6 {
            clock.advance(1.0 / 60.0);
            store.update(&clock, player, &mut physics);
            physics.step(clock.scaled_delta());
        }
        assert!((physics.position(BodyId::Enemy(id)).unwrap().x - 5.0).abs() < 1e-5);

        // Past 0.2 s: chasing again
        let mut recovered = false;
        for _ in 0..12 {
            clock.advance(1.0 / 60.0);
            recovered |= store.update(&clock, player, &mut physics).recovered.contains(&id);
            physics.step(clock.scaled_delta());
        }
        assert!(recovered);
        assert_eq!(store.get(id).unwrap().motion(), MotionState::Chasing);
        assert!(physics.position(BodyId::Enemy(id)).unwrap().x < 5.0);
    }

    #[test]
    fn test_attack_respects_cooldown() {
        let mut physics = world();
        let mut store = EnemyStore::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::new(1.0, 0.0), &mut physics).unwrap();
        let mut clock = Clock::new();
        let player = Some(Vec2::ZERO);

        let mut attacks = 0;
        // 1.5 s of gameplay with a 1 s cooldown: two attacks
        for _ in 0..90 {
            clock.advance(1.0 / 60.0);
            attacks += store.update(&clock, player, &mut physics).attacks.len();
            physics.step(clock.scaled_delta());
        }
        assert_eq!(attacks, 2);
        assert!(store.get(id).unwrap().last_attack_time.is_some());
    }

    #[test]
    fn test_paused_clock_freezes_ai_but_not_flash() {
        let mut physics = world();
        let mut store = EnemyStore::new();
        let mut registry = EntityRegistry::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::new(1.0, 0.0), &mut physics).unwrap();
        store.damage(id, 1, &mut registry, &tuning());
        assert!(store.get(id).unwrap().is_flashing());

        let mut clock = Clock::new();
        clock.pause();
        clock.advance(0.2);
        let report = store.update(&clock, Some(Vec2::ZERO), &mut physics);
        assert!(report.attacks.is_empty());
        assert!(!store.get(id).unwrap().is_flashing());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut physics = world();
        let mut store = EnemyStore::new();
        let id = store.spawn(&EnemyTemplate::default(), Vec2::ZERO, &mut physics).unwrap();
        store.destroy(id);
        store.destroy(id);
        store.destroy(EnemyId(99));
        store.flush_despawns(&mut physics);
        assert!(store.is_empty());
        assert_eq!(physics.body_count(), 0);
    }
}

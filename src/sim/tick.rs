//! Per-frame simulation tick
//!
//! Order within one tick:
//! 1. advance clocks, apply a pending reward choice
//! 2. session countdown (may complete the phase)
//! 3. spawn scheduler
//! 4. player movement, ball carry/kick/catch
//! 5. physics step on scaled time, then contact resolution
//! 6. enemy AI and timers, attacks on the player
//! 7. registry prune

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::DamageOutcome;
use super::physics::{BodyId, Contact, ContactTarget, PhysicsBackend};
use super::projectile::{Ball, BallState};
use super::session::{Phase, RewardChoice};
use super::spawner::SpawnTargets;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement axis, length clamped to 1
    pub move_axis: Vec2,
    /// Kick the held ball along the look direction
    pub kick: bool,
    /// Reward picked on the reward screen
    pub reward: Option<RewardChoice>,
    /// Demo mode - the simulation plays itself
    pub autopilot: bool,
}

/// Advance the game by one frame of wall time
pub fn tick<P: PhysicsBackend>(state: &mut GameState, input: &TickInput, physics: &mut P, real_dt: f32) {
    state.clock.advance(real_dt);
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, physics, &mut input);
    }

    if let Some(choice) = input.reward {
        state.apply_reward(choice);
    }

    state.tick_session();

    let spawned = state.spawner.tick(
        state.session.phase(),
        &state.clock,
        state.session.survival_duration(),
        &state.tuning.spawn,
        &state.tuning.elite,
        SpawnTargets {
            enemies: &mut state.enemies,
            registry: &mut state.registry,
            physics: &mut *physics,
            rng: &mut state.rng,
        },
    );
    for s in spawned {
        state.events.push(GameEvent::EnemySpawned {
            id: s.id,
            position: s.position,
            elite: s.elite,
        });
    }

    let active = state.session.phase() == Phase::Playing && !state.clock.is_paused();
    if active {
        update_player(state, &input, physics);
    }

    let contacts = physics.step(state.clock.scaled_delta());
    for contact in &contacts {
        resolve_contact(state, contact, physics);
    }

    // Settling is also checked every tick, not only on wall hits
    if state.ball.state == BallState::InFlight {
        if let Some(vel) = physics.velocity(BodyId::Ball) {
            state.ball.vel = vel;
            state.ball.update_settling(vel.length(), &state.tuning.ball);
        }
    }

    let player_pos = physics.position(BodyId::Player);
    let report = state.enemies.update(&state.clock, player_pos, physics);
    for (attacker, damage) in report.attacks {
        if state.session.phase() != Phase::Playing {
            break;
        }
        let died = state.player.take_damage(damage);
        log::debug!("Enemy {} hit the player for {}", attacker, damage);
        state.events.push(GameEvent::PlayerDamaged {
            amount: damage,
            health: state.player.health,
        });
        if died {
            physics.set_velocity(BodyId::Player, Vec2::ZERO);
            state.game_over();
        }
    }

    state.registry.prune(&state.enemies);
}

/// Movement, ball carry, kick and catch
fn update_player<P: PhysicsBackend>(state: &mut GameState, input: &TickInput, physics: &mut P) {
    let now = state.clock.scaled_time();
    let player = &mut state.player;

    player.update_look(input.move_axis);
    physics.set_velocity(BodyId::Player, player.desired_velocity(input.move_axis));

    let Some(player_pos) = physics.position(BodyId::Player) else {
        return;
    };

    if state.ball.is_held() {
        let hold = Ball::hold_position(player_pos, player.look_dir, &state.tuning.ball);
        physics.set_position(BodyId::Ball, hold);
        physics.set_velocity(BodyId::Ball, Vec2::ZERO);

        if input.kick && player.can_kick(now) {
            let velocity = state.ball.kick(
                player.look_dir,
                player.kick_power,
                player.ball_damage_bonus,
                now,
                &state.tuning.ball,
            );
            physics.set_velocity(BodyId::Ball, velocity);
            player.record_kick(now);
            state.events.push(GameEvent::BallKicked { velocity });
            state.events.push(GameEvent::Shake {
                intensity: KICK_SHAKE.0,
                duration: KICK_SHAKE.1,
            });
        }
        return;
    }

    if state.ball.can_be_caught(now, &state.tuning.ball) {
        let in_reach = physics
            .position(BodyId::Ball)
            .is_some_and(|ball_pos| ball_pos.distance(player_pos) <= player.catch_range);
        if in_reach {
            state.ball.on_caught();
            physics.set_velocity(BodyId::Ball, Vec2::ZERO);
            state.events.push(GameEvent::BallCaught);
        }
    }
}

/// React to one contact reported by the physics step
fn resolve_contact<P: PhysicsBackend>(state: &mut GameState, contact: &Contact, physics: &mut P) {
    if contact.body != BodyId::Ball {
        return;
    }

    match contact.other {
        ContactTarget::Boundary => {
            let Some(vel) = physics.velocity(BodyId::Ball) else {
                return;
            };
            if state.ball.is_held() {
                return;
            }
            let bounced = state.ball.on_contact_boundary(vel, contact.normal, &state.tuning.ball);
            physics.set_velocity(BodyId::Ball, bounced);
        }
        // The carrier never collides with its own ball
        ContactTarget::Body(other) if other == state.ball.owner => {}
        ContactTarget::Body(BodyId::Enemy(id)) => {
            let (Some(ball_pos), Some(ball_vel), Some(enemy_pos)) = (
                physics.position(BodyId::Ball),
                physics.velocity(BodyId::Ball),
                physics.position(BodyId::Enemy(id)),
            ) else {
                return;
            };
            let Some(hit) = state.ball.on_contact_enemy(ball_pos, ball_vel, enemy_pos, &state.tuning.ball) else {
                return;
            };

            let outcome = state
                .enemies
                .damage(id, hit.damage, &mut state.registry, &state.tuning.enemy);
            if outcome == DamageOutcome::Ignored {
                return;
            }
            if outcome == DamageOutcome::Killed {
                state.kills += 1;
                state.events.push(GameEvent::EnemyDied { id });
            }
            // Rejected for a dying enemy
            state.enemies.knockback(
                id,
                hit.push,
                state.tuning.ball.knockback_force,
                state.clock.scaled_time(),
                physics,
                &state.tuning.enemy,
                &state.tuning.elite,
            );

            let kick_power = state.player.kick_power.max(f32::EPSILON);
            let scale = (hit.speed / kick_power).clamp(0.5, 1.5);
            state.events.push(GameEvent::Shake {
                intensity: IMPACT_SHAKE.0 * scale,
                duration: IMPACT_SHAKE.1,
            });
        }
        ContactTarget::Body(_) => {}
    }
}

/// Fill in input for demo mode: fetch the ball, aim at the nearest enemy,
/// pick a reward between phases
fn autopilot<P: PhysicsBackend>(state: &GameState, physics: &P, input: &mut TickInput) {
    match state.session.phase() {
        Phase::Reward => {
            let player = &state.player;
            input.reward = Some(if player.health < player.max_health {
                RewardChoice::Heal
            } else if state.session.phases_cleared() % 2 == 0 {
                RewardChoice::MoveSpeedUp
            } else {
                RewardChoice::BallDamageUp
            });
            return;
        }
        Phase::GameOver => return,
        Phase::Playing => {}
    }

    let Some(player_pos) = physics.position(BodyId::Player) else {
        return;
    };

    if !state.ball.is_held() {
        // Go get the ball back
        input.kick = false;
        if let Some(ball_pos) = physics.position(BodyId::Ball) {
            input.move_axis = (ball_pos - player_pos).normalize_or_zero();
        }
        return;
    }

    let nearest = state
        .enemies
        .iter()
        .filter(|e| !e.is_dying())
        .filter_map(|e| physics.position(e.body()))
        .min_by(|a, b| {
            a.distance_squared(player_pos)
                .partial_cmp(&b.distance_squared(player_pos))
                .unwrap_or(Ordering::Equal)
        });

    match nearest {
        Some(target) => {
            let to_target = target - player_pos;
            input.move_axis = to_target.normalize_or_zero();
            input.kick = to_target.length() < AUTOPILOT_KICK_RANGE;
        }
        None => {
            input.move_axis = Vec2::ZERO;
            input.kick = false;
        }
    }
}

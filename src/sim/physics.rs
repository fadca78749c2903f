//! Physics service boundary
//!
//! The simulation never integrates motion itself. It issues velocity, impulse
//! and kinematic-move commands to a [`PhysicsBackend`] and reacts to the
//! [`Contact`] events the backend reports from each step.
//!
//! [`KinematicWorld`] is a minimal backend for the headless runner and tests:
//! circle bodies, linear damping, a rectangular arena, enter-only contacts.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circle_arena_collision, circle_circle_collision};
use super::enemy::EnemyId;

/// Handle of a physics body owned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyId {
    Player,
    Ball,
    Enemy(EnemyId),
}

/// What a body touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactTarget {
    Body(BodyId),
    /// Static arena wall
    Boundary,
}

/// One collision-enter event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub body: BodyId,
    pub other: ContactTarget,
    /// Unit normal pointing from `other` toward `body`
    pub normal: Vec2,
    /// Closing speed along the normal
    pub relative_speed: f32,
}

/// Creation parameters for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub radius: f32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
}

impl BodyDesc {
    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            linear_damping: 0.0,
        }
    }

    pub fn with_damping(mut self, linear_damping: f32) -> Self {
        self.linear_damping = linear_damping.max(0.0);
        self
    }
}

/// Commands and queries the simulation needs from a rigid-body engine
pub trait PhysicsBackend {
    /// Create a body. Returns false if the backend refused it.
    fn spawn_body(&mut self, id: BodyId, desc: BodyDesc) -> bool;
    /// Remove a body. No-op for unknown ids.
    fn despawn_body(&mut self, id: BodyId);

    fn position(&self, id: BodyId) -> Option<Vec2>;
    fn velocity(&self, id: BodyId) -> Option<Vec2>;

    /// Teleport without generating contacts for the move itself
    fn set_position(&mut self, id: BodyId, position: Vec2);
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);
    /// Kinematic move to `target` during the next step
    fn move_position(&mut self, id: BodyId, target: Vec2);
    /// Instant change of momentum (unit mass)
    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2);

    /// Advance the world by `dt` seconds of gameplay time and report contacts
    fn step(&mut self, dt: f32) -> Vec<Contact>;
}

#[derive(Debug, Clone)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    damping: f32,
    pending_move: Option<Vec2>,
}

/// Small deterministic backend (bodies iterate in id order)
#[derive(Debug, Clone)]
pub struct KinematicWorld {
    center: Vec2,
    half_extents: Vec2,
    bodies: BTreeMap<BodyId, Body>,
    touching: BTreeSet<(BodyId, BodyId)>,
    on_wall: BTreeSet<BodyId>,
}

impl KinematicWorld {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
            bodies: BTreeMap::new(),
            touching: BTreeSet::new(),
            on_wall: BTreeSet::new(),
        }
    }

    /// World matching an arena rectangle from the tuning
    pub fn for_arena(arena: &crate::tuning::ArenaBounds) -> Self {
        Self::new(arena.center, arena.half_extents())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }
}

impl PhysicsBackend for KinematicWorld {
    fn spawn_body(&mut self, id: BodyId, desc: BodyDesc) -> bool {
        if !desc.position.is_finite() || !(desc.radius > 0.0) {
            return false;
        }
        self.bodies.insert(
            id,
            Body {
                pos: desc.position,
                vel: Vec2::ZERO,
                radius: desc.radius,
                damping: desc.linear_damping,
                pending_move: None,
            },
        );
        true
    }

    fn despawn_body(&mut self, id: BodyId) {
        if self.bodies.remove(&id).is_some() {
            self.touching.retain(|&(a, b)| a != id && b != id);
            self.on_wall.remove(&id);
        }
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.vel)
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = position;
            body.pending_move = None;
        }
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel = velocity;
        }
    }

    fn move_position(&mut self, id: BodyId, target: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pending_move = Some(target);
        }
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel += impulse;
        }
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();
        // A paused world does not move and reports nothing
        if !(dt > 0.0) {
            return contacts;
        }

        // Integrate
        for body in self.bodies.values_mut() {
            match body.pending_move.take() {
                Some(target) => body.pos = target,
                None => body.pos += body.vel * dt,
            }
            body.vel *= (1.0 - body.damping * dt).max(0.0);
        }

        // Arena walls: clamp inside and report entering contacts
        for (&id, body) in self.bodies.iter_mut() {
            let hit = circle_arena_collision(body.pos, body.radius, self.center, self.half_extents);
            if hit.hit {
                body.pos += hit.normal * hit.penetration;
                let closing = -body.vel.dot(hit.normal);
                // Only a body driven into the wall latches; resting overlap does not
                if closing > 0.0 && self.on_wall.insert(id) {
                    contacts.push(Contact {
                        body: id,
                        other: ContactTarget::Boundary,
                        normal: hit.normal,
                        relative_speed: closing,
                    });
                }
            } else {
                self.on_wall.remove(&id);
            }
        }

        // Body pairs: enter events only, reported once from each side
        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        let mut now_touching = BTreeSet::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (Some(body_a), Some(body_b)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
                    continue;
                };
                let hit = circle_circle_collision(body_a.pos, body_a.radius, body_b.pos, body_b.radius);
                if !hit.hit {
                    continue;
                }
                now_touching.insert((a, b));
                if self.touching.contains(&(a, b)) {
                    continue;
                }
                let relative_speed = (body_b.vel - body_a.vel).dot(hit.normal).abs();
                contacts.push(Contact {
                    body: a,
                    other: ContactTarget::Body(b),
                    normal: hit.normal,
                    relative_speed,
                });
                contacts.push(Contact {
                    body: b,
                    other: ContactTarget::Body(a),
                    normal: -hit.normal,
                    relative_speed,
                });
            }
        }
        self.touching = now_touching;

        contacts
    }
}

//! Collision detection helpers for circles in a rectangular arena
//!
//! Used by the in-crate physics backend to produce contact events, and by the
//! ball to reflect off static boundaries.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward the tested circle's center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between circle `a` and circle `b`
///
/// The normal points from `b` toward `a`. Coincident centers fall back to +Y.
pub fn circle_circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a_pos - b_pos;
    let dist = delta.length();
    let reach = a_radius + b_radius;
    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Check a circle against the inside of an axis-aligned arena
///
/// Reports the deepest wall only. The normal points back into the arena.
pub fn circle_arena_collision(pos: Vec2, radius: f32, center: Vec2, half_extents: Vec2) -> CollisionResult {
    let local = pos - center;
    let limit = (half_extents - Vec2::splat(radius)).max(Vec2::ZERO);

    let over_x = local.x.abs() - limit.x;
    let over_y = local.y.abs() - limit.y;
    if over_x <= 0.0 && over_y <= 0.0 {
        return CollisionResult::miss();
    }

    let (normal, penetration) = if over_x >= over_y {
        (Vec2::new(-local.x.signum(), 0.0), over_x)
    } else {
        (Vec2::new(0.0, -local.y.signum()), over_y)
    };

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflect, then scale by a restitution factor in [0, 1]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, bounce: f32) -> Vec2 {
    let normal = normal.normalize_or_zero();
    if normal == Vec2::ZERO {
        return velocity;
    }
    reflect_velocity(velocity, normal) * crate::clamp01(bounce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_hit_and_miss() {
        let result = circle_circle_collision(Vec2::new(0.8, 0.0), 0.5, Vec2::ZERO, 0.5);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 0.2).abs() < 1e-6);

        let result = circle_circle_collision(Vec2::new(2.0, 0.0), 0.5, Vec2::ZERO, 0.5);
        assert!(!result.hit);
    }

    #[test]
    fn test_coincident_circles_have_a_normal() {
        let result = circle_circle_collision(Vec2::ONE, 0.5, Vec2::ONE, 0.5);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
    }

    #[test]
    fn test_arena_walls() {
        let half = Vec2::new(15.0, 9.0);

        let result = circle_arena_collision(Vec2::new(3.0, 2.0), 0.5, Vec2::ZERO, half);
        assert!(!result.hit);

        // Right wall
        let result = circle_arena_collision(Vec2::new(14.8, 0.0), 0.5, Vec2::ZERO, half);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::new(-1.0, 0.0));
        assert!((result.penetration - 0.3).abs() < 1e-4);

        // Bottom wall of an off-center arena
        let result = circle_arena_collision(Vec2::new(10.0, -8.0), 0.5, Vec2::new(10.0, 0.0), Vec2::new(5.0, 8.0));
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving right, hits a wall whose normal points left
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_scales_and_tolerates_zero_normal() {
        let v = bounce_velocity(Vec2::new(0.0, -10.0), Vec2::Y, 0.5);
        assert!((v - Vec2::new(0.0, 5.0)).length() < 1e-5);
        assert_eq!(bounce_velocity(Vec2::X, Vec2::ZERO, 0.5), Vec2::X);
    }
}

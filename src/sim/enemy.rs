//! Enemy movement policy
//!
//! Enemies pick a random cardinal direction at spawn and walk in a straight
//! line. Hitting a wall bounces them away from the struck side; there is no
//! pathfinding and no player seeking.

use glam::Vec2;
use rand::Rng;

use super::geom::{Aabb, Direction};
use super::state::Enemy;

/// Uniformly random spawn direction
pub fn spawn_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.random_range(0..Direction::ALL.len())]
}

/// Move an enemy along its current direction
pub fn advance(enemy: &mut Enemy, elapsed_ms: f32) {
    enemy.pos += enemy.direction.unit() * enemy.speed * (elapsed_ms / 1000.0);
}

/// Redirect an enemy that overlaps a wall and push it back out.
///
/// The new direction points away from the side of the enemy that is pressed
/// into the wall. Returns `None` if the bounds do not actually overlap.
pub fn bounce(enemy: &mut Enemy, body_size: f32, wall: &Aabb) -> Option<Direction> {
    let bounds = enemy.bounds(body_size);
    let side = bounds.contact_side(wall)?;
    let depth = bounds.penetration(wall, side);

    enemy.pos -= side.unit() * depth;
    enemy.direction = side.opposite();
    Some(enemy.direction)
}

/// Keep an enemy inside the world rectangle, bouncing off its edges
pub fn bounce_world_bounds(enemy: &mut Enemy, body_size: f32, world: &Aabb) -> Option<Direction> {
    let half = body_size / 2.0;
    let min = world.min + Vec2::splat(half);
    let max = world.max - Vec2::splat(half);

    let side = if enemy.pos.x < min.x {
        Direction::Left
    } else if enemy.pos.x > max.x {
        Direction::Right
    } else if enemy.pos.y < min.y {
        Direction::Up
    } else if enemy.pos.y > max.y {
        Direction::Down
    } else {
        return None;
    };

    enemy.pos = enemy.pos.clamp(min, max);
    enemy.direction = side.opposite();
    Some(enemy.direction)
}

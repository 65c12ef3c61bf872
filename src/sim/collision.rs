//! Overlap detection and consequence resolution
//!
//! The physics layer (or [`detect_contacts`], the built-in narrow phase)
//! reports overlapping pairs as [`Contact`]s. [`resolve`] turns each into a
//! game consequence: player death, enemy redirection, enemy removal.
//! Player movement treats walls, blocks, bombs, and enemies as solid.

use glam::Vec2;

use super::enemy;
use super::geom::{Aabb, Direction};
use super::grid::Grid;
use super::state::{EntityId, Registry};
use crate::config::GameConfig;

/// An overlap between two tracked bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    PlayerEnemy { enemy: EntityId },
    PlayerExplosion { cell: EntityId },
    PlayerBomb { bomb: EntityId },
    /// Enemy touching a wall or intact block with the given bounds
    EnemyWall { enemy: EntityId, wall: Aabb },
    EnemyExplosion { enemy: EntityId, cell: EntityId },
}

/// What a resolved contact did to the game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Nothing,
    PlayerKilled,
    EnemyRedirected(Direction),
    EnemyKilled,
}

/// Apply the consequence of one contact
pub fn resolve(registry: &mut Registry, config: &GameConfig, contact: Contact) -> Outcome {
    match contact {
        Contact::PlayerExplosion { cell } => {
            if registry.explosion(cell).is_none() {
                return Outcome::Nothing;
            }
            kill_player(registry)
        }

        Contact::PlayerEnemy { enemy } => {
            if config.enemy_contact_kills && registry.enemies().iter().any(|e| e.id == enemy) {
                kill_player(registry)
            } else {
                Outcome::Nothing
            }
        }

        // Bombs are solid; obstruction is handled by player movement
        Contact::PlayerBomb { .. } => Outcome::Nothing,

        Contact::EnemyWall { enemy, wall } => {
            let size = config.scales.enemy;
            match registry.enemy_mut(enemy) {
                Some(e) => match enemy::bounce(e, size, &wall) {
                    Some(dir) => Outcome::EnemyRedirected(dir),
                    None => Outcome::Nothing,
                },
                None => Outcome::Nothing,
            }
        }

        Contact::EnemyExplosion { enemy, cell } => {
            if !config.explosions_kill_enemies || registry.explosion(cell).is_none() {
                return Outcome::Nothing;
            }
            match registry.remove_enemy(enemy) {
                Some(e) => {
                    log::debug!("Enemy {} destroyed at ({:.1}, {:.1})", e.id, e.pos.x, e.pos.y);
                    Outcome::EnemyKilled
                }
                None => Outcome::Nothing,
            }
        }
    }
}

fn kill_player(registry: &mut Registry) -> Outcome {
    if registry.mark_player_dead() {
        log::info!("Player died");
        Outcome::PlayerKilled
    } else {
        Outcome::Nothing
    }
}

/// A new bomb may be placed at `pos` only if no live bomb is closer than
/// `bomb_overlap_distance`
pub fn placement_allowed(registry: &Registry, config: &GameConfig, pos: Vec2) -> bool {
    registry.bomb_near(pos, config.bomb_overlap_distance).is_none()
}

/// Find every overlapping pair the rules care about
pub fn detect_contacts(grid: &Grid, registry: &Registry, config: &GameConfig) -> Vec<Contact> {
    let sizes = &config.scales;
    let mut contacts = Vec::new();

    if let Some(player) = registry.player().filter(|p| p.alive) {
        let bounds = player.bounds(sizes.player);
        for cell in registry.explosions() {
            if cell.bounds(sizes.explosion).intersects(&bounds) {
                contacts.push(Contact::PlayerExplosion { cell: cell.id });
            }
        }
        for e in registry.enemies() {
            if e.bounds(sizes.enemy).intersects(&bounds) {
                contacts.push(Contact::PlayerEnemy { enemy: e.id });
            }
        }
        for bomb in registry.bombs() {
            if bomb.bounds(sizes.bomb).intersects(&bounds) {
                contacts.push(Contact::PlayerBomb { bomb: bomb.id });
            }
        }
    }

    for e in registry.enemies() {
        let bounds = e.bounds(sizes.enemy);
        for wall in grid.blocking_bounds_near(&bounds, config.grid_size, config.tile_size) {
            contacts.push(Contact::EnemyWall { enemy: e.id, wall });
        }
        for cell in registry.explosions() {
            if cell.bounds(sizes.explosion).intersects(&bounds) {
                contacts.push(Contact::EnemyExplosion {
                    enemy: e.id,
                    cell: cell.id,
                });
            }
        }
    }

    contacts
}

/// World rectangle every moving body is confined to
pub fn world_bounds(config: &GameConfig) -> Aabb {
    Aabb::new(Vec2::ZERO, Vec2::new(config.world_width, config.world_height))
}

/// Move the player by `delta`, stopping at solid bodies.
///
/// Each axis is resolved separately so the player slides along walls. Solids
/// the player already overlaps (a bomb it just placed) do not obstruct it.
/// Long moves are swept in sub-steps no longer than half the smaller of
/// tile and body, so no solid can be skipped over. Returns the new position, or `None` if
/// there is no live player.
pub fn move_player(grid: &Grid, registry: &mut Registry, config: &GameConfig, delta: Vec2) -> Option<Vec2> {
    let player = registry.player().filter(|p| p.alive)?;
    let size = config.scales.player;
    let start = player.bounds(size);
    let mut pos = player.pos;

    // Nothing travels further than the world is wide
    let extent = Vec2::new(config.world_width, config.world_height);
    let delta = delta.clamp(-extent, extent);

    let reach = Aabb::new(start.min - delta.abs(), start.max + delta.abs());
    let solids: Vec<Aabb> = solid_bounds(grid, registry, config, &reach)
        .into_iter()
        .filter(|s| !s.intersects(&start))
        .collect();

    let steps = sweep_steps(delta.abs().max_element(), max_sweep_step(config.tile_size, size));
    let step = delta / steps as f32;
    for _ in 0..steps {
        pos.x += clip_axis(&Aabb::from_center(pos, size), &solids, Vec2::new(step.x, 0.0)).x;
        pos.y += clip_axis(&Aabb::from_center(pos, size), &solids, Vec2::new(0.0, step.y)).y;
    }

    let world = world_bounds(config);
    let half = Vec2::splat(size / 2.0);
    pos = pos.clamp(world.min + half, (world.max - half).max(world.min + half));

    if let Some(player) = registry.player_mut() {
        player.pos = pos;
    }
    Some(pos)
}

/// Advance every enemy by `elapsed_ms`, bouncing off walls, intact blocks,
/// and the world edge.
///
/// Travel is split into sub-steps like [`move_player`] so a long tick cannot
/// carry an enemy through a tile.
pub fn move_enemies(grid: &Grid, registry: &mut Registry, config: &GameConfig, elapsed_ms: f32) {
    let size = config.scales.enemy;
    let world = world_bounds(config);
    let max_step = max_sweep_step(config.tile_size, size);

    for e in registry.enemies_mut() {
        // Cap the travel at one world span, like the player
        let span = config.world_width.max(config.world_height);
        let elapsed = if e.speed > 0.0 {
            elapsed_ms.min(span / e.speed * 1000.0)
        } else {
            elapsed_ms
        };
        let steps = sweep_steps(e.speed * elapsed / 1000.0, max_step);
        let step_ms = elapsed / steps as f32;

        for _ in 0..steps {
            enemy::advance(e, step_ms);
            for wall in grid.blocking_bounds_near(&e.bounds(size), config.grid_size, config.tile_size) {
                enemy::bounce(e, size, &wall);
            }
            enemy::bounce_world_bounds(e, size, &world);
        }
    }
}

/// Longest distance a body may travel in one sweep step
fn max_sweep_step(tile_size: f32, body_size: f32) -> f32 {
    tile_size.min(body_size) / 2.0
}

/// Number of sub-steps needed to cover `distance` without exceeding `max_step`
fn sweep_steps(distance: f32, max_step: f32) -> u32 {
    if !(distance > max_step && max_step > 0.0) {
        return 1;
    }
    (distance / max_step).ceil() as u32
}

fn solid_bounds(grid: &Grid, registry: &Registry, config: &GameConfig, area: &Aabb) -> Vec<Aabb> {
    let mut solids = grid.blocking_bounds_near(area, config.grid_size, config.tile_size);
    solids.extend(
        registry
            .bombs()
            .iter()
            .map(|b| b.bounds(config.scales.bomb))
            .filter(|b| b.intersects(area)),
    );
    solids.extend(
        registry
            .enemies()
            .iter()
            .map(|e| e.bounds(config.scales.enemy))
            .filter(|b| b.intersects(area)),
    );
    solids
}

/// Shorten a single-axis move so `body` stops flush against the first solid
fn clip_axis(body: &Aabb, solids: &[Aabb], delta: Vec2) -> Vec2 {
    let moved = Aabb::new(body.min + delta, body.max + delta);
    let mut allowed = delta;

    for solid in solids.iter().filter(|s| s.intersects(&moved)) {
        if delta.x > 0.0 {
            allowed.x = allowed.x.min(solid.min.x - body.max.x).max(0.0);
        } else if delta.x < 0.0 {
            allowed.x = allowed.x.max(solid.max.x - body.min.x).min(0.0);
        }
        if delta.y > 0.0 {
            allowed.y = allowed.y.min(solid.min.y - body.max.y).max(0.0);
        } else if delta.y < 0.0 {
            allowed.y = allowed.y.max(solid.max.y - body.min.y).min(0.0);
        }
    }

    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameEvent;

    fn setup(rows: &[&str]) -> (Grid, Registry, GameConfig) {
        let grid = Grid::load(rows).unwrap();
        let config = GameConfig::default();
        let mut reg = Registry::new();
        reg.spawn_player(Grid::world_pos(grid.player_spawn(), config.grid_size));
        (grid, reg, config)
    }

    #[test]
    fn test_player_dies_once_from_overlapping_cells() {
        let (grid, mut reg, config) = setup(&["WWWWW", "W P W", "WWWWW"]);
        let pos = reg.player().unwrap().pos;
        reg.add_explosion_cell(pos, 1000.0);
        reg.add_explosion_cell(pos + Vec2::new(5.0, 0.0), 1000.0);
        reg.add_explosion_cell(pos - Vec2::new(5.0, 0.0), 1000.0);

        let contacts = detect_contacts(&grid, &reg, &config);
        let outcomes: Vec<_> = contacts
            .into_iter()
            .map(|c| resolve(&mut reg, &config, c))
            .collect();

        assert_eq!(outcomes.iter().filter(|o| **o == Outcome::PlayerKilled).count(), 1);
        assert!(!reg.player_alive());
        let died = reg
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::PlayerDied)
            .count();
        assert_eq!(died, 1);

        // Dead players produce no further contacts
        assert!(detect_contacts(&grid, &reg, &config).is_empty());
    }

    #[test]
    fn test_player_enemy_contact_is_harmless_by_default() {
        let (_grid, mut reg, config) = setup(&["P"]);
        let enemy = reg.spawn_enemy(Vec2::ZERO, Direction::Left, 100.0);
        assert_eq!(resolve(&mut reg, &config, Contact::PlayerEnemy { enemy }), Outcome::Nothing);
        assert!(reg.player_alive());

        let lethal = GameConfig {
            enemy_contact_kills: true,
            ..config
        };
        assert_eq!(resolve(&mut reg, &lethal, Contact::PlayerEnemy { enemy }), Outcome::PlayerKilled);
    }

    #[test]
    fn test_player_bomb_contact_has_no_consequence() {
        let (_grid, mut reg, config) = setup(&["P"]);
        let bomb = reg.place_bomb(Vec2::ZERO, 1, 100.0);
        assert_eq!(resolve(&mut reg, &config, Contact::PlayerBomb { bomb }), Outcome::Nothing);
        assert_eq!(reg.bombs().len(), 1);
    }

    #[test]
    fn test_stale_explosion_is_ignored() {
        let (_grid, mut reg, config) = setup(&["P"]);
        let cell = reg.add_explosion_cell(Vec2::ZERO, 10.0);
        reg.expire_explosion_cell(cell);
        assert_eq!(resolve(&mut reg, &config, Contact::PlayerExplosion { cell }), Outcome::Nothing);
        assert!(reg.player_alive());
    }

    #[test]
    fn test_enemy_wall_contact_redirects() {
        let (grid, mut reg, config) = setup(&["WWWWW", "WP EW", "WWWWW"]);
        // Enemy pressed into the east wall while moving right
        let enemy = reg.spawn_enemy(Vec2::new(165.0, 50.0), Direction::Right, 100.0);
        let contacts = detect_contacts(&grid, &reg, &config);
        let wall = contacts
            .iter()
            .find_map(|c| match c {
                Contact::EnemyWall { enemy: id, wall } if *id == enemy => Some(*wall),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            resolve(&mut reg, &config, Contact::EnemyWall { enemy, wall }),
            Outcome::EnemyRedirected(Direction::Left)
        );
        assert_eq!(reg.enemies()[0].direction, Direction::Left);
    }

    #[test]
    fn test_enemy_killed_by_explosion() {
        let (_grid, mut reg, config) = setup(&["P"]);
        let enemy = reg.spawn_enemy(Vec2::new(100.0, 0.0), Direction::Up, 100.0);
        let cell = reg.add_explosion_cell(Vec2::new(100.0, 0.0), 1000.0);

        let harmless = GameConfig {
            explosions_kill_enemies: false,
            ..config.clone()
        };
        assert_eq!(
            resolve(&mut reg, &harmless, Contact::EnemyExplosion { enemy, cell }),
            Outcome::Nothing
        );
        assert_eq!(
            resolve(&mut reg, &config, Contact::EnemyExplosion { enemy, cell }),
            Outcome::EnemyKilled
        );
        assert!(reg.enemies().is_empty());
        assert_eq!(
            resolve(&mut reg, &config, Contact::EnemyExplosion { enemy, cell }),
            Outcome::Nothing
        );
    }

    #[test]
    fn test_placement_overlap_radius() {
        let (_grid, mut reg, config) = setup(&["P"]);
        reg.place_bomb(Vec2::new(100.0, 100.0), 1, 2000.0);
        assert!(!placement_allowed(&reg, &config, Vec2::new(100.0, 100.0)));
        assert!(!placement_allowed(&reg, &config, Vec2::new(130.0, 100.0)));
        assert!(placement_allowed(&reg, &config, Vec2::new(140.0, 100.0)));
        assert!(placement_allowed(&reg, &config, Vec2::new(200.0, 100.0)));
    }

    #[test]
    fn test_move_player_stops_flush_at_wall() {
        let (grid, mut reg, config) = setup(&["WWWWW", "WP  W", "WWWWW"]);
        // Wall at (0, 1) spans x in [-24, 24]; player body is 30 wide
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(-20.0, 0.0)).unwrap();
        assert!((pos.x - 39.0).abs() < 1e-4);
        assert_eq!(pos.y, 50.0);
    }

    #[test]
    fn test_move_player_slides_along_wall() {
        let (grid, mut reg, config) = setup(&["WWWWW", "WP  W", "WWWWW"]);
        // Diagonal into the top wall: x moves, y is stopped
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(5.0, -20.0)).unwrap();
        assert!((pos.x - 55.0).abs() < 1e-4);
        assert!((pos.y - 39.0).abs() < 1e-4);
    }

    #[test]
    fn test_player_can_step_off_own_bomb_but_not_back() {
        let (grid, mut reg, config) = setup(&["WWWWWW", "WP   W", "WWWWWW"]);
        let start = reg.player().unwrap().pos;
        reg.place_bomb(start, 1, 2000.0);

        // Walk off the bomb
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(40.0, 0.0)).unwrap();
        assert!((pos.x - 90.0).abs() < 1e-4);

        // Walking back stops at the bomb's edge (bomb spans [35, 65])
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(-30.0, 0.0)).unwrap();
        assert!((pos.x - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_long_move_stops_at_block_and_wall() {
        // Block at (3, 1) spans x in [126, 174]
        let (grid, mut reg, config) = setup(&["WWWWWWW", "WP B  W", "WWWWWWW"]);
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(150.0, 0.0)).unwrap();
        assert!((pos.x - 111.0).abs() < 1e-3);
        assert!(grid.is_blocking(3, 1));

        // Wall at (3, 1) is the east edge of the arena
        let (grid, mut reg, config) = setup(&["WWWW", "WP W", "WWWW"]);
        let pos = move_player(&grid, &mut reg, &config, Vec2::new(500.0, 0.0)).unwrap();
        assert!((pos.x - 111.0).abs() < 1e-3);
        assert_eq!(pos.y, 50.0);
    }

    #[test]
    fn test_long_enemy_move_bounces_inside_corridor() {
        let (grid, mut reg, config) = setup(&["WWWWWWW", "WP    W", "WWWWWWW"]);
        reg.spawn_enemy(Vec2::new(150.0, 50.0), Direction::Up, 100.0);

        move_enemies(&grid, &mut reg, &config, 1500.0);
        let e = &reg.enemies()[0];
        // Walls above and below leave the enemy y in [39, 61]
        assert!(e.pos.y >= 39.0 - 1e-3 && e.pos.y <= 61.0 + 1e-3, "enemy escaped to {:?}", e.pos);
        assert_eq!(e.pos.x, 150.0);
    }

    #[test]
    fn test_sweep_steps() {
        assert_eq!(sweep_steps(0.0, 15.0), 1);
        assert_eq!(sweep_steps(15.0, 15.0), 1);
        assert_eq!(sweep_steps(31.0, 15.0), 3);
        assert_eq!(sweep_steps(f32::NAN, 15.0), 1);
    }

    #[test]
    fn test_dead_player_cannot_move() {
        let (grid, mut reg, config) = setup(&["WWWWW", "WP  W", "WWWWW"]);
        reg.mark_player_dead();
        assert!(move_player(&grid, &mut reg, &config, Vec2::new(10.0, 0.0)).is_none());
        assert_eq!(reg.player().unwrap().pos, Vec2::new(50.0, 50.0));
    }
}

//! Bomb fuses and blast propagation
//!
//! A bomb counts its fuse down every tick. When the fuse runs out the bomb
//! leaves the registry and is replaced by a plus-shaped set of explosion
//! cells: one at the centre, then up to `explosion_range` cells along each
//! cardinal arm. An arm stops silently at the first wall (or the grid edge)
//! and stops after the first block it destroys.

use glam::{IVec2, Vec2};

use super::geom::Direction;
use super::grid::Grid;
use super::state::{BombState, EntityId, Registry};
use crate::config::GameConfig;

/// Outcome of one bomb going off
#[derive(Debug, Clone, PartialEq)]
pub struct Detonation {
    pub bomb: EntityId,
    pub center: Vec2,
    /// Explosion cells created, centre first
    pub cells: Vec<EntityId>,
    /// Grid cells whose block this blast destroyed
    pub destroyed_blocks: Vec<IVec2>,
    /// Bombs ignited by this blast
    pub ignited: Vec<EntityId>,
}

/// Advance every armed fuse and detonate the bombs whose fuse ran out,
/// including any chain reactions they cause.
pub fn tick_fuses(
    grid: &mut Grid,
    registry: &mut Registry,
    config: &GameConfig,
    elapsed_ms: f32,
) -> Vec<Detonation> {
    for bomb in registry.bombs_mut() {
        bomb.tick_fuse(elapsed_ms);
    }
    detonate_expired(grid, registry, config)
}

/// Detonate every bomb with an expired fuse, in placement order.
///
/// Bombs ignited by a blast are picked up by the same loop, so a chain
/// resolves completely within one call.
pub fn detonate_expired(grid: &mut Grid, registry: &mut Registry, config: &GameConfig) -> Vec<Detonation> {
    let mut detonations = Vec::new();
    loop {
        let next = registry.bombs().iter().find(|b| b.fuse_expired()).map(|b| b.id);
        let Some(id) = next else {
            break;
        };
        if let Some(detonation) = detonate(grid, registry, config, id) {
            detonations.push(detonation);
        }
    }
    detonations
}

/// Detonate one bomb now, regardless of its fuse.
///
/// Returns `None` if the bomb is not in the registry.
pub fn detonate(
    grid: &mut Grid,
    registry: &mut Registry,
    config: &GameConfig,
    bomb_id: EntityId,
) -> Option<Detonation> {
    let mut bomb = registry.remove_bomb(bomb_id)?;
    bomb.state = BombState::Detonated;

    let center = bomb.pos;
    let lifetime = config.timings.explosion_lifetime_ms;

    // Centre cell is unconditional, even on a blocking tile
    let mut cells = vec![registry.add_explosion_cell(center, lifetime)];
    let mut destroyed_blocks = Vec::new();

    for dir in Direction::ALL {
        propagate_arm(
            grid,
            registry,
            config,
            center,
            dir,
            &mut cells,
            &mut destroyed_blocks,
        );
    }

    log::debug!(
        "Bomb {} detonated at ({:.1}, {:.1}): {} cells, {} blocks destroyed",
        bomb_id,
        center.x,
        center.y,
        cells.len(),
        destroyed_blocks.len()
    );

    let ignited = if config.chain_reactions {
        ignite_reached_bombs(registry, config, &cells)
    } else {
        Vec::new()
    };

    Some(Detonation {
        bomb: bomb_id,
        center,
        cells,
        destroyed_blocks,
        ignited,
    })
}

fn propagate_arm(
    grid: &mut Grid,
    registry: &mut Registry,
    config: &GameConfig,
    center: Vec2,
    dir: Direction,
    cells: &mut Vec<EntityId>,
    destroyed_blocks: &mut Vec<IVec2>,
) {
    let lifetime = config.timings.explosion_lifetime_ms;

    for step in 1..=config.explosion_range {
        let pos = center + dir.unit() * config.blast_step * step as f32;
        let cell = Grid::cell_of(pos, config.grid_size);

        if grid.is_wall(cell.x, cell.y) {
            break;
        }

        cells.push(registry.add_explosion_cell(pos, lifetime));

        if grid.destroy_block_at(cell.x, cell.y) {
            registry.record_block_destroyed(cell);
            destroyed_blocks.push(cell);
            break;
        }
    }
}

/// Force the fuse of every armed bomb touched by the given cells
fn ignite_reached_bombs(registry: &mut Registry, config: &GameConfig, cells: &[EntityId]) -> Vec<EntityId> {
    let blast: Vec<_> = cells
        .iter()
        .filter_map(|id| registry.explosion(*id))
        .map(|c| c.bounds(config.scales.explosion))
        .collect();

    let mut ignited = Vec::new();
    for bomb in registry.bombs_mut() {
        if !bomb.is_armed() || bomb.fuse_expired() {
            continue;
        }
        let bounds = bomb.bounds(config.scales.bomb);
        if blast.iter().any(|b| b.intersects(&bounds)) {
            bomb.ignite();
            ignited.push(bomb.id);
        }
    }

    if !ignited.is_empty() {
        log::debug!("Chain reaction ignited bombs {:?}", ignited);
    }
    ignited
}

/// Count down explosion lifetimes and expire the cells that ran out.
///
/// Cells listed in `fresh` were created during the current tick and are not
/// aged until the next one. Returns the ids of expired cells.
pub fn tick_explosions(registry: &mut Registry, elapsed_ms: f32, fresh: &[EntityId]) -> Vec<EntityId> {
    let mut expired = Vec::new();
    for cell in registry.explosions_mut() {
        if fresh.contains(&cell.id) {
            continue;
        }
        cell.lifetime_remaining_ms -= elapsed_ms;
        if cell.lifetime_remaining_ms <= 0.0 {
            expired.push(cell.id);
        }
    }

    for id in &expired {
        if let Some(cell) = registry.expire_explosion_cell(*id) {
            log::trace!("Explosion cell {} expired at ({:.1}, {:.1})", id, cell.pos.x, cell.pos.y);
        }
    }
    expired
}

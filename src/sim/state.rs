//! Entity registry and core simulation types
//!
//! The registry is the single source of truth for live entity state. All
//! mutation goes through its operations, which apply immediately and record
//! a [`GameEvent`] for the presentation layer.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geom::{Aabb, Direction};

/// Registry-local entity identifier. Never reused within a registry.
pub type EntityId = u32;

/// Change notifications consumed by rendering/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BombPlaced { id: EntityId, pos: Vec2, owner: EntityId },
    ExplosionCreated { id: EntityId, pos: Vec2 },
    ExplosionExpired { id: EntityId, pos: Vec2 },
    BlockDestroyed { x: i32, y: i32 },
    PlayerDied,
    EnemyKilled { id: EntityId, pos: Vec2 },
    /// Every enemy of the level has been destroyed
    RoundCleared,
    RoundRestarted,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub alive: bool,
}

impl Player {
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_center(self.pos, size)
    }
}

/// A wandering enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub direction: Direction,
    /// World units per second
    pub speed: f32,
}

impl Enemy {
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_center(self.pos, size)
    }
}

/// Fuse state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BombState {
    Armed { fuse_remaining_ms: f32 },
    /// Terminal; the bomb is replaced by explosion cells
    Detonated,
}

/// A placed bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: EntityId,
    pub pos: Vec2,
    /// Entity that placed the bomb (weak reference)
    pub owner: EntityId,
    pub state: BombState,
}

impl Bomb {
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_center(self.pos, size)
    }

    /// Advance the fuse. Returns true once the fuse has run out.
    pub fn tick_fuse(&mut self, elapsed_ms: f32) -> bool {
        match &mut self.state {
            BombState::Armed { fuse_remaining_ms } => {
                *fuse_remaining_ms -= elapsed_ms;
                *fuse_remaining_ms <= 0.0
            }
            BombState::Detonated => false,
        }
    }

    /// Force the fuse to zero (chain reaction)
    pub fn ignite(&mut self) {
        if let BombState::Armed { fuse_remaining_ms } = &mut self.state {
            *fuse_remaining_ms = 0.0;
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, BombState::Armed { .. })
    }

    pub fn fuse_expired(&self) -> bool {
        matches!(self.state, BombState::Armed { fuse_remaining_ms } if fuse_remaining_ms <= 0.0)
    }
}

/// One cell of a blast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionCell {
    pub id: EntityId,
    pub pos: Vec2,
    pub lifetime_remaining_ms: f32,
}

impl ExplosionCell {
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_center(self.pos, size)
    }
}

/// Live entity store for one round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    player: Option<Player>,
    /// Sorted by id (insertion order)
    enemies: Vec<Enemy>,
    /// Sorted by id (placement order)
    bombs: Vec<Bomb>,
    /// Sorted by id (creation order)
    explosions: Vec<ExplosionCell>,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn next_entity_id(&mut self) -> EntityId {
        // Default-constructed registries start at zero; keep ids non-zero
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Mutations ===

    /// Create the player, replacing any previous one
    pub fn spawn_player(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.player = Some(Player { id, pos, alive: true });
        id
    }

    pub fn spawn_enemy(&mut self, pos: Vec2, direction: Direction, speed: f32) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            pos,
            direction,
            speed,
        });
        id
    }

    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        let enemy = self.enemies.remove(idx);
        self.events.push(GameEvent::EnemyKilled {
            id,
            pos: enemy.pos,
        });
        Some(enemy)
    }

    /// Register an armed bomb. Placement policy is checked by the caller.
    pub fn place_bomb(&mut self, pos: Vec2, owner: EntityId, fuse_ms: f32) -> EntityId {
        let id = self.next_entity_id();
        self.bombs.push(Bomb {
            id,
            pos,
            owner,
            state: BombState::Armed {
                fuse_remaining_ms: fuse_ms,
            },
        });
        self.events.push(GameEvent::BombPlaced { id, pos, owner });
        id
    }

    pub fn remove_bomb(&mut self, id: EntityId) -> Option<Bomb> {
        let idx = self.bombs.iter().position(|b| b.id == id)?;
        Some(self.bombs.remove(idx))
    }

    pub fn add_explosion_cell(&mut self, pos: Vec2, lifetime_ms: f32) -> EntityId {
        let id = self.next_entity_id();
        self.explosions.push(ExplosionCell {
            id,
            pos,
            lifetime_remaining_ms: lifetime_ms,
        });
        self.events.push(GameEvent::ExplosionCreated { id, pos });
        id
    }

    pub fn expire_explosion_cell(&mut self, id: EntityId) -> Option<ExplosionCell> {
        let idx = self.explosions.iter().position(|c| c.id == id)?;
        let cell = self.explosions.remove(idx);
        self.events.push(GameEvent::ExplosionExpired { id, pos: cell.pos });
        Some(cell)
    }

    /// Clear the player's alive flag. Returns true only on the transition.
    pub fn mark_player_dead(&mut self) -> bool {
        match self.player.as_mut() {
            Some(player) if player.alive => {
                player.alive = false;
                self.events.push(GameEvent::PlayerDied);
                true
            }
            _ => false,
        }
    }

    /// Record a block destruction performed on the grid
    pub(crate) fn record_block_destroyed(&mut self, cell: IVec2) {
        self.events.push(GameEvent::BlockDestroyed {
            x: cell.x,
            y: cell.y,
        });
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drop every entity. Pending events are kept for the caller to drain.
    pub fn clear(&mut self) {
        self.player = None;
        self.enemies.clear();
        self.bombs.clear();
        self.explosions.clear();
    }

    // === Scoped mutable access for the simulation ===

    pub(crate) fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub(crate) fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub(crate) fn bombs_mut(&mut self) -> &mut [Bomb] {
        &mut self.bombs
    }

    pub(crate) fn explosions_mut(&mut self) -> &mut [ExplosionCell] {
        &mut self.explosions
    }

    // === Snapshots ===

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_alive(&self) -> bool {
        self.player.as_ref().is_some_and(|p| p.alive)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[ExplosionCell] {
        &self.explosions
    }

    pub fn bomb(&self, id: EntityId) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.id == id)
    }

    pub fn explosion(&self, id: EntityId) -> Option<&ExplosionCell> {
        self.explosions.iter().find(|c| c.id == id)
    }

    /// First live bomb strictly closer than `radius` to `pos`
    pub fn bomb_near(&self, pos: Vec2, radius: f32) -> Option<&Bomb> {
        self.bombs
            .iter()
            .find(|b| b.is_armed() && b.pos.distance(pos) < radius)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

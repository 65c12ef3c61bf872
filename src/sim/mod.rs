//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Time advances only through `Round::tick`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, input, or platform dependencies

pub mod blast;
pub mod collision;
pub mod enemy;
pub mod geom;
pub mod grid;
pub mod state;
pub mod tick;

pub use blast::{Detonation, detonate, tick_explosions, tick_fuses};
pub use collision::{Contact, Outcome, detect_contacts, placement_allowed, resolve};
pub use geom::{Aabb, Direction};
pub use grid::{DEFAULT_LEVEL, Grid, Tile, TileKind};
pub use state::{Bomb, BombState, Enemy, EntityId, ExplosionCell, GameEvent, Player, Registry};
pub use tick::{Round, RoundPhase, TickInput, TickReport};

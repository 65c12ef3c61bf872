//! Bomb Arena - rule engine for a grid-based bomb-placement arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, entities, blasts, collisions, rounds)
//! - `config`: Immutable game configuration (scales, timings, dimensions)
//! - `error`: Level and configuration errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::{BodySizes, GameConfig, Timings};
pub use error::{ConfigError, LevelError};

/// Game configuration defaults
pub mod consts {
    /// Fixed simulation timestep used by the driver (60 Hz, in milliseconds)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance between tile centres in world units
    pub const GRID_SIZE: f32 = 50.0;
    /// Rendered/collidable extent of a wall or block tile
    pub const TILE_SIZE: f32 = 48.0;
    /// Spacing between explosion cells (cells visually tile at this scale)
    pub const BLAST_STEP: f32 = GRID_SIZE / 1.5;

    /// World bounds
    pub const WORLD_WIDTH: f32 = 1600.0;
    pub const WORLD_HEIGHT: f32 = 1200.0;

    /// Player movement speed (world units per second)
    pub const PLAYER_SPEED: f32 = 150.0;
    /// Enemy movement speed (world units per second)
    pub const ENEMY_SPEED: f32 = 100.0;

    /// Minimum distance from a live bomb for a new placement
    pub const BOMB_OVERLAP_DISTANCE: f32 = 40.0;
    /// Blast arm length in steps
    pub const EXPLOSION_RANGE: u32 = 3;

    /// Fuse length before detonation
    pub const BOMB_FUSE_MS: f32 = 2000.0;
    /// Lifetime of a single explosion cell
    pub const EXPLOSION_LIFETIME_MS: f32 = 1000.0;

    /// Body extents (square, world units)
    pub const PLAYER_BODY: f32 = 30.0;
    pub const ENEMY_BODY: f32 = 30.0;
    pub const BOMB_BODY: f32 = 30.0;
    pub const EXPLOSION_BODY: f32 = 30.0;
}

//! Game configuration
//!
//! One immutable struct holding scales, timings, and world dimensions.
//! Every component receives it by reference at construction or per call.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Square body extents used for overlap tests (world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySizes {
    pub player: f32,
    pub enemy: f32,
    pub bomb: f32,
    pub explosion: f32,
}

impl Default for BodySizes {
    fn default() -> Self {
        Self {
            player: PLAYER_BODY,
            enemy: ENEMY_BODY,
            bomb: BOMB_BODY,
            explosion: EXPLOSION_BODY,
        }
    }
}

/// Countdown durations (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Fuse length of a freshly placed bomb
    pub bomb_fuse_ms: f32,
    /// How long each explosion cell stays live
    pub explosion_lifetime_ms: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            bomb_fuse_ms: BOMB_FUSE_MS,
            explosion_lifetime_ms: EXPLOSION_LIFETIME_MS,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scales: BodySizes,
    pub timings: Timings,

    // === Grid / world ===
    /// Distance between tile centres
    pub grid_size: f32,
    /// Collidable extent of wall and block tiles
    pub tile_size: f32,
    pub world_width: f32,
    pub world_height: f32,

    // === Movement ===
    pub player_speed: f32,
    pub enemy_speed: f32,

    // === Bombs ===
    /// A placement is rejected if a live bomb is closer than this
    pub bomb_overlap_distance: f32,
    /// Steps per blast arm
    pub explosion_range: u32,
    /// Distance between consecutive cells of a blast arm
    pub blast_step: f32,

    // === Rule switches ===
    /// Blasts detonate armed bombs they reach
    pub chain_reactions: bool,
    /// Explosion cells destroy enemies they overlap
    pub explosions_kill_enemies: bool,
    /// Touching an enemy kills the player
    pub enemy_contact_kills: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            scales: BodySizes::default(),
            timings: Timings::default(),

            grid_size: GRID_SIZE,
            tile_size: TILE_SIZE,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            player_speed: PLAYER_SPEED,
            enemy_speed: ENEMY_SPEED,

            bomb_overlap_distance: BOMB_OVERLAP_DISTANCE,
            explosion_range: EXPLOSION_RANGE,
            blast_step: BLAST_STEP,

            chain_reactions: true,
            explosions_kill_enemies: true,
            enemy_contact_kills: false,
        }
    }
}

impl GameConfig {
    /// Config for a grid of the given cell size, with tiles, bodies, and blast
    /// spacing scaled to match (one blast cell per tile)
    pub fn with_grid_size(grid_size: f32) -> Self {
        let ratio = grid_size / GRID_SIZE;
        Self {
            scales: BodySizes {
                player: PLAYER_BODY * ratio,
                enemy: ENEMY_BODY * ratio,
                bomb: BOMB_BODY * ratio,
                explosion: EXPLOSION_BODY * ratio,
            },
            grid_size,
            tile_size: TILE_SIZE * ratio,
            world_width: WORLD_WIDTH * ratio,
            world_height: WORLD_HEIGHT * ratio,
            player_speed: PLAYER_SPEED * ratio,
            enemy_speed: ENEMY_SPEED * ratio,
            bomb_overlap_distance: BOMB_OVERLAP_DISTANCE * ratio,
            blast_step: grid_size,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("tile_size", self.tile_size),
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("blast_step", self.blast_step),
            ("scales.player", self.scales.player),
            ("scales.enemy", self.scales.enemy),
            ("scales.bomb", self.scales.bomb),
            ("scales.explosion", self.scales.explosion),
            ("timings.bomb_fuse_ms", self.timings.bomb_fuse_ms),
            ("timings.explosion_lifetime_ms", self.timings.explosion_lifetime_ms),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    details: format!("must be a positive number, got {value}"),
                });
            }
        }

        let non_negative = [
            ("player_speed", self.player_speed),
            ("enemy_speed", self.enemy_speed),
            ("bomb_overlap_distance", self.bomb_overlap_distance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    details: format!("must be zero or positive, got {value}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.explosion_range, 3);
        assert!((config.blast_step - 50.0 / 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{ "explosion_range": 5, "timings": { "bomb_fuse_ms": 500 } }"#)
            .unwrap();
        assert_eq!(config.explosion_range, 5);
        assert_eq!(config.timings.bomb_fuse_ms, 500.0);
        assert_eq!(config.timings.explosion_lifetime_ms, EXPLOSION_LIFETIME_MS);
        assert_eq!(config.grid_size, GRID_SIZE);
    }

    #[test]
    fn test_rejects_non_positive_grid() {
        let err = GameConfig::from_json(r#"{ "grid_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grid_size", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unit_grid_scales_everything() {
        let config = GameConfig::with_grid_size(1.0);
        assert_eq!(config.blast_step, 1.0);
        assert!((config.tile_size - 0.96).abs() < 1e-4);
        assert!((config.bomb_overlap_distance - 0.8).abs() < 1e-4);
        assert!(config.validate().is_ok());
    }
}

//! Error types for level loading and configuration.

use thiserror::Error;

/// Errors raised by the level grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The character map is malformed.
    #[error("Invalid level: {reason}")]
    InvalidLevel { reason: String },

    /// A grid query fell outside the level.
    #[error("Tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

impl LevelError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidLevel {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading or validating a [`crate::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the engine cannot run with.
    #[error("Invalid config value for '{field}': {details}")]
    Invalid { field: &'static str, details: String },
}

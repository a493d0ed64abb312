//! Board configuration.

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};

/// Side length of a chunk in board units.
pub const DEFAULT_CHUNK_SIZE: f64 = 2000.0;

/// Number of items a quadtree node holds before it subdivides.
pub const DEFAULT_MAX_CAPACITY: usize = 10;

/// Depth past which quadtree nodes stop subdividing.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Minimum zoom scale.
pub const MIN_SCALE: f64 = 0.1;

/// Maximum zoom scale.
pub const MAX_SCALE: f64 = 4.0;

/// Maximum number of undoable actions.
pub const HISTORY_LIMIT: usize = 100;

/// Squared perpendicular distance above which stroke simplification keeps a point.
pub const SIMPLIFY_THRESHOLD: f64 = 0.5;

/// Tunables for a board and the index behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Chunk side length in board units.
    pub chunk_size: f64,
    /// Quadtree node capacity before subdividing.
    pub max_capacity: usize,
    /// Quadtree maximum depth.
    pub max_depth: u32,
    /// Lower zoom bound.
    pub min_scale: f64,
    /// Upper zoom bound.
    pub max_scale: f64,
    /// Undo stack capacity.
    pub history_limit: usize,
    /// Stroke simplification threshold (squared distance).
    pub simplify_threshold: f64,
    /// Pointer hit tolerance in viewport units.
    pub hit_tolerance: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_capacity: DEFAULT_MAX_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            history_limit: HISTORY_LIMIT,
            simplify_threshold: SIMPLIFY_THRESHOLD,
            hit_tolerance: 4.0,
        }
    }
}

impl BoardConfig {
    /// Check the configuration for values the index cannot work with.
    pub fn validate(&self) -> BoardResult<()> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(BoardError::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if self.max_capacity == 0 {
            return Err(BoardError::InvalidConfig("max_capacity must be at least 1".into()));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(BoardError::InvalidConfig(format!(
                "scale bounds [{}, {}] are invalid",
                self.min_scale, self.max_scale
            )));
        }
        if self.history_limit == 0 {
            return Err(BoardError::InvalidConfig("history_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

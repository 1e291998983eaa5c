//! Error types for terrain generation and erosion.

use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Numerically degenerate inputs (flat normalization, out-of-range sampling,
/// droplets leaving the interior) are recovered locally and never show up here.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("invalid dimension {size}: {reason}")]
    InvalidDimension { size: usize, reason: &'static str },

    #[error("erosion brush was built for radius {brush_radius}, parameters expect radius {expected_radius}")]
    StaleBrushRadius {
        brush_radius: usize,
        expected_radius: usize,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("config IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;

impl TerrainError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

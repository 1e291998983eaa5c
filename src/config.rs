//! Run configuration loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erosion::ErosionParameters;
use crate::error::{Result, TerrainError};
use crate::heightmap::NoiseSettings;

/// Everything needed to reproduce a generate-and-erode run.
///
/// Missing keys fall back to their defaults, so a file only needs the values
/// it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side length of the square field
    pub size: usize,
    /// Droplets to simulate
    pub iterations: usize,
    /// Use the batched rayon driver
    pub parallel: bool,
    pub noise: NoiseSettings,
    pub erosion: ErosionParameters,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 256,
            iterations: 100_000,
            parallel: false,
            noise: NoiseSettings::default(),
            erosion: ErosionParameters::default(),
        }
    }
}

impl TerrainConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size < 3 {
            return Err(TerrainError::InvalidDimension {
                size: self.size,
                reason: "generate-and-erode runs need at least a 3x3 field",
            });
        }
        self.noise.validate()?;
        self.erosion.validate()?;
        Ok(())
    }
}

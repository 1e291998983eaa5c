//! Seed management for terrain generation
//!
//! Terrain synthesis and erosion each get their own seed so either stage can be
//! varied while the other stays fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for the generation stages, derived from a master seed by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Noise octaves and their phase offsets
    pub heightmap: u64,
    /// Droplet spawn positions
    pub erosion: u64,
}

impl TerrainSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            heightmap: derive_seed(master, "heightmap"),
            erosion: derive_seed(master, "erosion"),
        }
    }

    /// Override the heightmap seed
    pub fn with_heightmap(mut self, seed: u64) -> Self {
        self.heightmap = seed;
        self
    }

    /// Override the erosion seed
    pub fn with_erosion(mut self, seed: u64) -> Self {
        self.erosion = seed;
        self
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for TerrainSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TerrainSeeds {{ master: {}, heightmap: {}, erosion: {} }}",
            self.master, self.heightmap, self.erosion
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let a = TerrainSeeds::from_master(12345);
        let b = TerrainSeeds::from_master(12345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stages_get_different_seeds() {
        let seeds = TerrainSeeds::from_master(12345);
        assert_ne!(seeds.heightmap, seeds.erosion);
    }

    #[test]
    fn test_override() {
        let seeds = TerrainSeeds::from_master(12345).with_erosion(99999);
        assert_eq!(seeds.erosion, 99999);
        assert_eq!(seeds.heightmap, TerrainSeeds::from_master(12345).heightmap);
    }
}

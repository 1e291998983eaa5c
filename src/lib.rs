//! Terrain synthesis and droplet erosion library
//!
//! Re-exports modules for use by binaries and tools.

pub mod config;
pub mod context;
pub mod erosion;
pub mod error;
pub mod heightfield;
pub mod heightmap;
pub mod noise_source;
pub mod seeds;

pub use config::TerrainConfig;
pub use context::SimulationContext;
pub use erosion::{
    build_erosion_brush, simulate_erosion, simulate_erosion_parallel, ErosionBrush,
    ErosionParameters, ErosionPreset, ErosionStats, MAX_BRUSH_RADIUS,
};
pub use error::{Result, TerrainError};
pub use heightfield::{HeightField, HeightSurface, OUT_OF_BOUNDS_HEIGHT};
pub use heightmap::{generate_height_field, NoiseSettings};
pub use noise_source::{NoiseSource, SeededNoise, SimplexNoise};
pub use seeds::TerrainSeeds;

//! Explicit simulation state: the live field, both parameter sets and the
//! brush cache, threaded through every operation by the caller.

use tracing::debug;

use crate::erosion::{self, BrushCache, ErosionBrush, ErosionParameters, ErosionStats};
use crate::error::Result;
use crate::heightfield::HeightField;
use crate::heightmap::{generate_into, NoiseSettings};
use crate::noise_source::SimplexNoise;
use crate::seeds::TerrainSeeds;

/// Owns a height field and everything needed to generate and erode it.
pub struct SimulationContext {
    field: HeightField,
    noise: NoiseSettings,
    erosion: ErosionParameters,
    brushes: BrushCache,
    noise_source: SimplexNoise,
    /// Erosion runs so far; keeps consecutive runs from replaying spawn points
    erosion_runs: u64,
}

impl SimulationContext {
    /// Context over a zeroed `size x size` field with default parameters.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_field(HeightField::new(size)?))
    }

    /// Context over an existing field, e.g. one loaded by an importer.
    pub fn with_field(field: HeightField) -> Self {
        Self {
            field,
            noise: NoiseSettings::default(),
            erosion: ErosionParameters::default(),
            brushes: BrushCache::new(),
            noise_source: SimplexNoise::simplex(0),
            erosion_runs: 0,
        }
    }

    /// Replace both parameter sets after validating them.
    ///
    /// The brush is rebuilt here, between runs, and only if the radius changed.
    pub fn set_parameters(&mut self, noise: NoiseSettings, erosion: ErosionParameters) -> Result<()> {
        noise.validate()?;
        erosion.validate()?;
        self.brushes.get_or_build(erosion.brush_radius);
        self.noise = noise;
        self.erosion = erosion;
        self.erosion_runs = 0;
        Ok(())
    }

    pub fn noise_settings(&self) -> &NoiseSettings {
        &self.noise
    }

    pub fn erosion_parameters(&self) -> &ErosionParameters {
        &self.erosion
    }

    /// Brush for the current radius, if one has been built.
    pub fn brush(&self) -> Option<&ErosionBrush> {
        self.brushes.current()
    }

    /// Overwrite the field with fresh noise from the current settings.
    pub fn generate_noise(&mut self) -> Result<()> {
        generate_into(&mut self.field, &self.noise, &mut self.noise_source)
    }

    /// Swap in a new field and hand back the previous one.
    pub fn override_heightmap(&mut self, field: HeightField) -> HeightField {
        debug!(size = field.size(), "height field replaced");
        std::mem::replace(&mut self.field, field)
    }

    fn next_erosion_seed(&mut self) -> u64 {
        let seed = TerrainSeeds::from_master(self.noise.seed)
            .erosion
            .wrapping_add(self.erosion_runs);
        self.erosion_runs += 1;
        seed
    }

    /// Run `iterations` droplets sequentially on the owned field.
    pub fn erode_iter(&mut self, iterations: usize) -> Result<ErosionStats> {
        let seed = self.next_erosion_seed();
        let brush = self.brushes.get_or_build(self.erosion.brush_radius);
        erosion::simulate_erosion(&mut self.field, brush, &self.erosion, iterations, seed)
    }

    /// Run `iterations` droplets in parallel batches on the owned field.
    pub fn erode_iter_parallel(&mut self, iterations: usize) -> Result<ErosionStats> {
        let seed = self.next_erosion_seed();
        let brush = self.brushes.get_or_build(self.erosion.brush_radius);
        erosion::simulate_erosion_parallel(&mut self.field, brush, &self.erosion, iterations, seed)
    }

    /// Height at integer coordinates, or the out-of-bounds sentinel.
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        self.field.sample(x, y)
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    /// Tear the context down, keeping only the field.
    pub fn into_field(self) -> HeightField {
        self.field
    }
}

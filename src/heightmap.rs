use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, TerrainError};
use crate::heightfield::HeightField;
use crate::noise_source::{NoiseSource, SimplexNoise};

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Parameters for fractal height field synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Seed for the noise permutation and the per-octave offsets
    pub seed: u64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Feature size of the first octave, in field widths (halved every octave)
    pub scale: f64,
    /// Height of the tallest cell after normalization (non-negative)
    pub target_height: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 12345,
            octaves: 6,
            persistence: 0.65,
            scale: 1.0,
            target_height: 1.0,
        }
    }
}

impl NoiseSettings {
    /// Check the settings once before a generation run.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TerrainError::invalid_parameter(
                "scale",
                format!("must be finite and positive, got {}", self.scale),
            ));
        }
        if !self.persistence.is_finite() || self.persistence < 0.0 {
            return Err(TerrainError::invalid_parameter(
                "persistence",
                format!("must be finite and non-negative, got {}", self.persistence),
            ));
        }
        if !self.target_height.is_finite() || self.target_height < 0.0 {
            return Err(TerrainError::invalid_parameter(
                "target_height",
                format!("must be finite and non-negative, got {}", self.target_height),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// HEIGHT FIELD GENERATION
// =============================================================================

/// Generate a fresh `size x size` height field from simplex fBm.
pub fn generate_height_field(settings: &NoiseSettings, size: usize) -> Result<HeightField> {
    let mut field = HeightField::new(size)?;
    let mut noise = SimplexNoise::simplex(0);
    generate_into(&mut field, settings, &mut noise)?;
    Ok(field)
}

/// Overwrite `field` with layered noise:
/// 1. Each octave samples the noise at `(x / size + offset) / scale`, where the
///    phase offset in [0, 1) is drawn from the seed
/// 2. Samples are remapped to [0, 1] and weighted by the octave amplitude
/// 3. Every octave halves the scale and multiplies the weight by `persistence`
/// 4. The sum is normalized to [0, 1] and scaled by `target_height`
pub fn generate_into<N: NoiseSource>(
    field: &mut HeightField,
    settings: &NoiseSettings,
    noise: &mut N,
) -> Result<()> {
    settings.validate()?;

    field.fill(0.0);

    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    noise.reseed(rng.gen());

    let size = field.size() as f64;
    let mut weight = 1.0f64;
    let mut scale = settings.scale;

    for octave in 0..settings.octaves {
        // Random phase so octaves don't line up on the same lattice
        let offset_x: f64 = rng.gen();
        let offset_y: f64 = rng.gen();

        for (x, y, h) in field.iter_mut() {
            let sample_x = (x as f64 / size + offset_x) / scale;
            let sample_y = (y as f64 / size + offset_y) / scale;
            let sample = (noise.sample(sample_x, sample_y) + 1.0) * 0.5;
            *h += (sample * weight) as f32;
        }

        trace!(octave, scale, weight, "octave accumulated");
        weight *= settings.persistence;
        scale /= 2.0;
    }

    normalize(field, settings.target_height);

    debug!(
        size = field.size(),
        octaves = settings.octaves,
        seed = settings.seed,
        "height field generated"
    );
    Ok(())
}

/// Rescale the field to [0, target_height] using its observed min/max.
///
/// A flat field has no range to stretch; it becomes a constant 0 field.
pub fn normalize(field: &mut HeightField, target_height: f32) {
    let (min_h, max_h) = field.min_max();
    let range = max_h - min_h;

    if !(range > 0.0 && range.is_finite()) {
        debug!(min_h, max_h, "degenerate normalization, flattening field");
        field.fill(0.0);
        return;
    }

    for (_, _, h) in field.iter_mut() {
        *h = (*h - min_h) / range * target_height;
    }
}

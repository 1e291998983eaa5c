//! Droplet-based hydraulic erosion
//!
//! - **brush**: cached disc kernel that spreads each erosion event
//! - **droplet**: the per-droplet state machine
//! - **hydraulic**: spawning and serial/parallel batch drivers

pub mod brush;
pub mod droplet;
pub mod hydraulic;
pub mod params;
pub mod utils;

pub use brush::{build_erosion_brush, BrushCache, BrushEntry, ErosionBrush};
pub use droplet::{simulate_droplet, Droplet, DropletOutcome, Termination};
pub use params::{ErosionParameters, ErosionPreset, MAX_BRUSH_RADIUS};
pub use utils::{interpolate, InterpolationSample};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::{Result, TerrainError};
use crate::heightfield::HeightField;

/// Statistics from an erosion batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErosionStats {
    /// Number of droplets simulated
    pub droplets: usize,
    /// Total droplet steps across the batch
    pub steps_taken: u64,
    /// Total material eroded (in height units)
    pub total_eroded: f64,
    /// Total material deposited
    pub total_deposited: f64,
    /// Droplets that ran their full lifetime
    pub lifetime_exhausted: usize,
    /// Droplets whose direction collapsed to zero
    pub stalled: usize,
    /// Droplets that flowed out of the interior
    pub left_interior: usize,
}

impl ErosionStats {
    pub fn record(&mut self, outcome: &DropletOutcome) {
        self.droplets += 1;
        self.steps_taken += outcome.steps as u64;
        self.total_eroded += outcome.eroded as f64;
        self.total_deposited += outcome.deposited as f64;
        match outcome.termination {
            Termination::LifetimeExhausted => self.lifetime_exhausted += 1,
            Termination::Stalled => self.stalled += 1,
            Termination::LeftInterior => self.left_interior += 1,
        }
    }

    /// Sediment still held by droplets when they stopped.
    pub fn sediment_in_transit(&self) -> f64 {
        self.total_eroded - self.total_deposited
    }
}

/// Checks shared by both drivers: valid parameters, a brush built for the
/// configured radius, and a field large enough to have an interior.
fn check_inputs(
    field: &HeightField,
    brush: &ErosionBrush,
    params: &ErosionParameters,
) -> Result<()> {
    params.validate()?;
    if brush.radius() != params.brush_radius {
        return Err(TerrainError::StaleBrushRadius {
            brush_radius: brush.radius(),
            expected_radius: params.brush_radius,
        });
    }
    if field.size() < 3 {
        return Err(TerrainError::InvalidDimension {
            size: field.size(),
            reason: "erosion needs at least a 3x3 field",
        });
    }
    Ok(())
}

/// Erode `field` in place with `iterations` droplets, one after another.
///
/// Spawn positions are drawn from `ChaCha8Rng` seeded with `seed`, so a run is
/// fully determined by its inputs. The field keeps its dimensions.
pub fn simulate_erosion(
    field: &mut HeightField,
    brush: &ErosionBrush,
    params: &ErosionParameters,
    iterations: usize,
    seed: u64,
) -> Result<ErosionStats> {
    check_inputs(field, brush, params)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stats = hydraulic::simulate(field, brush, params, iterations, &mut rng);

    info!(
        droplets = stats.droplets,
        steps = stats.steps_taken,
        eroded = stats.total_eroded,
        deposited = stats.total_deposited,
        "erosion finished"
    );
    Ok(stats)
}

/// Same contract as [`simulate_erosion`], with droplets run in rayon batches.
///
/// Droplets are grouped into spawn tiles that cannot touch the same cell and
/// tiles run concurrently, so results differ from the serial driver only in
/// droplet order and spawn sequence.
pub fn simulate_erosion_parallel(
    field: &mut HeightField,
    brush: &ErosionBrush,
    params: &ErosionParameters,
    iterations: usize,
    seed: u64,
) -> Result<ErosionStats> {
    check_inputs(field, brush, params)?;

    let stats = hydraulic::simulate_parallel(field, brush, params, iterations, seed);

    info!(
        droplets = stats.droplets,
        steps = stats.steps_taken,
        eroded = stats.total_eroded,
        deposited = stats.total_deposited,
        "parallel erosion finished"
    );
    Ok(stats)
}

//! Droplet spawning and batch orchestration.
//!
//! The serial driver runs droplets one after another on the live field. The
//! parallel driver buckets each batch into spawn tiles far enough apart that
//! droplets from different tiles of one parity class cannot touch the same
//! cell. Those tiles run concurrently, each on a delta overlay, and the deltas
//! are applied serially before the next class starts.

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::trace;

use crate::erosion::brush::ErosionBrush;
use crate::erosion::droplet::{simulate_droplet, Droplet};
use crate::erosion::params::ErosionParameters;
use crate::erosion::ErosionStats;
use crate::heightfield::{HeightField, HeightSurface};

/// Droplets per parallel batch.
pub const BATCH_SIZE: usize = 10_000;

/// Uniform random spawn point in `[1, size - 2]` on both axes.
///
/// Requires `size >= 3`.
pub fn spawn_point<R: Rng + ?Sized>(rng: &mut R, size: usize) -> (f32, f32) {
    let max_coord = (size - 2) as f32;
    (
        rng.gen_range(1.0..=max_coord),
        rng.gen_range(1.0..=max_coord),
    )
}

/// Run `iterations` droplets sequentially on `field`.
///
/// Algorithm:
/// 1. Spawn a resting droplet at a uniformly random interior position
/// 2. Simulate it until it stalls, leaves the interior or runs out of lifetime
/// 3. Fold its outcome into the batch statistics
pub fn simulate(
    field: &mut HeightField,
    brush: &ErosionBrush,
    params: &ErosionParameters,
    iterations: usize,
    rng: &mut ChaCha8Rng,
) -> ErosionStats {
    let size = field.size();
    let mut stats = ErosionStats::default();

    for _ in 0..iterations {
        let (x, y) = spawn_point(rng, size);
        let outcome = simulate_droplet(field, brush, params, Droplet::spawn(x, y));
        stats.record(&outcome);
    }

    stats
}

/// Chebyshev distance, in cells, beyond which a droplet spawned in one cell
/// can never read or write: it moves at most one cell per step, samples the
/// south-east neighbour of its cell and erodes through the brush.
fn droplet_reach(params: &ErosionParameters) -> usize {
    params
        .lifetime
        .saturating_add(params.brush_radius)
        .saturating_add(3)
}

/// Side length of a spawn tile. Two tiles of the same parity class are a full
/// tile apart, so droplets spawned in them touch disjoint cells.
fn tile_span(params: &ErosionParameters) -> usize {
    droplet_reach(params).saturating_mul(2).saturating_add(1)
}

/// Parallel erosion using rayon.
///
/// Droplet `i` draws its spawn point from `ChaCha8Rng::seed_from_u64(base_seed + i)`.
/// Each batch is bucketed into square spawn tiles and processed in four phases,
/// one per tile parity class. Within a phase every tile runs its droplets in
/// order against its own overlay of the current field; tiles of one class
/// cannot reach the same cell, so no droplet ever reads a stale height.
/// Results are deterministic for a seed regardless of thread count.
pub fn simulate_parallel(
    field: &mut HeightField,
    brush: &ErosionBrush,
    params: &ErosionParameters,
    iterations: usize,
    base_seed: u64,
) -> ErosionStats {
    let size = field.size();
    let span = tile_span(params);
    let tiles_per_side = size / span + usize::from(size % span != 0);
    let mut stats = ErosionStats::default();
    let num_batches = (iterations + BATCH_SIZE - 1) / BATCH_SIZE;

    for batch in 0..num_batches {
        let batch_start = batch * BATCH_SIZE;
        let batch_end = (batch_start + BATCH_SIZE).min(iterations);

        let spawns: Vec<(f32, f32)> = (batch_start..batch_end)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
                spawn_point(&mut rng, size)
            })
            .collect();

        let mut tiles: Vec<Vec<usize>> = vec![Vec::new(); tiles_per_side * tiles_per_side];
        for (k, &(x, y)) in spawns.iter().enumerate() {
            let tx = x as usize / span;
            let ty = y as usize / span;
            tiles[ty * tiles_per_side + tx].push(k);
        }

        let mut outcomes = vec![None; spawns.len()];

        for phase in 0..4 {
            let (parity_x, parity_y) = (phase % 2, phase / 2);
            let snapshot: &HeightField = field;
            let results: Vec<_> = tiles
                .par_iter()
                .enumerate()
                .filter(|(t, members)| {
                    !members.is_empty()
                        && (t % tiles_per_side) % 2 == parity_x
                        && (t / tiles_per_side) % 2 == parity_y
                })
                .map(|(_, members)| {
                    let mut overlay = DeltaOverlay::new(snapshot);
                    let tile_outcomes: Vec<_> = members
                        .iter()
                        .map(|&k| {
                            let (x, y) = spawns[k];
                            let droplet = Droplet::spawn(x, y);
                            (k, simulate_droplet(&mut overlay, brush, params, droplet))
                        })
                        .collect();
                    (tile_outcomes, overlay.into_changes())
                })
                .collect();

            // Single writer: tiles of one phase touch disjoint cells
            for (tile_outcomes, changes) in results {
                for (k, outcome) in tile_outcomes {
                    outcomes[k] = Some(outcome);
                }
                for (x, y, delta) in changes {
                    field.add(x, y, delta);
                }
            }
        }

        for outcome in outcomes.into_iter().flatten() {
            stats.record(&outcome);
        }

        trace!(
            batch,
            droplets = batch_end - batch_start,
            tiles = tiles_per_side * tiles_per_side,
            "erosion batch applied"
        );
    }

    stats
}

/// Copy-on-write view of a frozen field.
///
/// Reads see the snapshot plus this tile's own writes; writes are recorded
/// as per-cell deltas for the coordinator to apply.
struct DeltaOverlay<'a> {
    base: &'a HeightField,
    deltas: HashMap<(usize, usize), f32>,
}

impl<'a> DeltaOverlay<'a> {
    fn new(base: &'a HeightField) -> Self {
        Self {
            base,
            deltas: HashMap::new(),
        }
    }

    fn into_changes(self) -> Vec<(usize, usize, f32)> {
        let mut changes: Vec<_> = self
            .deltas
            .into_iter()
            .map(|((x, y), delta)| (x, y, delta))
            .collect();
        changes.sort_unstable_by_key(|&(x, y, _)| (y, x));
        changes
    }
}

impl HeightSurface for DeltaOverlay<'_> {
    fn size(&self) -> usize {
        self.base.size()
    }

    fn height(&self, x: usize, y: usize) -> f32 {
        self.base.get(x, y) + self.deltas.get(&(x, y)).copied().unwrap_or(0.0)
    }

    fn add_height(&mut self, x: usize, y: usize, delta: f32) {
        let size = self.base.size();
        assert!(
            x < size && y < size,
            "overlay write ({}, {}) outside {}x{} grid",
            x,
            y,
            size,
            size
        );
        *self.deltas.entry((x, y)).or_insert(0.0) += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erosion::brush::build_erosion_brush;

    fn sloped(size: usize) -> HeightField {
        let mut field = HeightField::new(size).unwrap();
        for y in 0..size {
            for x in 0..size {
                let h = (size - x) as f32 + (size - y) as f32;
                field.set(x, y, h / (2 * size) as f32);
            }
        }
        field
    }

    #[test]
    fn test_spawn_point_stays_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for size in [3usize, 4, 17] {
            for _ in 0..500 {
                let (x, y) = spawn_point(&mut rng, size);
                assert!(x >= 1.0 && x <= (size - 2) as f32);
                assert!(y >= 1.0 && y <= (size - 2) as f32);
            }
        }
    }

    #[test]
    fn test_droplets_erode_slope() {
        let mut field = sloped(32);
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let stats = simulate(
            &mut field,
            &build_erosion_brush(3),
            &ErosionParameters::default(),
            1000,
            &mut rng,
        );
        assert_eq!(stats.droplets, 1000);
        assert!(stats.total_eroded > 0.0);
        assert!(stats.total_deposited > 0.0);
        assert!(field.is_finite());
    }

    #[test]
    fn test_parallel_is_deterministic() {
        let brush = build_erosion_brush(2);
        let params = ErosionParameters {
            lifetime: 8,
            brush_radius: 2,
            ..Default::default()
        };
        let mut a = sloped(96);
        let mut b = sloped(96);
        let stats_a = simulate_parallel(&mut a, &brush, &params, BATCH_SIZE + 2_500, 99);
        let stats_b = simulate_parallel(&mut b, &brush, &params, BATCH_SIZE + 2_500, 99);
        assert_eq!(a, b);
        assert_eq!(stats_a, stats_b);
        assert_eq!(stats_a.droplets, BATCH_SIZE + 2_500);
        assert!(a.is_finite());
    }

    #[test]
    fn test_parallel_mass_balance() {
        let brush = build_erosion_brush(2);
        let params = ErosionParameters {
            lifetime: 8,
            brush_radius: 2,
            ..Default::default()
        };
        let mut field = sloped(64);
        let before = field.total();
        let stats = simulate_parallel(&mut field, &brush, &params, 3_000, 3);
        let lost = before - field.total();
        assert!((lost - (stats.total_eroded - stats.total_deposited)).abs() < 1e-2);
    }

    #[test]
    fn test_parallel_keeps_small_field_in_range() {
        use crate::heightmap::{generate_height_field, NoiseSettings};

        let settings = NoiseSettings {
            seed: 42,
            octaves: 4,
            ..Default::default()
        };
        let params = ErosionParameters::default();
        let brush = build_erosion_brush(params.brush_radius);
        let mut field = generate_height_field(&settings, 32).unwrap();

        simulate_parallel(&mut field, &brush, &params, BATCH_SIZE + 2_000, 42);

        let (lo, hi) = field.min_max();
        assert!(lo >= -1e-4, "parallel erosion dug below zero: {}", lo);
        assert!(hi <= settings.target_height + 0.05, "deposits piled up to {}", hi);
        assert!(field.is_finite());
    }

    #[test]
    fn test_parallel_keeps_tiled_field_in_range() {
        use crate::heightmap::{generate_height_field, NoiseSettings};

        let settings = NoiseSettings {
            seed: 7,
            octaves: 4,
            ..Default::default()
        };
        let params = ErosionParameters {
            lifetime: 12,
            brush_radius: 2,
            ..Default::default()
        };
        let brush = build_erosion_brush(2);
        let mut field = generate_height_field(&settings, 128).unwrap();
        // Several tiles per axis, so every parity phase runs
        assert!(128 / tile_span(&params) >= 3);

        simulate_parallel(&mut field, &brush, &params, BATCH_SIZE + 5_000, 11);

        let (lo, hi) = field.min_max();
        assert!(lo >= -1e-4, "parallel erosion dug below zero: {}", lo);
        assert!(hi <= settings.target_height + 0.05, "deposits piled up to {}", hi);
    }

    #[test]
    fn test_tiles_of_one_class_cannot_meet() {
        let params = ErosionParameters::default();
        let span = tile_span(&params);
        // Nearest spawn cells of two same-class tiles are span + 1 apart
        assert!(span + 1 > 2 * droplet_reach(&params));

        let huge = ErosionParameters {
            lifetime: usize::MAX,
            ..Default::default()
        };
        assert_eq!(tile_span(&huge), usize::MAX);
    }

    #[test]
    #[should_panic(expected = "overlay write (4, 0) outside 4x4 grid")]
    fn test_overlay_rejects_out_of_grid_write() {
        let base = HeightField::new(4).unwrap();
        let mut overlay = DeltaOverlay::new(&base);
        overlay.add_height(4, 0, 0.1);
    }

    #[test]
    fn test_overlay_reads_own_writes() {
        let base = HeightField::new_with(4, 1.0).unwrap();
        let mut overlay = DeltaOverlay::new(&base);
        overlay.add_height(2, 1, -0.25);
        overlay.add_height(2, 1, -0.25);
        assert_eq!(overlay.height(2, 1), 0.5);
        assert_eq!(overlay.height(1, 2), 1.0);
        assert_eq!(overlay.into_changes(), vec![(2, 1, -0.5)]);
        assert_eq!(base.get(2, 1), 1.0);
    }
}

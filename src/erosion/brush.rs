//! Precomputed disc-shaped weight kernel for spreading erosion.
//!
//! Building a brush is O(r²); the droplet inner loop only walks the cached
//! entry list, so a brush is built once per radius and reused by every droplet.

use tracing::debug;

/// One cell of the brush: offset from the droplet's cell and its share of the
/// eroded amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushEntry {
    pub dx: i32,
    pub dy: i32,
    pub weight: f32,
}

/// Normalized erosion kernel for a fixed radius.
#[derive(Clone, Debug, PartialEq)]
pub struct ErosionBrush {
    radius: usize,
    entries: Vec<BrushEntry>,
}

impl ErosionBrush {
    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn entries(&self) -> &[BrushEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the brush for `radius`.
///
/// Every offset with `dx² + dy² < radius²` gets weight `1 - dist / radius`,
/// then weights are divided by their sum. Radius 0 degenerates to the single
/// origin cell with weight 1.
pub fn build_erosion_brush(radius: usize) -> ErosionBrush {
    if radius == 0 {
        return ErosionBrush {
            radius,
            entries: vec![BrushEntry {
                dx: 0,
                dy: 0,
                weight: 1.0,
            }],
        };
    }

    let r = radius as i64;
    let r_sq = r * r;
    let radius_f = radius as f64;
    let mut entries = Vec::new();
    let mut total_weight = 0.0f64;

    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq < r_sq {
                let weight = (1.0 - (dist_sq as f64).sqrt() / radius_f) as f32;
                total_weight += weight as f64;
                entries.push(BrushEntry {
                    dx: dx as i32,
                    dy: dy as i32,
                    weight,
                });
            }
        }
    }

    for entry in entries.iter_mut() {
        entry.weight = (entry.weight as f64 / total_weight) as f32;
    }

    ErosionBrush { radius, entries }
}

/// Holds the brush for the most recently requested radius.
#[derive(Clone, Debug, Default)]
pub struct BrushCache {
    brush: Option<ErosionBrush>,
}

impl BrushCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached brush, rebuilding it only when the radius changed.
    pub fn get_or_build(&mut self, radius: usize) -> &ErosionBrush {
        let stale = self.brush.as_ref().map_or(true, |b| b.radius != radius);
        if stale {
            debug!(radius, "building erosion brush");
            self.brush = Some(build_erosion_brush(radius));
        }
        self.brush.get_or_insert_with(|| build_erosion_brush(radius))
    }

    /// Currently cached brush, if any.
    pub fn current(&self) -> Option<&ErosionBrush> {
        self.brush.as_ref()
    }

    /// Drop the cached brush.
    pub fn clear(&mut self) {
        self.brush = None;
    }
}

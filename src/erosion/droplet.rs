//! Single-droplet hydraulic erosion.
//!
//! A droplet rolls downhill over the bilinearly interpolated surface. On every
//! step it compares how much sediment it carries with how much it could carry
//! (faster, wetter, steeper = more) and either erodes the terrain under it
//! through the brush or drops sediment onto the four nodes of its cell.
//!
//! Based on Hans Theobald Beyer's "Implementation of a method for hydraulic
//! erosion" (2015).

use crate::erosion::brush::ErosionBrush;
use crate::erosion::params::ErosionParameters;
use crate::erosion::utils::{interpolate, CellOffset};
use crate::heightfield::HeightSurface;

/// A water droplet for hydraulic erosion simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Droplet {
    /// Position (floating point for interpolation)
    pub x: f32,
    pub y: f32,
    /// Movement direction (unit length, or zero when stalled)
    pub dir_x: f32,
    pub dir_y: f32,
    pub speed: f32,
    pub water: f32,
    /// Carried sediment
    pub sediment: f32,
}

impl Droplet {
    /// A resting droplet with one unit of water and no sediment.
    pub fn spawn(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            dir_x: 0.0,
            dir_y: 0.0,
            speed: 1.0,
            water: 1.0,
            sediment: 0.0,
        }
    }
}

/// Why a droplet stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Ran for `lifetime` steps.
    LifetimeExhausted,
    /// Direction collapsed to exactly zero (flat ground or a perfect pit).
    Stalled,
    /// Moved outside `[1, size - 2]` on either axis.
    LeftInterior,
}

/// Result of simulating one droplet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropletOutcome {
    /// Steps started, including the terminating one
    pub steps: usize,
    pub termination: Termination,
    /// Height actually removed from the surface
    pub eroded: f32,
    /// Height added back to the surface
    pub deposited: f32,
    /// Sediment still carried when the droplet stopped
    pub sediment: f32,
}

#[inline]
fn in_interior(x: f32, y: f32, max_coord: f32) -> bool {
    (1.0..=max_coord).contains(&x) && (1.0..=max_coord).contains(&y)
}

/// Run one droplet until it terminates, mutating `surface` in place.
///
/// The surface must be at least 3x3. A droplet spawned outside the interior
/// terminates immediately without touching the surface.
pub fn simulate_droplet<S: HeightSurface + ?Sized>(
    surface: &mut S,
    brush: &ErosionBrush,
    params: &ErosionParameters,
    mut droplet: Droplet,
) -> DropletOutcome {
    let max_coord = surface.size() as f32 - 2.0;
    let mut outcome = DropletOutcome {
        steps: 0,
        termination: Termination::LifetimeExhausted,
        eroded: 0.0,
        deposited: 0.0,
        sediment: droplet.sediment,
    };

    if !in_interior(droplet.x, droplet.y, max_coord) {
        outcome.termination = Termination::LeftInterior;
        return outcome;
    }

    for _ in 0..params.lifetime {
        outcome.steps += 1;

        let cell = CellOffset::of(droplet.x, droplet.y);
        let current = interpolate(surface, droplet.x, droplet.y);

        // Blend the previous direction with the downhill direction
        droplet.dir_x =
            droplet.dir_x * params.inertia - current.gradient_x * (1.0 - params.inertia);
        droplet.dir_y =
            droplet.dir_y * params.inertia - current.gradient_y * (1.0 - params.inertia);

        let len = (droplet.dir_x * droplet.dir_x + droplet.dir_y * droplet.dir_y).sqrt();
        if len != 0.0 {
            droplet.dir_x /= len;
            droplet.dir_y /= len;
        }

        droplet.x += droplet.dir_x;
        droplet.y += droplet.dir_y;

        if droplet.dir_x == 0.0 && droplet.dir_y == 0.0 {
            outcome.termination = Termination::Stalled;
            break;
        }
        if !in_interior(droplet.x, droplet.y, max_coord) {
            outcome.termination = Termination::LeftInterior;
            break;
        }

        let new_height = interpolate(surface, droplet.x, droplet.y).height;
        let delta_height = new_height - current.height;

        let capacity = (-delta_height
            * droplet.speed
            * droplet.water
            * params.sediment_capacity_factor)
            .max(params.min_sediment_capacity);

        if droplet.sediment > capacity || delta_height > 0.0 {
            // Uphill: try to fill the pit behind us. Otherwise drop part of the excess.
            let amount = if delta_height > 0.0 {
                delta_height.min(droplet.sediment)
            } else {
                (droplet.sediment - capacity) * params.deposit_speed
            };
            droplet.sediment -= amount;
            deposit(surface, &cell, amount);
            outcome.deposited += amount;
        } else {
            // Never take more than the drop we just made, or we dig a hole behind us
            let amount = ((capacity - droplet.sediment) * params.erode_speed).min(-delta_height);
            let removed = erode(surface, brush, &cell, amount);
            droplet.sediment += removed;
            outcome.eroded += removed;
        }

        let speed_sq = droplet.speed * droplet.speed + delta_height * params.gravity;
        droplet.speed = speed_sq.max(0.0).sqrt();
        droplet.water *= 1.0 - params.evaporate_speed;
    }

    outcome.sediment = droplet.sediment;
    outcome
}

/// Spread `amount` over the four nodes of `cell` by bilinear weight.
fn deposit<S: HeightSurface + ?Sized>(surface: &mut S, cell: &CellOffset, amount: f32) {
    if amount == 0.0 {
        return;
    }
    for (x, y, weight) in cell.corners() {
        surface.add_height(x, y, amount * weight);
    }
}

/// Remove up to `amount` through the brush centred on `cell`.
///
/// Cells outside the surface are skipped and no cell goes below zero.
/// Returns what was actually removed.
fn erode<S: HeightSurface + ?Sized>(
    surface: &mut S,
    brush: &ErosionBrush,
    cell: &CellOffset,
    amount: f32,
) -> f32 {
    if !(amount > 0.0) {
        return 0.0;
    }

    let size = surface.size() as i64;
    let mut removed = 0.0f32;

    for entry in brush.entries() {
        let nx = cell.x as i64 + entry.dx as i64;
        let ny = cell.y as i64 + entry.dy as i64;
        if nx < 0 || ny < 0 || nx >= size || ny >= size {
            continue;
        }
        let (nx, ny) = (nx as usize, ny as usize);

        let current = surface.height(nx, ny);
        let take = (amount * entry.weight).min(current.max(0.0));
        if take > 0.0 {
            surface.add_height(nx, ny, -take);
            removed += take;
        }
    }

    removed
}

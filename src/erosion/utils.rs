//! Bilinear sampling of height and gradient at continuous positions.

use crate::heightfield::HeightSurface;

/// Height and slope of the surface at a continuous position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolationSample {
    pub height: f32,
    pub gradient_x: f32,
    pub gradient_y: f32,
}

/// Integer cell containing a position plus the offset inside it,
/// (0, 0) at the north-west node and (1, 1) at the south-east node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellOffset {
    pub x: usize,
    pub y: usize,
    pub fx: f32,
    pub fy: f32,
}

impl CellOffset {
    /// Positions must be non-negative.
    #[inline]
    pub fn of(x: f32, y: f32) -> Self {
        let cx = x.floor();
        let cy = y.floor();
        Self {
            x: cx as usize,
            y: cy as usize,
            fx: x - cx,
            fy: y - cy,
        }
    }

    /// The four corner nodes with their bilinear weights, which sum to 1.
    #[inline]
    pub fn corners(&self) -> [(usize, usize, f32); 4] {
        let (x, y, fx, fy) = (self.x, self.y, self.fx, self.fy);
        [
            (x, y, (1.0 - fx) * (1.0 - fy)),
            (x + 1, y, fx * (1.0 - fy)),
            (x, y + 1, (1.0 - fx) * fy),
            (x + 1, y + 1, fx * fy),
        ]
    }
}

/// Sample height and gradient at (x, y) from the four surrounding nodes.
///
/// The cell's south-east neighbour must exist, i.e. `x < size - 1` and
/// `y < size - 1`.
#[inline]
pub fn interpolate<S: HeightSurface + ?Sized>(surface: &S, x: f32, y: f32) -> InterpolationSample {
    let cell = CellOffset::of(x, y);
    let (fx, fy) = (cell.fx, cell.fy);

    let h_nw = surface.height(cell.x, cell.y);
    let h_ne = surface.height(cell.x + 1, cell.y);
    let h_sw = surface.height(cell.x, cell.y + 1);
    let h_se = surface.height(cell.x + 1, cell.y + 1);

    let gradient_x = (h_ne - h_nw) * (1.0 - fy) + (h_se - h_sw) * fy;
    let gradient_y = (h_sw - h_nw) * (1.0 - fx) + (h_se - h_ne) * fx;

    let height = h_nw * (1.0 - fx) * (1.0 - fy)
        + h_ne * fx * (1.0 - fy)
        + h_sw * (1.0 - fx) * fy
        + h_se * fx * fy;

    InterpolationSample {
        height,
        gradient_x,
        gradient_y,
    }
}

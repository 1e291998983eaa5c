//! Square elevation grid shared by the synthesizer and the erosion simulator.

use crate::error::{Result, TerrainError};

/// Height returned by [`HeightField::sample`] for coordinates outside the grid.
pub const OUT_OF_BOUNDS_HEIGHT: f32 = -1.0;

/// An owned `size x size` grid of elevation samples, stored row-major.
///
/// All access goes through the 2D accessors below; `get`, `set` and `add`
/// panic on out-of-range coordinates, `try_get` and `sample` do not.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    size: usize,
    data: Vec<f32>,
}

/// Read/write view of a height grid used by the droplet simulator.
///
/// Implemented by [`HeightField`] for in-place erosion and by the delta
/// overlay the parallel driver hands to each droplet.
pub trait HeightSurface {
    /// Side length of the grid.
    fn size(&self) -> usize;
    /// Height at an in-bounds cell.
    fn height(&self, x: usize, y: usize) -> f32;
    /// Add `delta` to an in-bounds cell.
    fn add_height(&mut self, x: usize, y: usize, delta: f32);
}

impl HeightField {
    /// Create a field filled with zeros.
    pub fn new(size: usize) -> Result<Self> {
        Self::new_with(size, 0.0)
    }

    /// Create a field filled with `value`.
    pub fn new_with(size: usize, value: f32) -> Result<Self> {
        if size == 0 {
            return Err(TerrainError::InvalidDimension {
                size,
                reason: "height field side length must be at least 1",
            });
        }
        Ok(Self {
            size,
            data: vec![value; size * size],
        })
    }

    /// Wrap an existing row-major buffer, e.g. one produced by an importer.
    pub fn from_vec(size: usize, data: Vec<f32>) -> Result<Self> {
        if size == 0 {
            return Err(TerrainError::InvalidDimension {
                size,
                reason: "height field side length must be at least 1",
            });
        }
        if data.len() != size * size {
            return Err(TerrainError::InvalidDimension {
                size,
                reason: "buffer length does not equal size * size",
            });
        }
        Ok(Self { size, data })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn checked_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.size && y < self.size).then(|| y * self.size + x)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        match self.checked_index(x, y) {
            Some(idx) => idx,
            None => panic!(
                "height field access ({}, {}) outside {}x{} grid",
                x, y, self.size, self.size
            ),
        }
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn try_get(&self, x: usize, y: usize) -> Option<f32> {
        self.checked_index(x, y).map(|idx| self.data[idx])
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn add(&mut self, x: usize, y: usize, delta: f32) {
        let idx = self.index(x, y);
        self.data[idx] += delta;
    }

    /// Fill the entire field with a value.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Probe the field at signed integer coordinates.
    ///
    /// Exporters walk the grid opportunistically, so coordinates outside the
    /// field return [`OUT_OF_BOUNDS_HEIGHT`] instead of failing.
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 {
            return OUT_OF_BOUNDS_HEIGHT;
        }
        self.try_get(x as usize, y as usize)
            .unwrap_or(OUT_OF_BOUNDS_HEIGHT)
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let size = self.size;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, &h)| (idx % size, idx / size, h))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut f32)> {
        let size = self.size;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, h)| (idx % size, idx / size, h))
    }

    /// Row-major view of the samples.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Sum of all samples, accumulated in f64.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&h| h as f64).sum()
    }

    /// True when no sample is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|h| h.is_finite())
    }

    /// Point-sample a coarser `size x size` grid for mesh exporters.
    ///
    /// `size` must divide the field's side length.
    pub fn resample(&self, size: usize) -> Result<Self> {
        if size == 0 || size > self.size || self.size % size != 0 {
            return Err(TerrainError::InvalidDimension {
                size,
                reason: "resample size must divide the field size",
            });
        }
        let step = self.size / size;
        let mut data = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                data.push(self.get(x * step, y * step));
            }
        }
        Ok(Self { size, data })
    }
}

impl HeightSurface for HeightField {
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn height(&self, x: usize, y: usize) -> f32 {
        self.get(x, y)
    }

    #[inline]
    fn add_height(&mut self, x: usize, y: usize, delta: f32) {
        self.add(x, y, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            HeightField::new(0),
            Err(TerrainError::InvalidDimension { size: 0, .. })
        ));
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = HeightField::from_vec(4, vec![0.0; 15]).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidDimension { size: 4, .. }));
        assert!(HeightField::from_vec(4, vec![0.0; 16]).is_ok());
    }

    #[test]
    fn test_row_major_layout() {
        let mut field = HeightField::new(3).unwrap();
        field.set(2, 0, 1.0);
        field.set(0, 1, 2.0);
        assert_eq!(field.as_slice()[2], 1.0);
        assert_eq!(field.as_slice()[3], 2.0);
        let cells: Vec<_> = field.iter().filter(|&(_, _, h)| h > 0.0).collect();
        assert_eq!(cells, vec![(2, 0, 1.0), (0, 1, 2.0)]);
    }

    #[test]
    fn test_sample_sentinel_outside() {
        let field = HeightField::new_with(4, 0.5).unwrap();
        assert_eq!(field.sample(1, 2), 0.5);
        assert_eq!(field.sample(-1, 0), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(field.sample(0, 4), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(field.sample(4, 0), OUT_OF_BOUNDS_HEIGHT);
    }

    #[test]
    #[should_panic(expected = "outside 4x4 grid")]
    fn test_get_out_of_range_panics() {
        let field = HeightField::new(4).unwrap();
        field.get(0, 4);
    }

    #[test]
    fn test_x_and_y_checked_independently() {
        let field = HeightField::new(4).unwrap();
        assert!(field.try_get(4, 0).is_none());
        assert!(field.try_get(0, 4).is_none());
        assert!(field.try_get(3, 3).is_some());
    }

    #[test]
    fn test_resample_requires_divisor() {
        let mut field = HeightField::new(8).unwrap();
        field.set(4, 4, 3.0);
        let coarse = field.resample(2).unwrap();
        assert_eq!(coarse.size(), 2);
        assert_eq!(coarse.get(1, 1), 3.0);
        assert!(field.resample(3).is_err());
        assert!(field.resample(0).is_err());
        assert!(field.resample(16).is_err());
    }

    #[test]
    fn test_min_max_and_total() {
        let field = HeightField::from_vec(2, vec![0.25, -1.0, 2.0, 0.75]).unwrap();
        assert_eq!(field.min_max(), (-1.0, 2.0));
        assert!((field.total() - 2.0).abs() < 1e-9);
        assert!(field.is_finite());
    }
}

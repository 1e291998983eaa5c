//! Seeded continuous 2D noise consumed by the height field synthesizer.

use noise::{NoiseFn, Perlin, Seedable, Simplex};

/// A deterministic, seed-dependent 2D noise function.
///
/// `sample` returns values in [-1, 1] and is continuous across lattice
/// boundaries. Reseeding rebuilds the underlying permutation table.
pub trait NoiseSource {
    fn sample(&self, x: f64, y: f64) -> f64;
    fn reseed(&mut self, seed: u32);
    fn seed(&self) -> u32;
}

/// Adapter over any seedable generator from the `noise` crate.
#[derive(Clone, Debug)]
pub struct SeededNoise<F> {
    inner: F,
}

/// 2D simplex noise, the default source for terrain synthesis.
pub type SimplexNoise = SeededNoise<Simplex>;

/// Classic gradient (Perlin) noise.
pub type PerlinNoise = SeededNoise<Perlin>;

impl SeededNoise<Simplex> {
    pub fn simplex(seed: u32) -> Self {
        Self {
            inner: Simplex::new(seed),
        }
    }
}

impl SeededNoise<Perlin> {
    pub fn perlin(seed: u32) -> Self {
        Self {
            inner: Perlin::new(seed),
        }
    }
}

impl<F> NoiseSource for SeededNoise<F>
where
    F: NoiseFn<f64, 2> + Seedable + Clone,
{
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.inner.get([x, y]).clamp(-1.0, 1.0)
    }

    fn reseed(&mut self, seed: u32) {
        self.inner = self.inner.clone().set_seed(seed);
    }

    fn seed(&self) -> u32 {
        self.inner.seed()
    }
}

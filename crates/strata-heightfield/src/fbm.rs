//! Synthetic terrain: multi-octave fractal Brownian motion over simplex noise.
//!
//! Used to produce deterministic source grids for baking demos, tests and
//! benchmarks when no heightmap file is supplied.

use noise::{NoiseFn, Simplex};

use crate::error::HeightfieldError;
use crate::grid::Heightfield;

/// Octave configuration for [`FbmSource`].
#[derive(Clone, Debug, PartialEq)]
pub struct FbmParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of octaves composited per sample.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per grid sample.
    pub base_frequency: f64,
    /// Amplitude of the first octave, in elevation units.
    pub amplitude: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.0 / 256.0,
            amplitude: 64.0,
        }
    }
}

/// Samples fBm elevation at grid coordinates.
pub struct FbmSource {
    noise: Simplex,
    params: FbmParams,
}

impl FbmSource {
    /// Create a source with the given octave configuration.
    #[must_use]
    pub fn new(params: FbmParams) -> Self {
        let noise = Simplex::new(params.seed);
        Self { noise, params }
    }

    /// Elevation at a (possibly fractional) grid coordinate.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.get([x * frequency, y * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Geometric sum of all octave amplitudes; bounds `|sample|`.
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Rasterize the source into a `width x height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`HeightfieldError::EmptyGrid`] for grids smaller than 2x2.
    pub fn rasterize(&self, width: u32, height: u32) -> Result<Heightfield, HeightfieldError> {
        Heightfield::from_fn(width, height, |x, y| {
            self.sample(f64::from(x), f64::from(y)) as f32
        })
    }

    /// The octave configuration.
    #[must_use]
    pub fn params(&self) -> &FbmParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::HeightOracle;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_same_seed_same_height() {
        let a = FbmSource::new(FbmParams {
            seed: 42,
            ..Default::default()
        });
        let b = FbmSource::new(FbmParams {
            seed: 42,
            ..Default::default()
        });
        let h1 = a.sample(100.0, 200.0);
        let h2 = b.sample(100.0, 200.0);
        assert!((h1 - h2).abs() < EPSILON, "{h1} vs {h2}");
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = FbmSource::new(FbmParams {
            seed: 1,
            ..Default::default()
        });
        let b = FbmSource::new(FbmParams {
            seed: 999,
            ..Default::default()
        });
        assert!((a.sample(500.5, 500.5) - b.sample(500.5, 500.5)).abs() > EPSILON);
    }

    #[test]
    fn test_samples_within_max_amplitude() {
        let source = FbmSource::new(FbmParams::default());
        let max_amp = source.max_amplitude();
        for x in (0..64).map(|i| f64::from(i) * 7.0) {
            for y in (0..64).map(|i| f64::from(i) * 7.0) {
                let h = source.sample(x, y);
                assert!(h.abs() <= max_amp + EPSILON, "{h} exceeds {max_amp}");
            }
        }
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let source = FbmSource::new(FbmParams {
            amplitude: 1000.0,
            persistence: 0.5,
            octaves: 4,
            ..Default::default()
        });
        assert!((source.max_amplitude() - 1875.0).abs() < EPSILON);
    }

    #[test]
    fn test_rasterize_matches_sample() {
        let source = FbmSource::new(FbmParams {
            seed: 7,
            ..Default::default()
        });
        let field = source.rasterize(9, 5).unwrap();
        assert_eq!(field.width(), 9);
        assert_eq!(field.height(), 5);
        assert_eq!(field.get(4, 3), source.sample(4.0, 3.0) as f32);
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let source = FbmSource::new(FbmParams {
            amplitude: 0.0,
            ..Default::default()
        });
        let field = source.rasterize(4, 4).unwrap();
        assert_eq!(field.elevation_range(), (0.0, 0.0));
    }
}

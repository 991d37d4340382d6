//! Dense row-major elevation grids and square tile windows over them.

use crate::error::HeightfieldError;
use crate::oracle::HeightOracle;

/// A row-major grid of elevation samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl Heightfield {
    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`HeightfieldError::EmptyGrid`] if either dimension is below two
    /// samples and [`HeightfieldError::SizeMismatch`] if `samples` does not hold
    /// exactly `width * height` values.
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, HeightfieldError> {
        if width < 2 || height < 2 {
            return Err(HeightfieldError::EmptyGrid { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(HeightfieldError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a grid by evaluating `f(x, y)` at every sample.
    ///
    /// # Errors
    ///
    /// Returns [`HeightfieldError::EmptyGrid`] for grids smaller than 2x2.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> f32,
    ) -> Result<Self, HeightfieldError> {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self::new(width, height, samples)
    }

    /// A grid where every sample has the same elevation.
    ///
    /// # Errors
    ///
    /// Returns [`HeightfieldError::EmptyGrid`] for grids smaller than 2x2.
    pub fn flat(width: u32, height: u32, elevation: f32) -> Result<Self, HeightfieldError> {
        Self::from_fn(width, height, |_, _| elevation)
    }

    /// Sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        self.samples[y as usize * self.width as usize + x as usize]
    }

    /// Overwrite the sample at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, elevation: f32) {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        self.samples[y as usize * self.width as usize + x as usize] = elevation;
    }

    /// Raw samples in row-major order.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Minimum and maximum elevation over the whole grid.
    #[must_use]
    pub fn elevation_range(&self) -> (f32, f32) {
        min_max(self.samples.iter().copied())
    }

    /// A square window of `size` samples whose lower corner is `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`HeightfieldError::TileOutOfRange`] if the window does not fit.
    pub fn tile(&self, x: u32, y: u32, size: u32) -> Result<TileView<'_>, HeightfieldError> {
        let fits = size >= 2
            && x.checked_add(size).is_some_and(|end| end <= self.width)
            && y.checked_add(size).is_some_and(|end| end <= self.height);
        if !fits {
            return Err(HeightfieldError::TileOutOfRange {
                x,
                y,
                size,
                width: self.width,
                height: self.height,
            });
        }
        Ok(TileView {
            source: self,
            x,
            y,
            size,
        })
    }
}

impl HeightOracle for Heightfield {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn elevation(&self, x: i32, y: i32) -> f32 {
        self.samples[y as usize * self.width as usize + x as usize]
    }
}

/// A borrowed square window of a [`Heightfield`], addressed in tile-local
/// coordinates `0..size`.
///
/// Neighboring tiles overlap by one row or column of samples so that both
/// sides of a seam sample the same boundary elevations.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    source: &'a Heightfield,
    x: u32,
    y: u32,
    size: u32,
}

impl TileView<'_> {
    /// Window edge length in samples.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sample-space origin of the window in the source grid.
    #[must_use]
    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Minimum and maximum elevation inside the window.
    #[must_use]
    pub fn elevation_range(&self) -> (f32, f32) {
        let width = self.source.width as usize;
        let rows = (self.y..self.y + self.size).flat_map(|row| {
            let start = row as usize * width + self.x as usize;
            self.source.samples[start..start + self.size as usize]
                .iter()
                .copied()
        });
        min_max(rows)
    }
}

impl HeightOracle for TileView<'_> {
    fn width(&self) -> u32 {
        self.size
    }

    fn height(&self) -> u32 {
        self.size
    }

    fn elevation(&self, x: i32, y: i32) -> f32 {
        self.source.elevation(x + self.x as i32, y + self.y as i32)
    }
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_tiny_grid() {
        assert!(matches!(
            Heightfield::flat(1, 4, 0.0),
            Err(HeightfieldError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_sample_count() {
        let result = Heightfield::new(3, 3, vec![0.0; 8]);
        assert!(matches!(
            result,
            Err(HeightfieldError::SizeMismatch {
                expected: 9,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let field = Heightfield::from_fn(4, 3, |x, y| (y * 10 + x) as f32).unwrap();
        assert_eq!(field.get(2, 1), 12.0);
        assert_eq!(field.elevation(3, 2), 23.0);
        assert_eq!(field.elevation_range(), (0.0, 23.0));
    }

    #[test]
    fn test_tile_view_offsets_coordinates() {
        let field = Heightfield::from_fn(7, 7, |x, y| (y * 100 + x) as f32).unwrap();
        let tile = field.tile(3, 3, 4).unwrap();
        assert_eq!(tile.width(), 4);
        assert_eq!(tile.elevation(0, 0), 303.0);
        assert_eq!(tile.elevation(3, 3), 606.0);
        assert_eq!(tile.elevation_range(), (303.0, 606.0));
    }

    #[test]
    fn test_adjacent_tiles_share_boundary_samples() {
        let field = Heightfield::from_fn(7, 4, |x, y| (x * 3 + y) as f32).unwrap();
        let west = field.tile(0, 0, 4).unwrap();
        let east = field.tile(3, 0, 4).unwrap();
        for y in 0..4 {
            assert_eq!(west.elevation(3, y), east.elevation(0, y));
        }
    }

    #[test]
    fn test_tile_out_of_range() {
        let field = Heightfield::flat(8, 8, 0.0).unwrap();
        assert!(field.tile(5, 0, 4).is_err());
        assert!(field.tile(4, 4, 4).is_ok());
    }
}

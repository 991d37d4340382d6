//! Partitioning of a source grid into overlapping square tiles.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BakeError;

/// Tile address in tile units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A grid of square tiles that share their boundary rows and columns.
///
/// Tile `(x, y)` covers samples `x * stride ..= x * stride + size - 1` with
/// `stride = size - 1`, so the last column of one tile is the first column of
/// its eastern neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    /// Tiles along x.
    pub tiles_x: u32,
    /// Tiles along y.
    pub tiles_y: u32,
    /// Samples per tile edge.
    pub tile_size: u32,
}

impl TileGrid {
    /// Fit as many tiles as possible into a `width x height` source.
    ///
    /// Samples beyond the last full tile are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::TileSize`] if not even one tile fits.
    pub fn for_source(width: u32, height: u32, tile_size: u32) -> Result<Self, BakeError> {
        if tile_size < 2 || width < tile_size || height < tile_size {
            return Err(BakeError::TileSize {
                width,
                height,
                tile_size,
            });
        }
        let stride = tile_size - 1;
        let grid = Self {
            tiles_x: (width - 1) / stride,
            tiles_y: (height - 1) / stride,
            tile_size,
        };
        let (used_w, used_h) = grid.sample_size();
        if used_w != width || used_h != height {
            warn!(
                width,
                height,
                used_w,
                used_h,
                "source does not divide into whole tiles; cropping"
            );
        }
        Ok(grid)
    }

    /// Samples advanced from one tile to the next.
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.tile_size - 1
    }

    /// Samples covered by the whole grid.
    #[must_use]
    pub fn sample_size(&self) -> (u32, u32) {
        (
            self.tiles_x * self.stride() + 1,
            self.tiles_y * self.stride() + 1,
        )
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major linear index of `coord`.
    #[must_use]
    pub fn index(&self, coord: TileCoord) -> usize {
        coord.y as usize * self.tiles_x as usize + coord.x as usize
    }

    /// All tiles in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.tiles_y).flat_map(move |y| (0..self.tiles_x).map(move |x| TileCoord::new(x, y)))
    }

    /// Sample-space origin of `coord`.
    #[must_use]
    pub fn origin(&self, coord: TileCoord) -> (u32, u32) {
        (coord.x * self.stride(), coord.y * self.stride())
    }

    /// Edge-adjacent neighbors of `coord` inside the grid, with their tile
    /// offset from `coord`.
    pub fn neighbors(&self, coord: TileCoord) -> impl Iterator<Item = (TileCoord, [i32; 2])> + '_ {
        [[-1, 0], [1, 0], [0, -1], [0, 1]]
            .into_iter()
            .filter_map(move |[dx, dy]| {
                let x = coord.x.checked_add_signed(dx)?;
                let y = coord.y.checked_add_signed(dy)?;
                (x < self.tiles_x && y < self.tiles_y).then_some((TileCoord::new(x, y), [dx, dy]))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fit() {
        let grid = TileGrid::for_source(3 * 63 + 1, 2 * 63 + 1, 64).unwrap();
        assert_eq!((grid.tiles_x, grid.tiles_y), (3, 2));
        assert_eq!(grid.sample_size(), (190, 127));
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.origin(TileCoord::new(2, 1)), (126, 63));
    }

    #[test]
    fn test_crops_ragged_source() {
        let grid = TileGrid::for_source(1024, 1024, 256).unwrap();
        assert_eq!((grid.tiles_x, grid.tiles_y), (4, 4));
        assert_eq!(grid.sample_size(), (1021, 1021));
    }

    #[test]
    fn test_dem_sizes_split_without_cropping() {
        let cases = [(1025, 129, 8), (1025, 65, 16), (513, 65, 8), (257, 33, 8)];
        for (source, tile_size, tiles) in cases {
            let grid = TileGrid::for_source(source, source, tile_size).unwrap();
            assert_eq!(grid.sample_size(), (source, source), "{source} / {tile_size}");
            assert_eq!((grid.tiles_x, grid.tiles_y), (tiles, tiles));
        }
    }

    #[test]
    fn test_too_small_source() {
        assert!(matches!(
            TileGrid::for_source(100, 300, 256),
            Err(BakeError::TileSize { .. })
        ));
    }

    #[test]
    fn test_row_major_order() {
        let grid = TileGrid::for_source(9, 5, 5).unwrap();
        let coords: Vec<TileCoord> = grid.coords().collect();
        assert_eq!(coords, vec![TileCoord::new(0, 0), TileCoord::new(1, 0)]);
        assert_eq!(grid.index(TileCoord::new(1, 0)), 1);
    }

    #[test]
    fn test_neighbors_stay_inside() {
        let grid = TileGrid::for_source(13, 13, 5).unwrap();
        let corner: Vec<_> = grid.neighbors(TileCoord::new(0, 0)).collect();
        assert_eq!(
            corner,
            vec![(TileCoord::new(1, 0), [1, 0]), (TileCoord::new(0, 1), [0, 1])]
        );
        assert_eq!(grid.neighbors(TileCoord::new(1, 1)).count(), 4);
    }
}

//! Extracted level-of-detail meshes in grid coordinates.

use glam::IVec2;

use crate::error::TinError;

/// Largest grid edge length whose coordinates fit in one byte.
pub const MAX_PACKED_GRID: i32 = 256;

/// One level of detail of a tile: grid-space points and triangles indexing
/// into them, with the triangulator's winding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodMesh {
    /// Grid dimensions in samples; boundary lines are `0` and `size - 1`.
    pub size: IVec2,
    /// Vertex positions in grid coordinates.
    pub points: Vec<IVec2>,
    /// Triangles as point indices.
    pub triangles: Vec<[u32; 3]>,
    /// Worst remaining approximation error when the level was captured.
    pub max_error: f32,
}

impl LodMesh {
    /// Number of vertices.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Whether some vertex sits at `point`.
    #[must_use]
    pub fn contains_point(&self, point: IVec2) -> bool {
        self.points.contains(&point)
    }

    /// Whether `point` lies on one of the four boundary lines.
    #[must_use]
    pub fn on_boundary(&self, point: IVec2) -> bool {
        point.x == 0 || point.y == 0 || point.x == self.size.x - 1 || point.y == self.size.y - 1
    }

    /// Vertices lying on the tile boundary.
    pub fn boundary_points(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.points.iter().copied().filter(|&p| self.on_boundary(p))
    }

    /// Vertices packed as two-byte grid coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`TinError::GridTooLarge`] if the grid is wider or taller than
    /// [`MAX_PACKED_GRID`] samples.
    pub fn packed_points(&self) -> Result<Vec<[u8; 2]>, TinError> {
        if self.size.x > MAX_PACKED_GRID || self.size.y > MAX_PACKED_GRID {
            return Err(TinError::GridTooLarge {
                width: self.size.x,
                height: self.size.y,
                max: MAX_PACKED_GRID,
            });
        }
        Ok(self
            .points
            .iter()
            .map(|p| [p.x as u8, p.y as u8])
            .collect())
    }

    /// Flattened triangle indices.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Sum of triangle areas in grid units.
    ///
    /// A conforming rewrite of a mesh must preserve this exactly.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (pa, pb, pc) = (
                    self.points[a as usize],
                    self.points[b as usize],
                    self.points[c as usize],
                );
                strata_heightfield::edge_function(pa, pb, pc) as f64 * 0.5
            })
            .sum()
    }
}

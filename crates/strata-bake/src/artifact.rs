//! On-disk tile buffers and their JSON documents.
//!
//! ## Layout
//!
//! | File | Content |
//! |------|---------|
//! | `tile_{x}_{y}_lod{l}.vtx` | Packed vertices, two bytes each: grid `x` then `y` |
//! | `tile_{x}_{y}_lod{l}.idx` | Triangle indices, three per triangle, little-endian `u16` if the level has at most 65536 vertices, else `u32` |
//! | `manifest.json` | Grid shape, per-level counts, index widths and file names |
//! | `bounds.json` | The [`BoundTree`](strata_bounds::BoundTree) document |

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_tin::LodMesh;
use tracing::info;

use crate::bake::BakeOutput;
use crate::error::BakeError;
use crate::tiles::TileCoord;

/// Name of the manifest document.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Name of the bound tree document.
pub const BOUNDS_FILE: &str = "bounds.json";

/// Largest vertex count addressable by 16-bit indices.
pub const MAX_U16_VERTICES: usize = 1 << 16;

/// Triangle indices at the narrowest width that fits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Indices of `mesh`, narrowed to `u16` when every vertex is addressable.
    #[must_use]
    pub fn for_mesh(mesh: &LodMesh) -> Self {
        let indices = mesh.indices();
        if mesh.num_points() <= MAX_U16_VERTICES {
            Self::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            Self::U32(indices)
        }
    }

    /// Bytes per index.
    #[must_use]
    pub fn width(&self) -> u8 {
        match self {
            Self::U16(_) => 2,
            Self::U32(_) => 4,
        }
    }

    /// Number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Little-endian byte encoding.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::U16(v) => v.iter().flat_map(|i| i.to_le_bytes()).collect(),
            Self::U32(v) => v.iter().flat_map(|i| i.to_le_bytes()).collect(),
        }
    }
}

/// Encoded buffers of one level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedLod {
    /// Packed `[x, y]` byte pairs, one per point.
    pub vertices: Vec<u8>,
    pub indices: IndexBuffer,
}

/// Encode one level into its two buffers.
///
/// # Errors
///
/// Returns [`BakeError::Tin`] if the grid does not fit byte coordinates.
pub fn encode(mesh: &LodMesh) -> Result<EncodedLod, BakeError> {
    let packed = mesh.packed_points()?;
    Ok(EncodedLod {
        vertices: bytemuck::cast_slice::<[u8; 2], u8>(&packed).to_vec(),
        indices: IndexBuffer::for_mesh(mesh),
    })
}

/// Base file name of a tile level, without extension.
#[must_use]
pub fn lod_stem(coord: TileCoord, lod: usize) -> String {
    format!("tile_{}_{}_lod{lod}", coord.x, coord.y)
}

/// Manifest entry for one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestLod {
    pub lod: usize,
    pub points: usize,
    pub triangles: usize,
    /// Worst vertical error left at this level.
    pub max_error: f32,
    /// Bytes per index, 2 or 4.
    pub index_width: u8,
    /// File names relative to the manifest.
    pub vertex_file: String,
    pub index_file: String,
}

/// Manifest entry for one tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestTile {
    pub x: u32,
    pub y: u32,
    pub min: f32,
    pub max: f32,
    pub lods: Vec<ManifestLod>,
}

/// Index of everything written by [`write_artifacts`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Samples per tile edge, shared edges included.
    pub tile_size: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub tiles: Vec<ManifestTile>,
}

impl Manifest {
    /// Read a manifest written by [`write_artifacts`].
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::Io`] or [`BakeError::Json`] on failure.
    pub fn load(dir: &Path) -> Result<Self, BakeError> {
        let path = dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(BakeError::io(&path))?;
        serde_json::from_str(&text).map_err(|source| BakeError::Json {
            what: "manifest",
            source,
        })
    }
}

/// Write every tile level, the manifest and the bound tree into `dir`.
///
/// # Errors
///
/// Returns the first encoding or I/O failure.
pub fn write_artifacts(output: &BakeOutput, dir: &Path) -> Result<Manifest, BakeError> {
    std::fs::create_dir_all(dir).map_err(BakeError::io(dir))?;

    let mut tiles = Vec::with_capacity(output.tiles.len());
    let mut bytes_written = 0;
    for tile in &output.tiles {
        let mut lods = Vec::with_capacity(tile.lods.len());
        for (lod, mesh) in tile.lods.iter().enumerate() {
            let encoded = encode(mesh)?;
            let stem = lod_stem(tile.coord, lod);
            let vertex_file = format!("{stem}.vtx");
            let index_file = format!("{stem}.idx");
            let index_bytes = encoded.indices.to_le_bytes();

            let path = dir.join(&vertex_file);
            std::fs::write(&path, &encoded.vertices).map_err(BakeError::io(&path))?;
            let path = dir.join(&index_file);
            std::fs::write(&path, &index_bytes).map_err(BakeError::io(&path))?;
            bytes_written += encoded.vertices.len() + index_bytes.len();

            lods.push(ManifestLod {
                lod,
                points: mesh.num_points(),
                triangles: mesh.num_triangles(),
                max_error: mesh.max_error,
                index_width: encoded.indices.width(),
                vertex_file,
                index_file,
            });
        }
        tiles.push(ManifestTile {
            x: tile.coord.x,
            y: tile.coord.y,
            min: tile.bound.min,
            max: tile.bound.max,
            lods,
        });
    }

    let manifest = Manifest {
        tile_size: output.grid.tile_size,
        tiles_x: output.grid.tiles_x,
        tiles_y: output.grid.tiles_y,
        tiles,
    };
    let json = serde_json::to_string_pretty(&manifest).map_err(|source| BakeError::Json {
        what: "manifest",
        source,
    })?;
    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, json).map_err(BakeError::io(&path))?;

    let path = dir.join(BOUNDS_FILE);
    std::fs::write(&path, output.bounds.to_json()?).map_err(BakeError::io(&path))?;

    info!(
        dir = %dir.display(),
        tiles = manifest.tiles.len(),
        bytes = bytes_written,
        "wrote artifacts"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;

    fn mesh(points: usize) -> LodMesh {
        LodMesh {
            size: IVec2::splat(256),
            points: (0..points)
                .map(|i| IVec2::new((i % 256) as i32, ((i / 256) % 256) as i32))
                .collect(),
            triangles: vec![[0, 1, 2], [2, 1, (points - 1) as u32]],
            max_error: 1.5,
        }
    }

    #[test]
    fn test_small_meshes_use_u16() {
        let buffer = IndexBuffer::for_mesh(&mesh(4));
        assert_eq!(buffer, IndexBuffer::U16(vec![0, 1, 2, 2, 1, 3]));
        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.to_le_bytes(), vec![0, 0, 1, 0, 2, 0, 2, 0, 1, 0, 3, 0]);
    }

    #[test]
    fn test_u16_limit_is_inclusive() {
        let buffer = IndexBuffer::for_mesh(&mesh(MAX_U16_VERTICES));
        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.len(), 6);
        let IndexBuffer::U16(indices) = buffer else {
            panic!("expected u16 indices");
        };
        assert_eq!(indices[5], u16::MAX);
    }

    #[test]
    fn test_large_meshes_use_u32() {
        let buffer = IndexBuffer::for_mesh(&mesh(MAX_U16_VERTICES + 1));
        assert_eq!(buffer.width(), 4);
        let bytes = buffer.to_le_bytes();
        assert_eq!(bytes.len(), 6 * 4);
        assert_eq!(&bytes[20..24], &65536u32.to_le_bytes());
    }

    #[test]
    fn test_vertices_pack_x_then_y() {
        let mut m = mesh(3);
        m.points = vec![IVec2::new(0, 0), IVec2::new(255, 7), IVec2::new(3, 255)];
        let encoded = encode(&m).unwrap();
        assert_eq!(encoded.vertices, vec![0, 0, 255, 7, 3, 255]);
    }

    #[test]
    fn test_lod_stem() {
        assert_eq!(lod_stem(TileCoord::new(3, 12), 0), "tile_3_12_lod0");
    }
}

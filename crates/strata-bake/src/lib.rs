//! Tile baking: cut a heightmap into overlapping tiles, triangulate each tile
//! into a chain of levels on a worker pool, match the seams between
//! neighbors, and write compact vertex and index buffers plus documents
//! describing them.

mod artifact;
mod bake;
mod error;
mod pool;
mod rivets;
mod source;
mod tiles;

pub use artifact::{
    BOUNDS_FILE, EncodedLod, IndexBuffer, MANIFEST_FILE, MAX_U16_VERTICES, Manifest, ManifestLod,
    ManifestTile, encode, lod_stem, write_artifacts,
};
pub use bake::{BakeOutput, BakeSettings, TileLods, bake};
pub use error::BakeError;
pub use pool::WorkerPool;
pub use rivets::rivet_set;
pub use source::{load_png, load_source, synthesize};
pub use tiles::{TileCoord, TileGrid};

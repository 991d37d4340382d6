//! Height sources for TIN construction: the [`HeightOracle`] contract, dense
//! sample grids, tile windows over a larger grid, and a synthetic fBm source.

mod error;
mod fbm;
mod grid;
mod oracle;

pub use error::HeightfieldError;
pub use fbm::{FbmParams, FbmSource};
pub use grid::{Heightfield, TileView};
pub use oracle::{HeightOracle, edge_function};

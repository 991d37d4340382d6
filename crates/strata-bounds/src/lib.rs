//! Hierarchical elevation bounds over a grid of baked tiles.
//!
//! A [`BoundTree`] partitions a `width x height` tile grid into quadrants
//! down to single tiles. Every node stores the elevation range of the tiles it
//! covers, so a renderer or culler can reject whole regions with one test.

mod error;
mod tree;

pub use error::BoundsError;
pub use tree::{BoundNode, BoundTree, TileBound};

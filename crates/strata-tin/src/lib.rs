//! Greedy-insertion Delaunay TIN construction for heightfield tiles.
//!
//! [`Triangulator`] refines a two-triangle seed mesh by repeatedly inserting
//! the grid point of worst approximation error, legalizing edges to keep the
//! mesh Delaunay, and snapshotting [`LodMesh`] levels at descending error
//! thresholds or ascending triangle budgets. [`BoundaryConformer`] rewrites
//! the tile-edge triangles of a snapshot so that boundary vertices required by
//! neighboring tiles or levels are present.

mod conform;
mod error;
mod error_queue;
mod lod;
mod mesh;
mod predicates;
mod triangulator;

pub use conform::{
    BoundaryConformer, BoundaryLine, ConformStats, CornerPolicy, PassPolicy, accept_all,
    boundary_line, skipped_cells,
};
pub use error::TinError;
pub use error_queue::ErrorQueue;
pub use lod::{BoundaryMode, LodOptions, LodSchedule};
pub use mesh::{LodMesh, MAX_PACKED_GRID};
pub use predicates::{collinear, in_circle};
pub use triangulator::{NO_EDGE, Triangulator, TriangulatorParams};

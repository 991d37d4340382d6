//! Rivets: boundary vertices shared across a tile seam.
//!
//! After every tile is triangulated, each tile collects the boundary vertices
//! of its own finest level plus those its edge neighbors placed on the shared
//! edges. Every level of the tile is then cut at exactly those cells. Both
//! sides of a seam end up with the same vertex set at every level, so any pair
//! of levels meets without T-junctions.

use glam::IVec2;
use rustc_hash::FxHashSet;
use strata_tin::BoundaryConformer;
use tracing::{debug, warn};

use crate::bake::TileLods;
use crate::pool::WorkerPool;
use crate::tiles::{TileCoord, TileGrid};

/// Boundary cells of `coord` that must carry a vertex, in tile coordinates.
///
/// `tiles` is in row-major order.
#[must_use]
pub fn rivet_set(grid: &TileGrid, tiles: &[TileLods], coord: TileCoord) -> FxHashSet<IVec2> {
    let last = grid.stride() as i32;
    let own = &tiles[grid.index(coord)];
    let mut rivets: FxHashSet<IVec2> = own
        .finest()
        .map(|mesh| mesh.boundary_points().collect())
        .unwrap_or_default();

    for (neighbor, [dx, dy]) in grid.neighbors(coord) {
        let Some(mesh) = tiles[grid.index(neighbor)].finest() else {
            continue;
        };
        let offset = IVec2::new(dx, dy) * last;
        rivets.extend(
            mesh.boundary_points()
                .map(|p| p + offset)
                .filter(|p| p.cmpge(IVec2::ZERO).all() && p.cmple(IVec2::splat(last)).all()),
        );
    }
    rivets
}

/// Cut every level of every tile at its rivet set.
pub fn apply(grid: &TileGrid, tiles: &mut Vec<TileLods>, pool: &WorkerPool) {
    let sets: Vec<FxHashSet<IVec2>> = grid
        .coords()
        .map(|coord| rivet_set(grid, tiles, coord))
        .collect();

    let jobs: Vec<(TileLods, FxHashSet<IVec2>)> =
        std::mem::take(tiles).into_iter().zip(sets).collect();
    *tiles = pool.map(jobs, |(mut tile, rivets)| {
        cut_tile(&mut tile, &rivets);
        tile
    });
}

fn cut_tile(tile: &mut TileLods, rivets: &FxHashSet<IVec2>) {
    let mut inserted = 0;
    for (lod, mesh) in tile.lods.iter_mut().enumerate() {
        let stats = BoundaryConformer::cutter(mesh.size, |p| rivets.contains(&p)).conform(mesh);
        if stats.unresolved > 0 {
            warn!(
                x = tile.coord.x,
                y = tile.coord.y,
                lod,
                unresolved = stats.unresolved,
                "boundary triangles left uncut"
            );
        }
        inserted += stats.inserted;
    }
    debug!(
        x = tile.coord.x,
        y = tile.coord.y,
        rivets = rivets.len(),
        inserted,
        "riveted tile"
    );
}

//! The tile bake: parallel triangulation, boundary matching and bounds.

use strata_bounds::{BoundTree, TileBound};
use strata_config::{Config, LodScheduleConfig};
use strata_heightfield::{HeightOracle, Heightfield};
use strata_tin::{BoundaryMode, LodMesh, LodOptions, LodSchedule, Triangulator, TriangulatorParams};
use tracing::{debug, info, info_span};

use crate::error::BakeError;
use crate::pool::WorkerPool;
use crate::rivets;
use crate::tiles::{TileCoord, TileGrid};

/// Everything a bake needs besides the source and the pool.
#[derive(Clone, Debug, PartialEq)]
pub struct BakeSettings {
    /// Samples per tile edge, shared edges included.
    pub tile_size: u32,
    /// Error floor and caps for every tile's triangulator.
    pub params: TriangulatorParams,
    /// Stop condition of each level, coarsest first.
    pub schedule: LodSchedule,
    /// Match shared edges between neighbors instead of stitching every
    /// boundary cell.
    pub rivets: bool,
}

impl BakeSettings {
    /// Settings from a loaded config.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::Config`] if the config fails validation.
    pub fn from_config(config: &Config) -> Result<Self, BakeError> {
        config.validate()?;
        let cap = |n: u32| (n > 0).then_some(n as usize);
        let schedule = match &config.lod.schedule {
            LodScheduleConfig::Errors(thresholds) => LodSchedule::Errors(thresholds.clone()),
            LodScheduleConfig::Budgets(budgets) => {
                LodSchedule::Budgets(budgets.iter().map(|&b| b as usize).collect())
            }
        };
        Ok(Self {
            tile_size: config.tiles.tile_size,
            params: TriangulatorParams {
                min_error: config.triangulation.min_error,
                max_triangles: cap(config.triangulation.max_triangles),
                max_points: cap(config.triangulation.max_points),
            },
            schedule,
            rivets: config.lod.rivets,
        })
    }

    fn boundary_mode(&self) -> BoundaryMode {
        if self.rivets {
            BoundaryMode::Raw
        } else {
            BoundaryMode::Stitch
        }
    }
}

/// All levels of one tile, coarsest first.
#[derive(Clone, Debug, PartialEq)]
pub struct TileLods {
    /// Position in the tile grid.
    pub coord: TileCoord,
    /// One mesh per schedule level, in tile-local coordinates.
    pub lods: Vec<LodMesh>,
    /// Elevation range of the tile's samples.
    pub bound: TileBound,
}

impl TileLods {
    /// The most refined level.
    #[must_use]
    pub fn finest(&self) -> Option<&LodMesh> {
        self.lods.last()
    }
}

/// Result of a bake, ready to be written.
#[derive(Clone, Debug)]
pub struct BakeOutput {
    /// How the source was partitioned.
    pub grid: TileGrid,
    /// Tiles in row-major order.
    pub tiles: Vec<TileLods>,
    /// Hierarchical elevation bounds over the tile grid.
    pub bounds: BoundTree,
}

impl BakeOutput {
    /// The tile at `coord`.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> &TileLods {
        &self.tiles[self.grid.index(coord)]
    }
}

/// Triangulate every tile of `source` on `pool`, match shared edges and
/// aggregate elevation bounds.
///
/// # Errors
///
/// Returns [`BakeError::TileSize`] if no tile fits the source and
/// [`BakeError::Tin`] if the LOD schedule or tile size is rejected by the
/// triangulator.
pub fn bake(
    source: &Heightfield,
    settings: &BakeSettings,
    pool: &WorkerPool,
) -> Result<BakeOutput, BakeError> {
    let _span = info_span!("bake", tile_size = settings.tile_size).entered();
    let grid = TileGrid::for_source(source.width(), source.height(), settings.tile_size)?;
    info!(
        tiles_x = grid.tiles_x,
        tiles_y = grid.tiles_y,
        levels = settings.schedule.len(),
        threads = pool.threads(),
        "triangulating tiles"
    );

    let jobs: Vec<TileCoord> = grid.coords().collect();
    let mut tiles = pool
        .map(jobs, |coord| bake_tile(source, &grid, coord, settings))
        .into_iter()
        .collect::<Result<Vec<_>, BakeError>>()?;

    // The map above has joined every worker, so all finest levels exist.
    if settings.rivets {
        info!("matching tile edges");
        rivets::apply(&grid, &mut tiles, pool);
    }

    let bounds: Vec<TileBound> = tiles.iter().map(|t| t.bound).collect();
    let bounds = BoundTree::build(grid.tiles_x, grid.tiles_y, &bounds)?;
    info!(
        min = bounds.root().min,
        max = bounds.root().max,
        "bake complete"
    );
    Ok(BakeOutput {
        grid,
        tiles,
        bounds,
    })
}

fn bake_tile(
    source: &Heightfield,
    grid: &TileGrid,
    coord: TileCoord,
    settings: &BakeSettings,
) -> Result<TileLods, BakeError> {
    let (x, y) = grid.origin(coord);
    let view = source.tile(x, y, grid.tile_size)?;
    let (min, max) = view.elevation_range();

    let mut tin = Triangulator::new(view, settings.params);
    let options = LodOptions {
        boundary: settings.boundary_mode(),
    };
    let lods = tin.run_schedule(&settings.schedule, &options)?;
    debug!(
        x = coord.x,
        y = coord.y,
        levels = lods.len(),
        triangles = lods.last().map_or(0, LodMesh::num_triangles),
        "triangulated tile"
    );
    Ok(TileLods {
        coord,
        lods,
        bound: TileBound::new(min, max),
    })
}

//! Level-of-detail extraction on top of the triangulator.
//!
//! Levels are produced coarse to fine from one refinement run: the
//! triangulator is stepped until a level's stop condition holds, the active
//! mesh is snapshotted, and refinement resumes toward the next level. LOD 0 is
//! always the coarsest.

use glam::IVec2;
use strata_heightfield::HeightOracle;
use tracing::{debug, debug_span, trace};

use crate::conform::BoundaryConformer;
use crate::error::TinError;
use crate::mesh::{LodMesh, MAX_PACKED_GRID};
use crate::triangulator::Triangulator;

/// What happens to tile boundaries after each snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Fill every skipped boundary cell so any neighbor meets the level
    /// without cracks.
    #[default]
    Stitch,
    /// Leave boundaries as triangulated, for a later rivet pass.
    Raw,
}

/// Options shared by every LOD extraction entry point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LodOptions {
    /// How each snapshot's tile boundary is conformed.
    pub boundary: BoundaryMode,
}

/// Stop conditions for successive levels.
#[derive(Clone, Debug, PartialEq)]
pub enum LodSchedule {
    /// Strictly descending error thresholds.
    Errors(Vec<f32>),
    /// Strictly ascending triangle budgets.
    Budgets(Vec<usize>),
}

impl LodSchedule {
    /// Number of levels the schedule produces.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Errors(levels) => levels.len(),
            Self::Budgets(levels) => levels.len(),
        }
    }

    /// Whether the schedule has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<O: HeightOracle> Triangulator<O> {
    /// Extract one level per error threshold.
    ///
    /// Thresholds must strictly decrease and stay above the configured
    /// `min_error`; the schedule is checked before any refinement happens.
    ///
    /// # Errors
    ///
    /// Returns a [`TinError`] describing the first schedule problem, or
    /// [`TinError::GridTooLarge`] if the oracle exceeds the packed grid size.
    pub fn run_lod(
        &mut self,
        thresholds: &[f32],
        options: &LodOptions,
    ) -> Result<Vec<LodMesh>, TinError> {
        self.validate_thresholds(thresholds)?;
        self.check_packable()?;

        let _span = debug_span!("run_lod", levels = thresholds.len()).entered();
        self.initialize();

        let mut levels = Vec::with_capacity(thresholds.len());
        for &threshold in thresholds {
            while !self.is_done(threshold, None) {
                self.step();
            }
            trace!(flips = self.num_flips(), "refined to threshold");
            let level = self.snapshot(options);
            debug!(
                lod = levels.len(),
                threshold,
                points = level.num_points(),
                triangles = level.num_triangles(),
                error = level.max_error,
                "extracted LOD"
            );
            levels.push(level);
        }
        Ok(levels)
    }

    /// Extract one level per triangle budget.
    ///
    /// A level may exceed its budget by the net triangles of one insertion,
    /// which is at most two. Legalization never changes the count.
    ///
    /// # Errors
    ///
    /// Returns [`TinError::BudgetsNotAscending`] or [`TinError::EmptySchedule`]
    /// for a bad schedule, or [`TinError::GridTooLarge`].
    pub fn run_lod_budgets(
        &mut self,
        budgets: &[usize],
        options: &LodOptions,
    ) -> Result<Vec<LodMesh>, TinError> {
        validate_budgets(budgets)?;
        self.check_packable()?;

        let _span = debug_span!("run_lod_budgets", levels = budgets.len()).entered();
        self.initialize();

        let min_error = self.params.min_error;
        let mut levels = Vec::with_capacity(budgets.len());
        for &budget in budgets {
            while !self.is_done(min_error, Some(budget)) {
                self.step();
            }
            trace!(flips = self.num_flips(), "refined to budget");
            let level = self.snapshot(options);
            debug!(
                lod = levels.len(),
                budget,
                points = level.num_points(),
                triangles = level.num_triangles(),
                error = level.max_error,
                "extracted LOD"
            );
            levels.push(level);
        }
        Ok(levels)
    }

    /// Dispatch on a [`LodSchedule`].
    ///
    /// # Errors
    ///
    /// See [`run_lod`](Self::run_lod) and [`run_lod_budgets`](Self::run_lod_budgets).
    pub fn run_schedule(
        &mut self,
        schedule: &LodSchedule,
        options: &LodOptions,
    ) -> Result<Vec<LodMesh>, TinError> {
        match schedule {
            LodSchedule::Errors(thresholds) => self.run_lod(thresholds, options),
            LodSchedule::Budgets(budgets) => self.run_lod_budgets(budgets, options),
        }
    }

    /// Copy the active mesh into a [`LodMesh`], conforming its boundary if
    /// requested.
    fn snapshot(&self, options: &LodOptions) -> LodMesh {
        let size = IVec2::new(self.oracle.width() as i32, self.oracle.height() as i32);
        let mut mesh = LodMesh {
            size,
            points: self.points().to_vec(),
            triangles: self
                .triangles()
                .map(|[a, b, c]| [a as u32, b as u32, c as u32])
                .collect(),
            max_error: self.error(),
        };
        if options.boundary == BoundaryMode::Stitch {
            BoundaryConformer::stitcher(size).conform(&mut mesh);
        }
        mesh
    }

    fn validate_thresholds(&self, thresholds: &[f32]) -> Result<(), TinError> {
        if thresholds.is_empty() {
            return Err(TinError::EmptySchedule);
        }
        let floor = self.params.min_error;
        if let Some(&threshold) = thresholds.iter().find(|&&t| t <= floor) {
            return Err(TinError::ThresholdBelowFloor { threshold, floor });
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[1] >= w[0]) {
            return Err(TinError::ThresholdsNotDescending {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(())
    }

    fn check_packable(&self) -> Result<(), TinError> {
        let (width, height) = (self.oracle.width() as i32, self.oracle.height() as i32);
        if width > MAX_PACKED_GRID || height > MAX_PACKED_GRID {
            return Err(TinError::GridTooLarge {
                width,
                height,
                max: MAX_PACKED_GRID,
            });
        }
        Ok(())
    }
}

fn validate_budgets(budgets: &[usize]) -> Result<(), TinError> {
    match budgets.first() {
        None => return Err(TinError::EmptySchedule),
        Some(&0) => {
            return Err(TinError::BudgetsNotAscending {
                previous: 0,
                next: 0,
            });
        }
        Some(_) => {}
    }
    if let Some(pair) = budgets.windows(2).find(|w| w[1] <= w[0]) {
        return Err(TinError::BudgetsNotAscending {
            previous: pair[0],
            next: pair[1],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_heightfield::Heightfield;

    use super::*;
    use crate::triangulator::TriangulatorParams;

    fn hill(size: u32) -> Heightfield {
        let c = (size - 1) as f32 * 0.5;
        Heightfield::from_fn(size, size, |x, y| {
            let (dx, dy) = (x as f32 - c, y as f32 - c);
            40.0 - (dx * dx + dy * dy) * 0.2 + ((x * 7 + y * 3) % 5) as f32
        })
        .unwrap()
    }

    fn triangulator(field: &Heightfield, min_error: f32) -> Triangulator<&Heightfield> {
        Triangulator::new(
            field,
            TriangulatorParams {
                min_error,
                ..TriangulatorParams::default()
            },
        )
    }

    #[test]
    fn test_levels_refine_coarse_to_fine() {
        let field = hill(33);
        let mut tin = triangulator(&field, 0.0);
        let levels = tin
            .run_lod(&[16.0, 4.0, 1.0], &LodOptions { boundary: BoundaryMode::Raw })
            .unwrap();

        assert_eq!(levels.len(), 3);
        for pair in levels.windows(2) {
            assert!(pair[0].num_triangles() <= pair[1].num_triangles());
            assert!(pair[0].max_error >= pair[1].max_error);
        }
        for (level, threshold) in levels.iter().zip([16.0, 4.0, 1.0]) {
            assert!(level.max_error <= threshold);
        }
    }

    #[test]
    fn test_raw_levels_share_point_prefix() {
        let field = hill(17);
        let mut tin = triangulator(&field, 0.0);
        let levels = tin
            .run_lod(&[8.0, 2.0], &LodOptions { boundary: BoundaryMode::Raw })
            .unwrap();
        let coarse = &levels[0].points;
        assert_eq!(coarse[..], levels[1].points[..coarse.len()]);
    }

    #[test]
    fn test_stitched_levels_have_dense_boundaries() {
        let field = hill(17);
        let mut tin = triangulator(&field, 0.0);
        let levels = tin.run_lod(&[8.0, 2.0], &LodOptions::default()).unwrap();
        for level in &levels {
            assert_eq!(level.boundary_points().count(), 4 * 16);
        }
    }

    #[test]
    fn test_threshold_validation_runs_before_work() {
        let field = hill(9);
        let mut tin = triangulator(&field, 1.0);
        let options = LodOptions::default();

        assert_eq!(
            tin.run_lod(&[4.0, 1.0], &options),
            Err(TinError::ThresholdBelowFloor {
                threshold: 1.0,
                floor: 1.0
            })
        );
        assert_eq!(
            tin.run_lod(&[4.0, 4.0], &options),
            Err(TinError::ThresholdsNotDescending {
                previous: 4.0,
                next: 4.0
            })
        );
        assert_eq!(tin.run_lod(&[], &options), Err(TinError::EmptySchedule));
        assert_eq!(tin.num_points(), 0, "nothing ran");
    }

    #[test]
    fn test_budget_validation() {
        let field = hill(9);
        let mut tin = triangulator(&field, 0.0);
        let options = LodOptions::default();
        assert_eq!(
            tin.run_lod_budgets(&[10, 10], &options),
            Err(TinError::BudgetsNotAscending {
                previous: 10,
                next: 10
            })
        );
        assert!(matches!(
            tin.run_lod_budgets(&[0, 4], &options),
            Err(TinError::BudgetsNotAscending { .. })
        ));
        assert_eq!(tin.run_lod_budgets(&[], &options), Err(TinError::EmptySchedule));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let field = Heightfield::flat(300, 8, 0.0).unwrap();
        let mut tin = triangulator(&field, 0.0);
        assert_eq!(
            tin.run_lod(&[1.0], &LodOptions::default()),
            Err(TinError::GridTooLarge {
                width: 300,
                height: 8,
                max: MAX_PACKED_GRID
            })
        );
    }

    #[test]
    fn test_schedule_dispatch() {
        let field = hill(17);
        let options = LodOptions { boundary: BoundaryMode::Raw };
        let by_budget = triangulator(&field, 0.0)
            .run_schedule(&LodSchedule::Budgets(vec![8, 32]), &options)
            .unwrap();
        assert_eq!(by_budget.len(), 2);
        assert!(by_budget[0].num_triangles() <= 8 + 2);
        assert!(by_budget[1].num_triangles() <= 32 + 2);

        let schedule = LodSchedule::Errors(vec![5.0]);
        assert_eq!(schedule.len(), 1);
        assert!(!schedule.is_empty());
    }
}

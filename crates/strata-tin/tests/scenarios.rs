use glam::IVec2;
use strata_heightfield::{FbmParams, FbmSource, Heightfield, HeightOracle};
use strata_tin::{
    BoundaryConformer, BoundaryMode, LodOptions, LodSchedule, TinError, Triangulator,
    TriangulatorParams,
};

fn fbm_tile(size: u32, seed: u32) -> Heightfield {
    FbmSource::new(FbmParams {
        seed,
        base_frequency: 1.0 / 32.0,
        amplitude: 24.0,
        ..FbmParams::default()
    })
    .rasterize(size, size)
    .unwrap()
}

#[test]
fn test_flat_tile_is_two_triangles() {
    let field = Heightfield::flat(4, 4, 3.5).unwrap();
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    tin.run();
    assert_eq!(tin.num_triangles(), 2);
    assert_eq!(tin.error(), 0.0);
}

#[test]
fn test_single_spike_is_captured_exactly() {
    let spike = IVec2::new(8, 7);
    let field = Heightfield::from_fn(16, 16, |x, y| {
        if (x as i32, y as i32) == (spike.x, spike.y) {
            1.0
        } else {
            0.0
        }
    })
    .unwrap();
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    tin.run();

    assert!(tin.points().contains(&spike));
    assert_eq!(tin.error(), 0.0);
    assert!(tin.is_delaunay());
}

#[test]
fn test_fbm_tile_meets_error_floor() {
    let field = fbm_tile(65, 11);
    let mut tin = Triangulator::new(
        &field,
        TriangulatorParams {
            min_error: 0.5,
            ..TriangulatorParams::default()
        },
    );
    tin.run();
    assert!(tin.error() <= 0.5);
    assert!(tin.check_halfedges());

    // Every grid sample is within the floor of the interpolated surface.
    let points = tin.points();
    for [a, b, c] in tin.triangles() {
        let (_, error) = field.find_max_error_point([points[a], points[b], points[c]]);
        assert!(error <= 0.5, "triangle ({a}, {b}, {c}) has error {error}");
    }
}

#[test]
fn test_budget_levels_stay_within_one_insertion() {
    let field = fbm_tile(129, 3);
    let budgets = [16, 64, 256, 1024];
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    let levels = tin
        .run_lod_budgets(&budgets, &LodOptions { boundary: BoundaryMode::Raw })
        .unwrap();

    for (level, budget) in levels.iter().zip(budgets) {
        assert!(
            level.num_triangles() >= budget || level.max_error == 0.0,
            "stopped early at {} of {budget}",
            level.num_triangles()
        );
        assert!(level.num_triangles() <= budget + 2);
    }
}

#[test]
fn test_level_zero_is_coarsest() {
    let field = fbm_tile(65, 5);
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    let levels = tin
        .run_schedule(&LodSchedule::Errors(vec![8.0, 2.0, 0.5]), &LodOptions::default())
        .unwrap();

    let counts: Vec<usize> = levels.iter().map(|l| l.num_triangles()).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    assert!(levels.iter().all(|l| l.packed_points().is_ok()));
}

#[test]
fn test_coarse_level_conforms_to_fine_boundary() {
    let field = fbm_tile(65, 9);
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    let mut levels = tin
        .run_lod(&[6.0, 0.5], &LodOptions { boundary: BoundaryMode::Raw })
        .unwrap();
    let fine: Vec<IVec2> = levels[1].boundary_points().collect();

    let coarse = &mut levels[0];
    let area = coarse.area();
    BoundaryConformer::cutter(coarse.size, |p| fine.contains(&p)).conform(coarse);

    let mut coarse_boundary: Vec<IVec2> = coarse.boundary_points().collect();
    let mut fine_boundary = fine.clone();
    coarse_boundary.sort_by_key(|p| (p.x, p.y));
    fine_boundary.sort_by_key(|p| (p.x, p.y));
    assert_eq!(coarse_boundary, fine_boundary);
    assert_eq!(coarse.area(), area);
}

#[test]
fn test_bad_schedules_are_reported() {
    let field = Heightfield::flat(8, 8, 0.0).unwrap();
    let mut tin = Triangulator::new(
        &field,
        TriangulatorParams {
            min_error: 2.0,
            ..TriangulatorParams::default()
        },
    );
    let options = LodOptions::default();
    assert!(matches!(
        tin.run_lod(&[4.0, 1.0], &options),
        Err(TinError::ThresholdBelowFloor { .. })
    ));
    assert!(matches!(
        tin.run_lod(&[3.0, 5.0], &options),
        Err(TinError::ThresholdsNotDescending { .. })
    ));
    assert!(matches!(
        tin.run_schedule(&LodSchedule::Budgets(vec![]), &options),
        Err(TinError::EmptySchedule)
    ));
}

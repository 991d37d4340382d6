use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use strata_heightfield::{FbmParams, FbmSource, Heightfield};
use strata_tin::{BoundaryConformer, BoundaryMode, LodOptions, Triangulator, TriangulatorParams};

fn terrain(size: u32) -> Heightfield {
    FbmSource::new(FbmParams {
        seed: 42,
        base_frequency: 1.0 / 64.0,
        ..FbmParams::default()
    })
    .rasterize(size, size)
    .unwrap()
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate_run");
    for size in [65, 129, 256] {
        let field = terrain(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &field, |bencher, field| {
            bencher.iter(|| {
                let mut tin = Triangulator::new(
                    field,
                    TriangulatorParams {
                        min_error: 0.5,
                        ..TriangulatorParams::default()
                    },
                );
                tin.run();
                black_box(tin.num_triangles())
            })
        });
    }
    group.finish();
}

fn bench_lod_chain(c: &mut Criterion) {
    let field = terrain(256);
    let thresholds = [16.0, 8.0, 4.0, 2.0, 1.0];
    c.bench_function("run_lod_256_stitched", |bencher| {
        bencher.iter(|| {
            let mut tin = Triangulator::new(&field, TriangulatorParams::default());
            black_box(tin.run_lod(&thresholds, &LodOptions::default()).unwrap())
        })
    });
}

fn bench_stitch(c: &mut Criterion) {
    let field = terrain(256);
    let mut tin = Triangulator::new(&field, TriangulatorParams::default());
    let levels = tin
        .run_lod(&[8.0], &LodOptions { boundary: BoundaryMode::Raw })
        .unwrap();
    c.bench_function("stitch_256", |bencher| {
        bencher.iter(|| {
            let mut mesh = levels[0].clone();
            black_box(BoundaryConformer::stitcher(mesh.size).conform(&mut mesh))
        })
    });
}

criterion_group!(benches, bench_run, bench_lod_chain, bench_stitch);
criterion_main!(benches);

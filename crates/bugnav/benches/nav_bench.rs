//! Criterion benchmarks for the kernel queries and full runs.
//! Fields come from `scenario::rand` with fixed replay tokens.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p bugnav

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use bugnav::config::{NavConfig, PolicyKind};
use bugnav::driver::{drive, Path};
use bugnav::scenario::rand::{draw_field, FieldCfg, ReplayToken};
use bugnav::scenario::Scenario;
use bugnav::sensor;

fn field(count: usize, index: u64) -> Scenario {
    let cfg = FieldCfg {
        obstacle_count: count,
        ..FieldCfg::default()
    };
    match draw_field(&cfg, &NavConfig::default(), ReplayToken::new(2024, index)) {
        Ok(s) => s,
        Err(e) => panic!("field draw failed: {e}"),
    }
}

fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel");
    for &n in &[1usize, 6, 20] {
        let set = match field(n, 1).obstacle_set() {
            Ok(set) => set,
            Err(e) => panic!("{e}"),
        };
        let mut rng = StdRng::seed_from_u64(43);
        let pts: Vec<Vector2<f64>> = (0..256)
            .map(|_| Vector2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0)))
            .collect();

        group.bench_with_input(BenchmarkId::new("line_of_sight", n), &n, |b, _| {
            b.iter(|| {
                pts.windows(2)
                    .filter(|w| set.line_of_sight(w[0], w[1]))
                    .count()
            })
        });

        group.bench_with_input(BenchmarkId::new("scan", n), &n, |b, _| {
            let cfg = NavConfig::default().sensor;
            b.iter(|| sensor::scan(black_box(pts[0]), &set, &cfg))
        });
    }
    group.finish();
}

fn bench_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("drive");
    group.sample_size(20);
    let scenario = field(6, 7);
    for kind in PolicyKind::ALL {
        group.bench_with_input(BenchmarkId::new("policy", kind), &kind, |b, &kind| {
            b.iter_batched(
                || scenario.session_with_policy(kind),
                |session| {
                    if let Ok(mut session) = session {
                        let _summary = drive(&mut session, &mut Path::new(), 20_000);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kernel, bench_runs);
criterion_main!(benches);

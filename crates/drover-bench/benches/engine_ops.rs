//! Criterion benchmarks for full planner and peeling runs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drover_bench::{reference_profile, scaled_profile};
use drover_core::Shape;
use drover_peel::{PeelConfig, PeelRun};
use drover_planner::{plan_group, GroupSession, PlannerConfig};
use drover_test_utils::positions;

fn bench_plan_reference(c: &mut Criterion) {
    let (grid, roster) = reference_profile(Shape::Diamond).unwrap();
    let starts = positions(&roster);
    let config = PlannerConfig::default();
    c.bench_function("plan_group_reference", |b| {
        b.iter(|| black_box(plan_group(&grid, &starts, &config).unwrap()));
    });
}

fn bench_session_reference(c: &mut Criterion) {
    let (grid, roster) = reference_profile(Shape::Diamond).unwrap();
    c.bench_function("group_run_reference", |b| {
        b.iter(|| {
            let mut session =
                GroupSession::new(grid.clone(), &roster, PlannerConfig::default()).unwrap();
            black_box(session.run(40))
        });
    });
}

fn bench_peel_reference(c: &mut Criterion) {
    let (grid, roster) = reference_profile(Shape::Diamond).unwrap();
    c.bench_function("peel_run_reference", |b| {
        b.iter(|| {
            let mut run = PeelRun::new(grid.clone(), &roster, PeelConfig::default()).unwrap();
            black_box(run.run())
        });
    });
}

fn bench_peel_scaled(c: &mut Criterion) {
    let (grid, roster) = scaled_profile(20).unwrap();
    let mut group = c.benchmark_group("scaled_20x20");
    group.sample_size(10);
    group.bench_function("peel_run", |b| {
        b.iter(|| {
            let mut run = PeelRun::new(grid.clone(), &roster, PeelConfig::default()).unwrap();
            black_box(run.run())
        });
    });
    group.bench_function("group_run", |b| {
        b.iter(|| {
            let mut session =
                GroupSession::new(grid.clone(), &roster, PlannerConfig::default()).unwrap();
            black_box(session.run(80))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_reference,
    bench_session_reference,
    bench_peel_reference,
    bench_peel_scaled
);
criterion_main!(benches);

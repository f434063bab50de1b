//! Criterion benchmarks for the single-agent searches and the assignment solver.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drover_assign::{assign, solve, CostMatrix, UNREACHABLE_COST};
use drover_core::{Cell, GridSpec, Shape};
use drover_path::{Reservations, SpatialSearch, TimedSearch};
use drover_space::Square8;
use drover_test_utils::{positions, reference_grid, reference_roster};

fn walled_grid() -> GridSpec {
    // Walls every fourth column, gaps alternating between the two ends.
    let barriers = (2..30)
        .step_by(4)
        .flat_map(|x| (0..28).map(move |y| Cell::new(x, if x % 8 == 2 { y } else { y + 4 })));
    GridSpec::new(32).unwrap().with_barriers(barriers).unwrap()
}

fn bench_spatial(c: &mut Criterion) {
    let grid = walled_grid();
    let search = SpatialSearch::new(Square8::of(&grid), &grid);
    c.bench_function("spatial_32x32_comb", |b| {
        b.iter(|| black_box(search.plan(Cell::new(0, 0), Cell::new(31, 31))));
    });
}

fn bench_timed(c: &mut Criterion) {
    let grid = walled_grid();
    let search = TimedSearch::new(Square8::of(&grid), &grid);
    let mut reserved = Reservations::new();
    for t in 0..40 {
        reserved.reserve(Cell::new(1, t as i32 % 32), t);
    }
    c.bench_function("timed_32x32_comb", |b| {
        b.iter(|| black_box(search.plan(Cell::new(0, 0), Cell::new(31, 31), 0, &reserved)));
    });
}

fn bench_hungarian(c: &mut Criterion) {
    let n = 64;
    let rows: Vec<Vec<i64>> = (0..n)
        .map(|r| (0..n).map(|col| ((r * 31 + col * 17) % 97) as i64).collect())
        .collect();
    let matrix = CostMatrix::from_rows(&rows).unwrap();
    c.bench_function("hungarian_64", |b| {
        b.iter(|| black_box(solve(&matrix).unwrap()));
    });
}

fn bench_reference_assignment(c: &mut Criterion) {
    let grid = reference_grid(Shape::Diamond);
    let starts = positions(&reference_roster());
    c.bench_function("assign_reference_diamond", |b| {
        b.iter(|| black_box(assign(&grid, &starts, UNREACHABLE_COST).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_spatial,
    bench_timed,
    bench_hungarian,
    bench_reference_assignment
);
criterion_main!(benches);

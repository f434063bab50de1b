//! Run both engines on the reference scenario and print the grid.
//!
//! Set `RUST_LOG=debug` to watch individual waits, cascades, and replans.

use drover_bench::{reference_profile, render};
use drover_core::Shape;
use drover_peel::{PeelConfig, PeelRun};
use drover_planner::{GroupSession, PlannerConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (grid, roster) = reference_profile(Shape::Diamond).unwrap();
    println!("=== Drover demo: 20 agents onto the diamond ===\n");
    println!("start:\n{}", render(&grid, roster.iter().map(|a| (&a.id, &a.position))));

    // --- Group planner ---
    let mut session = GroupSession::new(grid.clone(), &roster, PlannerConfig::default()).unwrap();
    let outcome = session.run(40);
    println!(
        "group planner: complete={} after {} ticks, {} replans",
        outcome.complete, outcome.ticks, outcome.replans
    );
    println!("{}", render(&grid, session.positions()));

    // --- Parallel peeling ---
    let mut run = PeelRun::new(grid.clone(), &roster, PeelConfig::default()).unwrap();
    let peel = run.run();
    println!(
        "peeling: converged={} after {} ticks, {} locked",
        peel.converged, peel.ticks, peel.locked
    );
    println!("{}", render(&grid, run.positions()));

    for (tick, state) in run.history().frames().iter().enumerate().step_by(5) {
        println!(
            "  tick {:>3}: chain={:>2} peeled={:>2} locked={:>2}",
            tick,
            state.chain().len(),
            state.peeled().len(),
            state.locked().len()
        );
    }
}

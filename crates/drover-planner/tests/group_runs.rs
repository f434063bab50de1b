use std::collections::HashSet;

use drover_core::{AgentId, Cell, GridSpec, Shape};
use drover_planner::{GroupSession, GroupState, Phase, PlannerConfig};
use drover_test_utils::{random_scenario, reference_grid, reference_roster};
use proptest::prelude::*;

fn distinct(positions: &indexmap::IndexMap<AgentId, Cell>) -> bool {
    let cells: HashSet<Cell> = positions.values().copied().collect();
    cells.len() == positions.len()
}

#[test]
fn reference_diamond_completes_within_cap() {
    let grid = reference_grid(Shape::Diamond);
    let mut session =
        GroupSession::new(grid.clone(), &reference_roster(), PlannerConfig::default()).unwrap();
    let outcome = session.run(40);
    assert!(outcome.complete, "not complete after {} ticks", outcome.ticks);

    let cells: HashSet<Cell> = session.positions().values().copied().collect();
    assert_eq!(cells.len(), 20);
    assert!(cells.iter().all(|&c| grid.is_destination(c)));
}

#[test]
fn every_recorded_state_is_collision_free() {
    let grid = reference_grid(Shape::Rectangle);
    let mut session =
        GroupSession::new(grid, &reference_roster(), PlannerConfig::default()).unwrap();
    session.run(40);
    for state in session.history().frames() {
        assert!(distinct(state.positions()), "collision at tick {}", state.tick_id());
    }
}

#[test]
fn new_barriers_trigger_replan_and_progress_resumes() {
    let open = GridSpec::new(6)
        .unwrap()
        .with_destinations([Cell::new(5, 0), Cell::new(5, 5)])
        .unwrap();
    let roster = [
        drover_core::Agent::new(0, (0, 0)),
        drover_core::Agent::new(1, (0, 5)),
    ];
    let config = PlannerConfig::default();
    let (state, _) = GroupState::new(&open, &roster)
        .unwrap()
        .replan(&open, &config)
        .unwrap();

    // Wall off every agent's next planned cell.
    let walls: Vec<Cell> = state
        .plans()
        .values()
        .filter_map(|plan| plan.next_cell())
        .collect();
    let blocked = GridSpec::new(6)
        .unwrap()
        .with_barriers(walls.iter().copied())
        .unwrap()
        .with_destinations(open.destinations().iter().copied())
        .unwrap();

    let (after, report) = state.tick(&blocked, &config);
    assert!(report.moved.is_empty());
    assert!(report.stalled);
    assert!(report.replanned);
    assert_eq!(after.replans(), 1);
    assert_eq!(after.stall_count(), 0);
    assert_eq!(after.phase(), Phase::Executing);
    for plan in after.plans().values() {
        let next = plan.next_cell().unwrap();
        assert!(!blocked.is_barrier(next));
    }

    let (resumed, report) = after.tick(&blocked, &config);
    assert!(!report.moved.is_empty());
    assert_ne!(resumed.positions(), after.positions());

    let mut current = resumed;
    for _ in 0..20 {
        if current.phase() == Phase::Complete {
            break;
        }
        current = current.tick(&blocked, &config).0;
    }
    assert_eq!(current.phase(), Phase::Complete);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn positions_never_collide(seed in 0u64..1000, agents in 1usize..=6, barriers in 0usize..10) {
        let scenario = random_scenario(seed, 7, agents, barriers);
        let mut session = GroupSession::new(
            scenario.grid.clone(),
            &scenario.roster,
            PlannerConfig::default(),
        ).unwrap();
        for _ in 0..30 {
            session.step();
            let positions = session.positions();
            prop_assert!(distinct(positions));
            for &cell in positions.values() {
                prop_assert!(scenario.grid.is_open(cell));
            }
        }
    }
}

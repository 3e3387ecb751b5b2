use pipeflow_core::{Cell, TerminationKind};
use pipeflow_system_generation::generate;
use pipeflow_world::Grid;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn same_seed_generates_the_same_board() {
    let first = generate(8, 8, 10, &mut ChaCha8Rng::seed_from_u64(1234)).expect("generate");
    let second = generate(8, 8, 10, &mut ChaCha8Rng::seed_from_u64(1234)).expect("generate");
    assert_eq!(first, second);
}

#[test]
fn generated_board_has_walls_and_an_interior_source() {
    let level = generate(4, 6, 3, &mut ChaCha8Rng::seed_from_u64(77)).expect("generate");
    assert_eq!((level.rows, level.cols, level.delay), (6, 8, 3));
    assert!(level.pipes.is_none());

    let grid = Grid::from_level(&level).expect("generated level is well formed");
    let source = grid.source().coord();
    let sink = grid.sink().coord();
    assert!(!grid.is_border(source), "source {source} must be interior");
    assert!(grid.is_border(sink), "sink {sink} must replace a wall");

    let walls_on_border = level
        .cells
        .iter()
        .flatten()
        .filter(|cell| grid.is_border(cell.coord()))
        .all(|cell| matches!(cell, Cell::Wall { .. }) || cell.coord() == sink);
    assert!(walls_on_border, "border must be walls apart from the sink");

    let terminations: Vec<TerminationKind> = level
        .cells
        .iter()
        .flatten()
        .filter_map(|cell| cell.termination().map(|(_, kind)| kind))
        .collect();
    assert_eq!(terminations.len(), 2);
}

proptest! {
    #[test]
    fn generation_terminates_with_a_reachable_board(
        seed in any::<u64>(),
        rows in 2_u32..10,
        cols in 2_u32..10,
    ) {
        let level = generate(rows, cols, 5, &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("open interiors always admit a reachable layout");
        let grid = Grid::from_level(&level).expect("well formed");
        prop_assert!(grid.check_reachable());
    }
}

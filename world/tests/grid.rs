use pipeflow_core::{Cell, Coordinate, Direction, Pipe, PipeShape, PlacementError};
use pipeflow_world::{query, Grid};
use proptest::prelude::*;

fn walled(rows: u32, cols: u32) -> Vec<Vec<Cell>> {
    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let coord = Coordinate::new(row, col);
                    if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                        Cell::wall(coord)
                    } else {
                        Cell::empty(coord)
                    }
                })
                .collect()
        })
        .collect()
}

/// 5×5 board with a source at (1, 1) facing right and a sink at (3, 3)
/// facing down.
fn scenario_grid() -> Grid {
    let mut layout = walled(5, 5);
    layout[1][1] = Cell::source(Coordinate::new(1, 1), Direction::Right);
    layout[3][3] = Cell::sink(Coordinate::new(3, 3), Direction::Down);
    Grid::new(5, 5, layout).expect("scenario grid is well formed")
}

const WINNING_CHAIN: [(Coordinate, PipeShape); 3] = [
    (Coordinate::new(1, 2), PipeShape::Horizontal),
    (Coordinate::new(1, 3), PipeShape::BottomLeft),
    (Coordinate::new(2, 3), PipeShape::Vertical),
];

#[test]
fn check_path_flips_exactly_on_the_final_placement() {
    let mut grid = scenario_grid();
    assert!(grid.check_reachable(), "open interior must be reachable");

    for (step, (coord, shape)) in WINNING_CHAIN.into_iter().enumerate() {
        assert!(!grid.check_path(), "path reported complete before placement {step}");
        grid.place_pipe(coord, Pipe::new(shape)).expect("placement on empty cell succeeds");
    }

    assert!(grid.check_path(), "chain should connect source and sink");
}

#[test]
fn wrong_orientation_breaks_the_chain() {
    let mut grid = scenario_grid();
    grid.place_pipe(Coordinate::new(1, 2), Pipe::new(PipeShape::Horizontal)).expect("place");
    grid.place_pipe(Coordinate::new(1, 3), Pipe::new(PipeShape::TopLeft)).expect("place");
    grid.place_pipe(Coordinate::new(2, 3), Pipe::new(PipeShape::Vertical)).expect("place");

    assert!(!grid.check_path(), "elbow opening upwards cannot feed the sink");
}

#[test]
fn entering_the_sink_against_its_direction_does_not_win() {
    let mut layout = walled(5, 5);
    layout[1][1] = Cell::source(Coordinate::new(1, 1), Direction::Right);
    layout[1][3] = Cell::sink(Coordinate::new(1, 3), Direction::Down);
    let mut grid = Grid::new(5, 5, layout).expect("valid grid");

    grid.place_pipe(Coordinate::new(1, 2), Pipe::new(PipeShape::Horizontal)).expect("place");

    assert!(!grid.check_path(), "water travelling right must not enter a downward sink");
}

#[test]
fn cross_passes_straight_through_only() {
    let mut grid = scenario_grid();
    grid.place_pipe(Coordinate::new(1, 2), Pipe::new(PipeShape::Horizontal)).expect("place");
    grid.place_pipe(Coordinate::new(1, 3), Pipe::new(PipeShape::Cross)).expect("place");
    grid.place_pipe(Coordinate::new(2, 3), Pipe::new(PipeShape::Vertical)).expect("place");

    assert!(!grid.check_path(), "a cross must not turn water downwards");
    assert_eq!(grid.flow_distance(Coordinate::new(1, 3)), Some(1));
    assert_eq!(grid.flow_distance(Coordinate::new(2, 3)), None);
}

#[test]
fn placement_rejections_leave_the_grid_untouched() {
    let mut grid = scenario_grid();
    let before = query::layout(&grid);

    assert_eq!(
        grid.place_pipe(Coordinate::new(0, 0), Pipe::new(PipeShape::Vertical)),
        Err(PlacementError::NotFillable)
    );
    assert_eq!(
        grid.place_pipe(Coordinate::new(1, 1), Pipe::new(PipeShape::Vertical)),
        Err(PlacementError::NotFillable)
    );
    assert_eq!(query::layout(&grid), before);

    grid.place_pipe(Coordinate::new(2, 2), Pipe::new(PipeShape::Vertical)).expect("place");
    assert_eq!(
        grid.place_pipe(Coordinate::new(2, 2), Pipe::new(PipeShape::Horizontal)),
        Err(PlacementError::Occupied)
    );
    assert_eq!(
        grid[Coordinate::new(2, 2)].pipe().map(Pipe::shape),
        Some(PipeShape::Vertical)
    );
}

#[test]
fn flow_fills_one_distance_at_a_time_and_undo_respects_water() {
    let mut grid = scenario_grid();
    for (coord, shape) in WINNING_CHAIN {
        grid.place_pipe(coord, Pipe::new(shape)).expect("place");
    }

    assert_eq!(grid.fill_tiles(0), 1);
    assert_eq!(query::filled_pipes(&grid), vec![Coordinate::new(1, 2)]);

    assert_eq!(grid.undo(Coordinate::new(1, 2)), None, "filled pipe stays");
    assert_eq!(
        grid.undo(Coordinate::new(2, 3)),
        Some(Pipe::new(PipeShape::Vertical)),
        "unfilled pipe can be removed"
    );
    assert!(grid.accepts_pipe(Coordinate::new(2, 3)));
}

#[test]
fn flow_into_a_gap_is_a_loss() {
    let mut grid = scenario_grid();
    grid.place_pipe(Coordinate::new(1, 2), Pipe::new(PipeShape::Horizontal)).expect("place");

    assert_eq!(grid.fill_tiles(0), 1);
    assert!(!grid.has_lost(), "water is still inside the first pipe");

    assert_eq!(grid.fill_tiles(1), 0);
    assert!(grid.has_lost(), "no pipe at distance 1 means the flow stalled");
    assert_eq!(grid.frontier(), Some(1));
}

#[test]
fn fill_all_fills_the_winning_path() {
    let mut grid = scenario_grid();
    for (coord, shape) in WINNING_CHAIN {
        grid.place_pipe(coord, Pipe::new(shape)).expect("place");
    }
    grid.place_pipe(Coordinate::new(3, 1), Pipe::new(PipeShape::Cross)).expect("place");

    assert_eq!(grid.fill_all(), 3);
    assert_eq!(query::filled_pipes(&grid).len(), 3);
    assert!(
        !grid[Coordinate::new(3, 1)].pipe().is_some_and(|pipe| pipe.is_filled()),
        "disconnected pipe stays dry"
    );
}

#[test]
fn walls_can_seal_off_the_source() {
    let mut layout = walled(5, 5);
    layout[1][1] = Cell::source(Coordinate::new(1, 1), Direction::Right);
    layout[3][3] = Cell::sink(Coordinate::new(3, 3), Direction::Down);
    layout[1][2] = Cell::wall(Coordinate::new(1, 2));
    let grid = Grid::new(5, 5, layout).expect("structurally valid");

    assert!(!grid.check_reachable());
}

#[test]
fn terminations_do_not_block_reachability() {
    let mut layout = walled(5, 5);
    layout[2][2] = Cell::source(Coordinate::new(2, 2), Direction::Right);
    layout[4][1] = Cell::sink(Coordinate::new(4, 1), Direction::Down);
    for (row, col) in [(1, 2), (1, 3), (3, 2), (3, 3)] {
        layout[row][col] = Cell::wall(Coordinate::new(row as u32, col as u32));
    }
    let grid = Grid::new(5, 5, layout).expect("structurally valid");

    assert!(grid.check_reachable(), "the only route runs back through the source cell");
}

#[test]
fn water_looping_back_through_a_cross_keeps_flowing() {
    let mut layout = walled(7, 7);
    layout[3][1] = Cell::source(Coordinate::new(3, 1), Direction::Right);
    layout[6][5] = Cell::sink(Coordinate::new(6, 5), Direction::Down);
    let mut grid = Grid::new(7, 7, layout).expect("structurally valid");

    let chain = [
        (Coordinate::new(3, 2), PipeShape::Horizontal),
        (Coordinate::new(3, 3), PipeShape::Cross),
        (Coordinate::new(3, 4), PipeShape::TopLeft),
        (Coordinate::new(2, 4), PipeShape::BottomLeft),
        (Coordinate::new(2, 3), PipeShape::BottomRight),
        (Coordinate::new(4, 3), PipeShape::Vertical),
    ];
    for (coord, shape) in chain {
        grid.place_pipe(coord, Pipe::new(shape)).expect("place");
    }

    assert_eq!(grid.flow_distance(Coordinate::new(3, 3)), Some(1));
    assert_eq!(grid.flow_distance(Coordinate::new(4, 3)), Some(6));

    for distance in 0..=6 {
        assert_eq!(grid.fill_tiles(distance), 1, "one pipe at distance {distance}");
        assert!(!grid.has_lost(), "flow stalled early at distance {distance}");
    }
    assert!(grid[Coordinate::new(4, 3)].pipe().is_some_and(|pipe| pipe.is_filled()));

    assert_eq!(grid.fill_tiles(7), 0);
    assert!(grid.has_lost(), "water spills past the vertical pipe");
}

fn interior() -> impl Strategy<Value = Coordinate> {
    (1_u32..4, 1_u32..4).prop_map(|(row, col)| Coordinate::new(row, col))
}

fn shape() -> impl Strategy<Value = PipeShape> {
    prop_oneof![
        Just(PipeShape::Horizontal),
        Just(PipeShape::Vertical),
        Just(PipeShape::TopLeft),
        Just(PipeShape::TopRight),
        Just(PipeShape::BottomLeft),
        Just(PipeShape::BottomRight),
        Just(PipeShape::Cross),
    ]
}

proptest! {
    #[test]
    fn fill_tiles_is_idempotent(
        placements in prop::collection::vec((interior(), shape()), 0..9),
        distance in 0_u32..6,
    ) {
        let mut grid = scenario_grid();
        for (coord, shape) in placements {
            let _ = grid.place_pipe(coord, Pipe::new(shape));
        }

        let first = grid.fill_tiles(distance);
        let once = query::layout(&grid);
        let second = grid.fill_tiles(distance);

        prop_assert_eq!(first, second);
        prop_assert_eq!(query::layout(&grid), once);
    }
}

#[test]
fn query_views_follow_placements() {
    let mut grid = scenario_grid();
    assert_eq!(query::pipe_count(&grid), 0);
    grid.place_pipe(Coordinate::new(2, 2), Pipe::new(PipeShape::Cross)).expect("place");
    assert_eq!(query::pipe_count(&grid), 1);

    let images = query::images(&grid);
    assert_eq!(images.len(), 25);
    assert_eq!(images[2 * 5 + 2], Pipe::new(PipeShape::Cross).image());
    assert_eq!(images[0], grid[Coordinate::new(0, 0)].image());
}

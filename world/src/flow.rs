//! Breadth-first fields traced across the grid by the world crate.

use std::collections::VecDeque;

use pipeflow_core::{Cell, Direction};

use crate::Grid;

/// Sentinel for a search state water never reaches.
const UNREACHED: u32 = u32::MAX;

/// Flow distances from the source along correctly connected pipes.
///
/// Each search state is a cell together with the side water entered through,
/// and every state keeps its own distance. A cross crossed horizontally and
/// later vertically therefore sits at two distances.
#[derive(Clone, Debug)]
pub(crate) struct FlowField {
    distances: Vec<[u32; 4]>,
    connected: bool,
}

impl FlowField {
    /// Traces water from the source through the currently placed pipes.
    pub(crate) fn trace(grid: &Grid) -> Self {
        let mut distances = vec![[UNREACHED; 4]; grid.cell_count()];
        let mut connected = false;
        let mut queue = VecDeque::new();

        let source = grid.source();
        let sink = grid.sink();

        if let Some(first) = grid.neighbor(source.coord(), source.direction()) {
            queue.push_back((first, source.direction().opposite(), 0_u32));
        }

        while let Some((coord, entry, distance)) = queue.pop_front() {
            let index = grid.offset(coord);
            let slot = side_slot(entry);
            if distances[index][slot] != UNREACHED {
                continue;
            }

            let Cell::Fillable {
                pipe: Some(pipe), ..
            } = grid[coord]
            else {
                continue;
            };
            let Some(exit) = pipe.shape().exit_for(entry) else {
                continue;
            };
            distances[index][slot] = distance;

            let Some(next) = grid.neighbor(coord, exit) else {
                continue;
            };
            if next == sink.coord() {
                if exit == sink.direction() {
                    connected = true;
                }
                continue;
            }

            queue.push_back((next, exit.opposite(), distance.saturating_add(1)));
        }

        Self {
            distances,
            connected,
        }
    }

    /// Whether water can travel from the source into the sink.
    #[must_use]
    pub(crate) fn connected(&self) -> bool {
        self.connected
    }

    /// Shortest distance recorded for the cell at a row-major index, if water
    /// reaches it.
    #[must_use]
    pub(crate) fn distance(&self, index: usize) -> Option<u32> {
        self.distances
            .get(index)
            .and_then(|states| states.iter().copied().min())
            .filter(|distance| *distance != UNREACHED)
    }

    /// Row-major indices of the pipes water passes through at exactly
    /// `distance`, each listed once.
    pub(crate) fn at(&self, distance: u32) -> impl Iterator<Item = usize> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter(move |(_, states)| states.contains(&distance))
            .map(|(index, _)| index)
    }

    /// Row-major indices of every pipe water can reach.
    pub(crate) fn reached(&self) -> impl Iterator<Item = usize> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, states)| states.iter().any(|reached| *reached != UNREACHED))
            .map(|(index, _)| index)
    }
}

/// Tests whether walls seal the source off from the sink.
///
/// Pipe shapes are ignored: every cell other than a wall is open ground,
/// terminations included. The search starts beside the source in its facing
/// direction and succeeds once it reaches the cell that feeds the sink.
pub(crate) fn reachable(grid: &Grid) -> bool {
    let source = grid.source();
    let sink = grid.sink();

    let Some(start) = grid.neighbor(source.coord(), source.direction()) else {
        return false;
    };
    let Some(goal) = grid.neighbor(sink.coord(), sink.direction().opposite()) else {
        return false;
    };
    if is_wall(&grid[start]) || is_wall(&grid[goal]) {
        return false;
    }

    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();
    visited[grid.offset(start)] = true;
    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        if coord == goal {
            return true;
        }

        for direction in Direction::ALL {
            let Some(next) = grid.neighbor(coord, direction) else {
                continue;
            };
            let index = grid.offset(next);
            if visited[index] || is_wall(&grid[next]) {
                continue;
            }
            visited[index] = true;
            queue.push_back(next);
        }
    }

    false
}

const fn is_wall(cell: &Cell) -> bool {
    matches!(cell, Cell::Wall { .. })
}

const fn side_slot(side: Direction) -> usize {
    match side {
        Direction::Up => 0,
        Direction::Right => 1,
        Direction::Down => 2,
        Direction::Left => 3,
    }
}

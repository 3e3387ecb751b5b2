#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for Pipeflow.
//!
//! The [`Grid`] owns every cell in a dense row-major arena and answers the
//! connectivity questions the session asks: whether walls seal the source
//! off, whether placed pipes connect the source to the sink, and how far
//! water has travelled. Coordinates outside the grid are a programming error
//! and panic; every gameplay failure is reported as a value.

mod flow;

use std::ops::Index;

use pipeflow_core::{
    Cell, Coordinate, Direction, Level, LevelError, Pipe, PlacementError, TerminationKind,
};
use tracing::{debug, trace};

use crate::flow::FlowField;

/// Position and facing direction of a termination cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    coord: Coordinate,
    direction: Direction,
}

impl Endpoint {
    /// Creates a new endpoint description.
    #[must_use]
    pub const fn new(coord: Coordinate, direction: Direction) -> Self {
        Self { coord, direction }
    }

    /// Location of the termination cell.
    #[must_use]
    pub const fn coord(&self) -> Coordinate {
        self.coord
    }

    /// Side through which water leaves the source or enters the sink.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

/// Rectangular arena of cells with exactly one source and one sink.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
    source: Endpoint,
    sink: Endpoint,
    frontier: Option<u32>,
}

impl Grid {
    /// Builds a grid from a row-major layout.
    ///
    /// Refuses layouts whose shape disagrees with `rows` and `cols`, grids
    /// smaller than 2×2, cells that report a coordinate other than their
    /// position, and layouts without exactly one source and one sink.
    /// Reachability is a separate question answered by
    /// [`Grid::check_reachable`].
    pub fn new(rows: u32, cols: u32, layout: Vec<Vec<Cell>>) -> Result<Self, LevelError> {
        if rows < 2 || cols < 2 {
            return Err(LevelError::TooSmall { rows, cols });
        }
        if layout.len() != rows as usize {
            return Err(LevelError::RowCount {
                expected: rows,
                found: layout.len(),
            });
        }

        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        let mut source = None;
        let mut sink = None;

        for (row, line) in (0..rows).zip(layout) {
            if line.len() != cols as usize {
                return Err(LevelError::RowLength {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }

            for (col, cell) in (0..cols).zip(line) {
                let expected = Coordinate::new(row, col);
                if cell.coord() != expected {
                    return Err(LevelError::MisplacedCell {
                        expected,
                        found: cell.coord(),
                    });
                }

                match cell.termination() {
                    Some((direction, TerminationKind::Source)) => {
                        if source.is_some() {
                            return Err(LevelError::DuplicateSource(expected));
                        }
                        source = Some(Endpoint::new(expected, direction));
                    }
                    Some((direction, TerminationKind::Sink)) => {
                        if sink.is_some() {
                            return Err(LevelError::DuplicateSink(expected));
                        }
                        sink = Some(Endpoint::new(expected, direction));
                    }
                    None => {}
                }

                cells.push(cell);
            }
        }

        let source = source.ok_or(LevelError::MissingSource)?;
        let sink = sink.ok_or(LevelError::MissingSink)?;

        Ok(Self {
            rows,
            cols,
            cells,
            source,
            sink,
            frontier: None,
        })
    }

    /// Builds the grid described by a level.
    pub fn from_level(level: &Level) -> Result<Self, LevelError> {
        Self::new(level.rows, level.cols, level.cells.clone())
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Location and facing direction of the source.
    #[must_use]
    pub const fn source(&self) -> Endpoint {
        self.source
    }

    /// Location and facing direction of the sink.
    #[must_use]
    pub const fn sink(&self) -> Endpoint {
        self.sink
    }

    /// Whether `coord` names a cell of this grid.
    #[must_use]
    pub const fn contains(&self, coord: Coordinate) -> bool {
        coord.row() < self.rows && coord.col() < self.cols
    }

    /// Whether `coord` lies on the outermost ring of the grid.
    #[must_use]
    pub const fn is_border(&self, coord: Coordinate) -> bool {
        coord.row() == 0
            || coord.col() == 0
            || coord.row() + 1 == self.rows
            || coord.col() + 1 == self.cols
    }

    /// Greatest flow distance passed to [`Grid::fill_tiles`] so far.
    #[must_use]
    pub const fn frontier(&self) -> Option<u32> {
        self.frontier
    }

    /// Whether `coord` is an empty fillable cell.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid.
    #[must_use]
    pub fn accepts_pipe(&self, coord: Coordinate) -> bool {
        matches!(self[coord], Cell::Fillable { pipe: None, .. })
    }

    /// Stores `pipe` unfilled into the cell at `coord`.
    ///
    /// Walls, terminations and occupied cells are rejected without mutation.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid.
    pub fn place_pipe(&mut self, coord: Coordinate, pipe: Pipe) -> Result<(), PlacementError> {
        let index = self.offset(coord);
        self.cells[index].put_pipe(pipe)?;
        debug!(%coord, shape = ?pipe.shape(), "pipe placed");
        Ok(())
    }

    /// Clears the pipe at `coord` unless water already reached it, returning
    /// the removed pipe.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid.
    pub fn undo(&mut self, coord: Coordinate) -> Option<Pipe> {
        let index = self.offset(coord);
        let removed = self.cells[index].take_unfilled_pipe();
        if let Some(pipe) = removed {
            debug!(%coord, shape = ?pipe.shape(), "pipe removed");
        }
        removed
    }

    /// Whether walls leave a route between the source and the sink.
    ///
    /// Every cell other than a wall counts as passable, whatever pipe it holds.
    #[must_use]
    pub fn check_reachable(&self) -> bool {
        flow::reachable(self)
    }

    /// Whether placed pipes carry water from the source into the sink.
    #[must_use]
    pub fn check_path(&self) -> bool {
        FlowField::trace(self).connected()
    }

    /// Flow distance of the pipe at `coord`, if water can reach it.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid.
    #[must_use]
    pub fn flow_distance(&self, coord: Coordinate) -> Option<u32> {
        FlowField::trace(self).distance(self.offset(coord))
    }

    /// Fills every connected pipe lying exactly `distance` away from the
    /// source and returns how many pipes sit at that distance.
    ///
    /// Filling the same distance twice has no further effect.
    pub fn fill_tiles(&mut self, distance: u32) -> usize {
        let field = FlowField::trace(self);
        let mut at_distance = 0;
        for index in field.at(distance) {
            at_distance += 1;
            let _ = self.cells[index].fill_pipe();
        }

        self.frontier = Some(self.frontier.map_or(distance, |seen| seen.max(distance)));
        trace!(distance, at_distance, "flow advanced");
        at_distance
    }

    /// Fills every pipe water can reach and returns how many changed.
    pub fn fill_all(&mut self) -> usize {
        let field = FlowField::trace(self);
        let mut changed = 0;
        for index in field.reached() {
            if self.cells[index].fill_pipe() {
                changed += 1;
            }
        }
        debug!(changed, "filled reachable pipes");
        changed
    }

    /// Whether the flow stalled with no connection in place.
    ///
    /// True once water has started flowing, no pipe lies at the most recent
    /// flow distance, and the source is not connected to the sink.
    #[must_use]
    pub fn has_lost(&self) -> bool {
        let Some(frontier) = self.frontier else {
            return false;
        };
        let field = FlowField::trace(self);
        field.at(frontier).next().is_none() && !field.connected()
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Row-major offset of `coord`.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid.
    pub(crate) fn offset(&self, coord: Coordinate) -> usize {
        assert!(
            self.contains(coord),
            "coordinate {coord} lies outside the {}x{} grid",
            self.rows,
            self.cols
        );
        coord.row() as usize * self.cols as usize + coord.col() as usize
    }

    /// Neighbour of `coord` towards `direction`, if it lies inside the grid.
    pub(crate) fn neighbor(&self, coord: Coordinate, direction: Direction) -> Option<Coordinate> {
        coord
            .step(direction)
            .filter(|neighbor| self.contains(*neighbor))
    }
}

impl Index<Coordinate> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        &self.cells[self.offset(coord)]
    }
}

/// Query helpers that expose read-only views of the grid.
pub mod query {
    use pipeflow_core::{Cell, CellImage, Coordinate};

    use super::Grid;

    /// Iterates over the grid one row slice at a time.
    pub fn rows(grid: &Grid) -> impl Iterator<Item = &[Cell]> {
        grid.cells.chunks(grid.cols as usize)
    }

    /// Copies the grid back into the nested layout used by level data.
    #[must_use]
    pub fn layout(grid: &Grid) -> Vec<Vec<Cell>> {
        rows(grid).map(<[Cell]>::to_vec).collect()
    }

    /// Image descriptors for every cell in row-major order.
    #[must_use]
    pub fn images(grid: &Grid) -> Vec<CellImage> {
        grid.cells.iter().map(Cell::image).collect()
    }

    /// Coordinates of every pipe water has already filled.
    #[must_use]
    pub fn filled_pipes(grid: &Grid) -> Vec<Coordinate> {
        grid.cells
            .iter()
            .filter(|cell| cell.pipe().is_some_and(|pipe| pipe.is_filled()))
            .map(Cell::coord)
            .collect()
    }

    /// Number of pipes currently placed on the grid.
    #[must_use]
    pub fn pipe_count(grid: &Grid) -> usize {
        grid.cells.iter().filter(|cell| cell.pipe().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;
    use pipeflow_core::{Cell, Coordinate, Direction, LevelError, Pipe, PipeShape};

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

    fn straight_corridor() -> Grid {
        let mut layout = walled(3, 5);
        layout[1][0] = Cell::sink(Coordinate::new(1, 0), Direction::Left);
        layout[1][3] = Cell::source(Coordinate::new(1, 3), Direction::Left);
        Grid::new(3, 5, layout).expect("valid corridor")
    }

    #[test]
    fn new_rejects_missing_and_duplicate_terminations() {
        assert_eq!(
            Grid::new(3, 3, walled(3, 3)).err(),
            Some(LevelError::MissingSource)
        );

        let mut layout = walled(4, 4);
        layout[1][1] = Cell::source(Coordinate::new(1, 1), Direction::Down);
        layout[2][2] = Cell::source(Coordinate::new(2, 2), Direction::Up);
        assert_eq!(
            Grid::new(4, 4, layout).err(),
            Some(LevelError::DuplicateSource(Coordinate::new(2, 2)))
        );
    }

    #[test]
    fn new_rejects_misplaced_cells_and_ragged_rows() {
        let mut layout = walled(3, 3);
        layout[1][1] = Cell::empty(Coordinate::new(0, 0));
        assert!(matches!(
            Grid::new(3, 3, layout),
            Err(LevelError::MisplacedCell { .. })
        ));

        let mut ragged = walled(3, 3);
        let _ = ragged[2].pop();
        assert_eq!(
            Grid::new(3, 3, ragged).err(),
            Some(LevelError::RowLength {
                row: 2,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn single_pipe_connects_adjacent_terminations() {
        let mut grid = straight_corridor();
        let middle = Coordinate::new(1, 2);
        assert!(!grid.check_path());
        assert!(grid.place_pipe(middle, Pipe::new(PipeShape::Horizontal)).is_ok());
        assert!(!grid.check_path(), "gap at (1, 1) must keep the path open");
        assert!(grid
            .place_pipe(Coordinate::new(1, 1), Pipe::new(PipeShape::Horizontal))
            .is_ok());
        assert!(grid.check_path());
        assert_eq!(grid.flow_distance(middle), Some(0));
        assert_eq!(grid.flow_distance(Coordinate::new(1, 1)), Some(1));
    }

    #[test]
    fn has_lost_waits_for_flow_to_start() {
        let mut grid = straight_corridor();
        assert!(!grid.has_lost());
        assert_eq!(grid.fill_tiles(0), 0);
        assert!(grid.has_lost());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_coordinates_panic() {
        let grid = straight_corridor();
        let _ = grid.accepts_pipe(Coordinate::new(9, 9));
    }
}

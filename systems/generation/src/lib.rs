#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random board generation.
//!
//! A generated board is an open interior of fillable cells inside a wall
//! ring. The source sits on an interior cell facing a random direction and
//! the sink replaces a non-corner wall facing outwards. Placements are
//! rerolled until walls no longer seal the source off from the sink.

use pipeflow_core::{Cell, Coordinate, Direction, Level, LevelError};
use pipeflow_world::Grid;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

/// Attempts made before generation gives up.
pub const MAX_ATTEMPTS: u32 = 1_024;

/// Reasons a board cannot be generated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The requested interior is smaller than 2×2.
    #[error("interior must be at least 2x2, got {rows}x{cols}")]
    TooSmall {
        /// Requested interior rows.
        rows: u32,
        /// Requested interior columns.
        cols: u32,
    },
    /// No reachable layout was found within [`MAX_ATTEMPTS`] rolls.
    #[error("no reachable layout found after {attempts} attempts")]
    Exhausted {
        /// Number of layouts tried.
        attempts: u32,
    },
    /// A rolled layout was structurally invalid.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Generates a board with an interior of `rows × cols` fillable cells.
///
/// The returned level is two cells larger in each dimension because of the
/// wall ring, carries `delay` and leaves the pipe queue to self-generate.
pub fn generate<R>(
    rows: u32,
    cols: u32,
    delay: u32,
    rng: &mut R,
) -> Result<Level, GenerationError>
where
    R: Rng + ?Sized,
{
    if rows < 2 || cols < 2 {
        return Err(GenerationError::TooSmall { rows, cols });
    }

    let total_rows = rows + 2;
    let total_cols = cols + 2;

    for attempt in 1..=MAX_ATTEMPTS {
        let source = Coordinate::new(rng.gen_range(1..=rows), rng.gen_range(1..=cols));
        let source_direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let (sink, sink_direction) = border_cell(total_rows, total_cols, rng);

        let mut cells = walled(total_rows, total_cols);
        cells[source.row() as usize][source.col() as usize] =
            Cell::source(source, source_direction);
        cells[sink.row() as usize][sink.col() as usize] = Cell::sink(sink, sink_direction);

        let grid = Grid::new(total_rows, total_cols, cells.clone())?;
        if !grid.check_reachable() {
            trace!(attempt, %source, %sink, "rerolling unreachable layout");
            continue;
        }

        debug!(attempt, rows, cols, %source, %sink, "board generated");
        return Ok(Level {
            rows: total_rows,
            cols: total_cols,
            delay,
            cells,
            pipes: None,
        });
    }

    Err(GenerationError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Picks a non-corner border cell and the direction pointing out of the grid.
fn border_cell<R>(total_rows: u32, total_cols: u32, rng: &mut R) -> (Coordinate, Direction)
where
    R: Rng + ?Sized,
{
    let side = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
    match side {
        Direction::Up => (Coordinate::new(0, rng.gen_range(1..total_cols - 1)), side),
        Direction::Down => (
            Coordinate::new(total_rows - 1, rng.gen_range(1..total_cols - 1)),
            side,
        ),
        Direction::Left => (Coordinate::new(rng.gen_range(1..total_rows - 1), 0), side),
        Direction::Right => (
            Coordinate::new(rng.gen_range(1..total_rows - 1), total_cols - 1),
            side,
        ),
    }
}

fn walled(total_rows: u32, total_cols: u32) -> Vec<Vec<Cell>> {
    (0..total_rows)
        .map(|row| {
            (0..total_cols)
                .map(|col| {
                    let coord = Coordinate::new(row, col);
                    let border =
                        row == 0 || col == 0 || row + 1 == total_rows || col + 1 == total_cols;
                    if border {
                        Cell::wall(coord)
                    } else {
                        Cell::empty(coord)
                    }
                })
                .collect()
        })
        .collect()
}

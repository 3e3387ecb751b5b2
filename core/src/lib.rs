#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pipeflow engine.
//!
//! This crate defines the value types every other crate speaks in: grid
//! coordinates, directions, pipe shapes, cells and the level description used
//! to construct a session. It also defines the message surface between the
//! session and its collaborators. Front ends submit [`Command`] values, the
//! session applies them to the authoritative grid and broadcasts [`Event`]
//! values to every subscribed handler.

mod cell;
mod handlers;
mod image;
mod pipe;

pub use cell::{Cell, TerminationKind};
pub use handlers::Handlers;
pub use image::{CellImage, ImageKind, PipeForm, Rotation};
pub use pipe::{Pipe, PipeShape};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    row: u32,
    col: u32,
}

impl Coordinate {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }

    /// Returns the neighbouring coordinate one step towards `direction`.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant. The
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row_delta, col_delta) = direction.delta();
        let row = self.row.checked_add_signed(row_delta)?;
        let col = self.col.checked_add_signed(col_delta)?;
        Some(Self { row, col })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Towards decreasing row indices.
    Up,
    /// Towards increasing row indices.
    Down,
    /// Towards decreasing column indices.
    Left,
    /// Towards increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in clockwise order starting from [`Direction::Up`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Offset applied to a coordinate when stepping once in this direction,
    /// expressed as `(row, col)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Clockwise rotation that turns an upward-facing image towards `self`.
    #[must_use]
    pub const fn rotation(self) -> Rotation {
        match self {
            Self::Up => Rotation::Deg0,
            Self::Right => Rotation::Deg90,
            Self::Down => Rotation::Deg180,
            Self::Left => Rotation::Deg270,
        }
    }

    /// Arrow glyph used for termination cells in the level text format.
    #[must_use]
    pub const fn arrow(self) -> char {
        match self {
            Self::Up => '^',
            Self::Down => 'v',
            Self::Left => '<',
            Self::Right => '>',
        }
    }

    /// Parses an arrow glyph produced by [`Direction::arrow`].
    #[must_use]
    pub const fn from_arrow(glyph: char) -> Option<Self> {
        match glyph {
            '^' => Some(Self::Up),
            'v' => Some(Self::Down),
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Everything required to construct a session from authored level data.
///
/// `rows` and `cols` include the perimeter walls. `pipes`, when present,
/// seeds the upcoming pipe queue in order; otherwise the queue generates its
/// contents randomly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Number of rows including the perimeter.
    pub rows: u32,
    /// Number of columns including the perimeter.
    pub cols: u32,
    /// Ticks that elapse before water starts to flow.
    pub delay: u32,
    /// Row-major cell layout, `rows` rows of `cols` cells each.
    pub cells: Vec<Vec<Cell>>,
    /// Optional initial queue contents.
    pub pipes: Option<Vec<Pipe>>,
}

/// Whether a placement should first spend the one-time cross replacement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Replacement {
    /// Place the head of the queue as dispensed.
    #[default]
    Keep,
    /// Turn the head of the queue into a cross before placing it, if the
    /// replacement is still available and the target accepts a pipe.
    Cross,
}

/// Commands that express every player-initiated session mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places the head of the queue into the provided cell.
    PlacePipe {
        /// Cell that should receive the pipe.
        coord: Coordinate,
        /// Whether to spend the cross replacement first.
        replacement: Replacement,
    },
    /// Discards the head of the queue without placing it.
    SkipPipe,
    /// Reverts the most recent placement, if water has not reached it.
    UndoStep,
    /// Suspends the flow timer.
    Pause,
    /// Resumes a suspended flow timer.
    Resume,
}

/// Events broadcast by the session after processing commands or timer beats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the flow timer ticked once.
    Ticked {
        /// Number of ticks elapsed since the countdown started.
        ticks_elapsed: u32,
    },
    /// Water advanced one more unit of distance from the source.
    FlowAdvanced {
        /// Flow distance that was filled; zero is the pipe beside the source.
        distance: u32,
        /// Number of pipes lying at that distance.
        filled: usize,
    },
    /// Confirms that a pipe was placed.
    PipePlaced {
        /// Cell that received the pipe.
        coord: Coordinate,
        /// Shape of the placed pipe.
        shape: PipeShape,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell named in the rejected request.
        coord: Coordinate,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// The head of the queue was discarded.
    PipeSkipped {
        /// Shape of the discarded pipe.
        shape: PipeShape,
    },
    /// The most recent placement was reverted.
    StepUndone {
        /// Cell that was cleared.
        coord: Coordinate,
        /// Shape returned to the head of the queue.
        shape: PipeShape,
    },
    /// An undo request found nothing it was allowed to revert.
    UndoRejected,
    /// The one-time cross replacement was spent.
    CrossSubstituted,
    /// The flow timer was suspended.
    Paused,
    /// The flow timer resumed.
    Resumed,
    /// Source and sink are connected.
    Won,
    /// The session was lost.
    Lost {
        /// Why the session was lost.
        reason: LossReason,
    },
}

/// Reasons a session may be lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    /// Water reached a gap or dead end before a path to the sink existed.
    FlowStalled,
    /// The countdown ran out before the sink was connected.
    TimeUp,
}

/// Reasons a pipe placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The target is a wall or a termination cell.
    #[error("cell cannot hold a pipe")]
    NotFillable,
    /// The target already holds a pipe.
    #[error("cell already holds a pipe")]
    Occupied,
    /// The session is paused.
    #[error("game is paused")]
    Paused,
    /// The session has already been won or lost.
    #[error("game is over")]
    SessionOver,
}

/// Reasons level data may be refused at construction time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The layout does not contain the declared number of rows.
    #[error("expected {expected} rows but found {found}")]
    RowCount {
        /// Declared number of rows.
        expected: u32,
        /// Number of rows present in the layout.
        found: usize,
    },
    /// A row does not contain the declared number of columns.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Index of the offending row.
        row: u32,
        /// Declared number of columns.
        expected: u32,
        /// Number of cells present in the row.
        found: usize,
    },
    /// The grid is smaller than 2×2.
    #[error("grid must be at least 2x2, got {rows}x{cols}")]
    TooSmall {
        /// Declared number of rows.
        rows: u32,
        /// Declared number of columns.
        cols: u32,
    },
    /// A cell's stored coordinate disagrees with its position in the layout.
    #[error("cell at {expected} reports coordinate {found}")]
    MisplacedCell {
        /// Position of the cell within the layout.
        expected: Coordinate,
        /// Coordinate stored in the cell.
        found: Coordinate,
    },
    /// No source cell exists.
    #[error("source cell is missing")]
    MissingSource,
    /// No sink cell exists.
    #[error("sink cell is missing")]
    MissingSink,
    /// More than one source cell exists.
    #[error("duplicate source cell at {0}")]
    DuplicateSource(Coordinate),
    /// More than one sink cell exists.
    #[error("duplicate sink cell at {0}")]
    DuplicateSink(Coordinate),
    /// Walls seal the source off from the sink.
    #[error("source cannot reach the sink")]
    Unreachable,
    /// The flow delay is zero.
    #[error("flow delay must be at least 1")]
    InvalidDelay,
}

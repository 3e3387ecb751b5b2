//! Board cells and the primitives that mutate them.

use serde::{Deserialize, Serialize};

use crate::{CellImage, Coordinate, Direction, ImageKind, Pipe, PipeShape, PlacementError, Rotation};

/// Role played by a termination cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationKind {
    /// Cell water flows out of.
    Source,
    /// Cell water must reach.
    Sink,
}

/// Single entry of the grid.
///
/// The variant of a cell never changes once the grid is built. Only the pipe
/// slot of a fillable cell is mutated during play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable wall.
    Wall {
        /// Location of the cell.
        coord: Coordinate,
    },
    /// Cell that may hold one pipe.
    Fillable {
        /// Location of the cell.
        coord: Coordinate,
        /// Pipe placed into the cell, if any.
        pipe: Option<Pipe>,
    },
    /// Source or sink.
    Termination {
        /// Location of the cell.
        coord: Coordinate,
        /// Side through which water leaves a source or enters a sink.
        direction: Direction,
        /// Whether the cell is the source or the sink.
        kind: TerminationKind,
    },
}

impl Cell {
    /// Creates a wall cell.
    #[must_use]
    pub const fn wall(coord: Coordinate) -> Self {
        Self::Wall { coord }
    }

    /// Creates an empty fillable cell.
    #[must_use]
    pub const fn empty(coord: Coordinate) -> Self {
        Self::Fillable { coord, pipe: None }
    }

    /// Creates a fillable cell that already holds `pipe`.
    #[must_use]
    pub const fn with_pipe(coord: Coordinate, pipe: Pipe) -> Self {
        Self::Fillable {
            coord,
            pipe: Some(pipe),
        }
    }

    /// Creates the source cell.
    #[must_use]
    pub const fn source(coord: Coordinate, direction: Direction) -> Self {
        Self::Termination {
            coord,
            direction,
            kind: TerminationKind::Source,
        }
    }

    /// Creates the sink cell.
    #[must_use]
    pub const fn sink(coord: Coordinate, direction: Direction) -> Self {
        Self::Termination {
            coord,
            direction,
            kind: TerminationKind::Sink,
        }
    }

    /// Location of the cell.
    #[must_use]
    pub const fn coord(&self) -> Coordinate {
        match *self {
            Self::Wall { coord }
            | Self::Fillable { coord, .. }
            | Self::Termination { coord, .. } => coord,
        }
    }

    /// Whether the cell may hold a pipe.
    #[must_use]
    pub const fn is_fillable(&self) -> bool {
        matches!(self, Self::Fillable { .. })
    }

    /// Pipe held by the cell, if any.
    #[must_use]
    pub const fn pipe(&self) -> Option<&Pipe> {
        match self {
            Self::Fillable { pipe, .. } => pipe.as_ref(),
            _ => None,
        }
    }

    /// Facing direction and role of a termination cell.
    #[must_use]
    pub const fn termination(&self) -> Option<(Direction, TerminationKind)> {
        match *self {
            Self::Termination {
                direction, kind, ..
            } => Some((direction, kind)),
            _ => None,
        }
    }

    /// Stores `pipe` into an empty fillable cell.
    pub fn put_pipe(&mut self, pipe: Pipe) -> Result<(), PlacementError> {
        match self {
            Self::Fillable { pipe: Some(_), .. } => Err(PlacementError::Occupied),
            Self::Fillable { pipe: slot, .. } => {
                *slot = Some(pipe);
                Ok(())
            }
            _ => Err(PlacementError::NotFillable),
        }
    }

    /// Removes and returns the pipe, unless water already reached it.
    pub fn take_unfilled_pipe(&mut self) -> Option<Pipe> {
        let Self::Fillable { pipe: slot, .. } = self else {
            return None;
        };
        if slot.is_some_and(|pipe| !pipe.is_filled()) {
            slot.take()
        } else {
            None
        }
    }

    /// Fills the pipe held by the cell and reports whether anything changed.
    pub fn fill_pipe(&mut self) -> bool {
        match self {
            Self::Fillable {
                pipe: Some(pipe), ..
            } => pipe.fill(),
            _ => false,
        }
    }

    /// Image descriptor for rendering collaborators.
    #[must_use]
    pub const fn image(&self) -> CellImage {
        match self {
            Self::Wall { .. } => CellImage::new(ImageKind::Wall, Rotation::Deg0),
            Self::Fillable { pipe: None, .. } => CellImage::new(ImageKind::Empty, Rotation::Deg0),
            Self::Fillable {
                pipe: Some(pipe), ..
            } => pipe.image(),
            Self::Termination {
                direction, kind, ..
            } => {
                let kind = match kind {
                    TerminationKind::Source => ImageKind::Source,
                    TerminationKind::Sink => ImageKind::Sink,
                };
                CellImage::new(kind, direction.rotation())
            }
        }
    }

    /// Single character code used by the level text format.
    #[must_use]
    pub const fn to_char(&self) -> char {
        match self {
            Self::Wall { .. } => 'W',
            Self::Fillable { pipe: None, .. } => '.',
            Self::Fillable {
                pipe: Some(pipe), ..
            } => pipe.shape().glyph(),
            Self::Termination { direction, .. } => direction.arrow(),
        }
    }

    /// Reconstructs a cell from its character code.
    ///
    /// Terminations on the border are sinks, the remaining one is the source.
    #[must_use]
    pub fn from_char(code: char, coord: Coordinate, on_border: bool) -> Option<Self> {
        match code {
            'W' => Some(Self::wall(coord)),
            '.' => Some(Self::empty(coord)),
            _ => {
                if let Some(direction) = Direction::from_arrow(code) {
                    return Some(if on_border {
                        Self::sink(coord, direction)
                    } else {
                        Self::source(coord, direction)
                    });
                }
                PipeShape::from_glyph(code).map(|shape| Self::with_pipe(coord, Pipe::new(shape)))
            }
        }
    }
}

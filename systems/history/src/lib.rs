#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placement history used to undo steps.
//!
//! Entries refer to cells by coordinate, never by reference, so undo replays
//! as "clear the pipe at this coordinate".

use pipeflow_core::{Coordinate, Pipe};

/// Single recorded placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacedPipe {
    coord: Coordinate,
    pipe: Pipe,
}

impl PlacedPipe {
    /// Creates a new history entry.
    #[must_use]
    pub const fn new(coord: Coordinate, pipe: Pipe) -> Self {
        Self { coord, pipe }
    }

    /// Cell that received the pipe.
    #[must_use]
    pub const fn coord(&self) -> Coordinate {
        self.coord
    }

    /// Pipe as it was dispensed.
    #[must_use]
    pub const fn pipe(&self) -> Pipe {
        self.pipe
    }
}

/// LIFO stack of placements that also counts successful undos.
#[derive(Clone, Debug, Default)]
pub struct CellStack {
    entries: Vec<PlacedPipe>,
    undo_count: u32,
}

impl CellStack {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a placement.
    pub fn push(&mut self, coord: Coordinate, pipe: Pipe) {
        self.entries.push(PlacedPipe::new(coord, pipe));
    }

    /// Most recent placement, if any.
    #[must_use]
    pub fn peek(&self) -> Option<PlacedPipe> {
        self.entries.last().copied()
    }

    /// Removes the most recent placement and counts the undo.
    pub fn pop(&mut self) -> Option<PlacedPipe> {
        let entry = self.entries.pop()?;
        self.undo_count = self.undo_count.saturating_add(1);
        Some(entry)
    }

    /// Number of placements recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no placement is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful pops so far.
    #[must_use]
    pub const fn undo_count(&self) -> u32 {
        self.undo_count
    }
}

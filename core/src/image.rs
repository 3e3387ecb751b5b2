//! Render-agnostic image descriptors.

use serde::{Deserialize, Serialize};

/// Clockwise rotation applied to a base image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three quarter turn clockwise.
    Deg270,
}

impl Rotation {
    /// Rotation angle in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Base artwork of a pipe image before rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeForm {
    /// Straight segment, horizontal when unrotated.
    Straight,
    /// Elbow joining top and right when unrotated.
    Elbow,
    /// Four-way crossing.
    Cross,
}

/// Base artwork selected for a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    /// Impassable wall.
    Wall,
    /// Fillable cell without a pipe.
    Empty,
    /// Water source, pointing up when unrotated.
    Source,
    /// Water sink, pointing up when unrotated.
    Sink,
    /// Pipe segment.
    Pipe {
        /// Base artwork of the segment.
        form: PipeForm,
        /// Whether the segment is drawn full of water.
        filled: bool,
    },
}

/// Descriptive image data handed to rendering collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellImage {
    kind: ImageKind,
    rotation: Rotation,
}

impl CellImage {
    /// Creates a new image descriptor.
    #[must_use]
    pub const fn new(kind: ImageKind, rotation: Rotation) -> Self {
        Self { kind, rotation }
    }

    /// Base artwork to draw.
    #[must_use]
    pub const fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Clockwise rotation applied to the artwork.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }
}

//! Pipe shapes and the segments placed on the board.
//!
//! A shape knows which sides it opens towards and how it routes water from
//! one side to another. Glyphs and two-letter tokens give every shape a
//! stable text form.

use serde::{Deserialize, Serialize};

use crate::{CellImage, Direction, ImageKind, PipeForm, Rotation};

/// Closed set of pipe segment shapes.
///
/// Elbow names describe the two sides of the cell the segment joins, so
/// `TopLeft` opens upwards and to the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeShape {
    /// Straight segment joining the left and right sides.
    Horizontal,
    /// Straight segment joining the top and bottom sides.
    Vertical,
    /// Elbow joining the top and left sides.
    TopLeft,
    /// Elbow joining the top and right sides.
    TopRight,
    /// Elbow joining the bottom and left sides.
    BottomLeft,
    /// Elbow joining the bottom and right sides.
    BottomRight,
    /// Four-way crossing that only passes water straight through.
    Cross,
}

impl PipeShape {
    /// Shapes a pipe queue draws from. The cross is only ever produced by the
    /// one-time replacement.
    pub const RANDOM: [PipeShape; 6] = [
        PipeShape::Horizontal,
        PipeShape::Vertical,
        PipeShape::TopLeft,
        PipeShape::TopRight,
        PipeShape::BottomLeft,
        PipeShape::BottomRight,
    ];

    /// Sides of the cell through which water may enter or leave.
    #[must_use]
    pub const fn openings(self) -> &'static [Direction] {
        match self {
            Self::Horizontal => &[Direction::Left, Direction::Right],
            Self::Vertical => &[Direction::Up, Direction::Down],
            Self::TopLeft => &[Direction::Up, Direction::Left],
            Self::TopRight => &[Direction::Up, Direction::Right],
            Self::BottomLeft => &[Direction::Down, Direction::Left],
            Self::BottomRight => &[Direction::Down, Direction::Right],
            Self::Cross => &[
                Direction::Up,
                Direction::Right,
                Direction::Down,
                Direction::Left,
            ],
        }
    }

    /// Reports whether the shape opens towards `side`.
    #[must_use]
    pub fn opens(self, side: Direction) -> bool {
        self.openings().contains(&side)
    }

    /// Side water leaves through after entering through `entry`.
    ///
    /// Returns `None` when the shape is closed on the entry side. Crosses
    /// never turn, so water entering one leaves through the opposite side.
    #[must_use]
    pub fn exit_for(self, entry: Direction) -> Option<Direction> {
        if !self.opens(entry) {
            return None;
        }
        match self {
            Self::Cross => Some(entry.opposite()),
            _ => self
                .openings()
                .iter()
                .copied()
                .find(|side| *side != entry),
        }
    }

    /// Box-drawing glyph used for pre-placed pipes in the level text format.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Horizontal => '═',
            Self::Vertical => '║',
            Self::TopLeft => '╝',
            Self::TopRight => '╚',
            Self::BottomLeft => '╗',
            Self::BottomRight => '╔',
            Self::Cross => '╬',
        }
    }

    /// Parses a glyph produced by [`PipeShape::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '═' => Some(Self::Horizontal),
            '║' => Some(Self::Vertical),
            '╝' => Some(Self::TopLeft),
            '╚' => Some(Self::TopRight),
            '╗' => Some(Self::BottomLeft),
            '╔' => Some(Self::BottomRight),
            '╬' => Some(Self::Cross),
            _ => None,
        }
    }

    /// Two-letter token used in the comma separated queue listing.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Horizontal => "HZ",
            Self::Vertical => "VT",
            Self::TopLeft => "TL",
            Self::TopRight => "TR",
            Self::BottomLeft => "BL",
            Self::BottomRight => "BR",
            Self::Cross => "CR",
        }
    }

    /// Parses a token produced by [`PipeShape::token`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HZ" => Some(Self::Horizontal),
            "VT" => Some(Self::Vertical),
            "TL" => Some(Self::TopLeft),
            "TR" => Some(Self::TopRight),
            "BL" => Some(Self::BottomLeft),
            "BR" => Some(Self::BottomRight),
            "CR" => Some(Self::Cross),
            _ => None,
        }
    }

    const fn form_and_rotation(self) -> (PipeForm, Rotation) {
        match self {
            Self::Horizontal => (PipeForm::Straight, Rotation::Deg0),
            Self::Vertical => (PipeForm::Straight, Rotation::Deg90),
            Self::TopRight => (PipeForm::Elbow, Rotation::Deg0),
            Self::BottomRight => (PipeForm::Elbow, Rotation::Deg90),
            Self::BottomLeft => (PipeForm::Elbow, Rotation::Deg180),
            Self::TopLeft => (PipeForm::Elbow, Rotation::Deg270),
            Self::Cross => (PipeForm::Cross, Rotation::Deg0),
        }
    }
}

/// Pipe segment that occupies a fillable cell or waits in the queue.
///
/// The shape is fixed at construction. The filled flag only moves from
/// `false` to `true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pipe {
    shape: PipeShape,
    filled: bool,
}

impl Pipe {
    /// Creates a new, unfilled pipe.
    #[must_use]
    pub const fn new(shape: PipeShape) -> Self {
        Self {
            shape,
            filled: false,
        }
    }

    /// Shape of the segment.
    #[must_use]
    pub const fn shape(&self) -> PipeShape {
        self.shape
    }

    /// Whether water has reached the segment.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.filled
    }

    /// Marks the pipe as filled and reports whether the flag changed.
    pub fn fill(&mut self) -> bool {
        let changed = !self.filled;
        self.filled = true;
        changed
    }

    /// Image descriptor for rendering collaborators.
    #[must_use]
    pub const fn image(&self) -> CellImage {
        let (form, rotation) = self.shape.form_and_rotation();
        CellImage::new(
            ImageKind::Pipe {
                form,
                filled: self.filled,
            },
            rotation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Pipe, PipeShape};
    use crate::{Direction, ImageKind, PipeForm, Rotation};

    const ALL_SHAPES: [PipeShape; 7] = [
        PipeShape::Horizontal,
        PipeShape::Vertical,
        PipeShape::TopLeft,
        PipeShape::TopRight,
        PipeShape::BottomLeft,
        PipeShape::BottomRight,
        PipeShape::Cross,
    ];

    #[test]
    fn two_way_shapes_route_to_their_other_opening() {
        assert_eq!(
            PipeShape::Horizontal.exit_for(Direction::Left),
            Some(Direction::Right)
        );
        assert_eq!(
            PipeShape::BottomLeft.exit_for(Direction::Left),
            Some(Direction::Down)
        );
        assert_eq!(
            PipeShape::TopRight.exit_for(Direction::Right),
            Some(Direction::Up)
        );
        assert_eq!(PipeShape::Vertical.exit_for(Direction::Left), None);
    }

    #[test]
    fn cross_only_passes_straight_through() {
        for side in Direction::ALL {
            assert_eq!(PipeShape::Cross.exit_for(side), Some(side.opposite()));
        }
    }

    #[test]
    fn random_pool_excludes_cross() {
        assert!(!PipeShape::RANDOM.contains(&PipeShape::Cross));
        for shape in PipeShape::RANDOM {
            assert_eq!(shape.openings().len(), 2, "{shape:?} must be two-way");
        }
    }

    #[test]
    fn glyphs_and_tokens_are_unique_and_parse_back() {
        for shape in ALL_SHAPES {
            assert_eq!(PipeShape::from_glyph(shape.glyph()), Some(shape));
            assert_eq!(PipeShape::from_token(shape.token()), Some(shape));
        }
        assert_eq!(PipeShape::from_token("XX"), None);
    }

    #[test]
    fn fill_is_monotonic() {
        let mut pipe = Pipe::new(PipeShape::Vertical);
        assert!(!pipe.is_filled());
        assert!(pipe.fill());
        assert!(!pipe.fill(), "second fill must report no change");
        assert!(pipe.is_filled());
        assert_eq!(pipe.shape(), PipeShape::Vertical);
    }

    #[test]
    fn image_reflects_shape_rotation_and_fill() {
        let mut pipe = Pipe::new(PipeShape::TopLeft);
        let image = pipe.image();
        assert_eq!(image.rotation(), Rotation::Deg270);
        assert_eq!(
            image.kind(),
            ImageKind::Pipe {
                form: PipeForm::Elbow,
                filled: false
            }
        );

        let _ = pipe.fill();
        assert_eq!(
            pipe.image().kind(),
            ImageKind::Pipe {
                form: PipeForm::Elbow,
                filled: true
            }
        );
    }
}

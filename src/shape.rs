//! Directions on the rectangular grid, and the axes rivers run along.

use strum::{Display, VariantArray};

use crate::location::Location;

/// The axis a river runs along.
#[derive(Copy, Clone, Display, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
}

/// A step from one cell to an orthogonally adjacent cell.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Towards column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Direction {
    /// Directions which, when stepped along, lead to a location indexed higher in row-major order.
    ///
    /// Rivers are generated by walking only these, so every adjacent pair is visited exactly once.
    pub const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    /// Attempt the step from `location`, returning the resultant [`Location`].
    ///
    /// Stepping off the top or left edge wraps around to a huge coordinate, which is out of bounds for any board.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    /// The opposite direction.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The axis a river running in this direction lies along.
    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Up | Self::Down => Orientation::Vertical,
            Self::Left | Self::Right => Orientation::Horizontal,
        }
    }
}

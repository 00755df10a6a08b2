use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Ix;

pub(crate) type Coord = usize;
/// A board dimension, which is never zero.
pub type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(x, y)` on a board. The top left corner is `Location(0, 0)`.
///
/// `x` is the column and `y` is the row.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// The row of this location.
    #[inline]
    pub fn row(&self) -> Coord {
        self.1
    }

    /// The column of this location.
    #[inline]
    pub fn col(&self) -> Coord {
        self.0
    }

    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(r{}, c{})", self.row(), self.col())
    }
}

/// Every location strictly between `a` and `b`, which must share a row or a column.
///
/// Returns nothing for locations which share neither.
pub(crate) fn cells_between(a: Location, b: Location) -> Vec<Location> {
    if a.row() == b.row() {
        let (left, right) = (a.col().min(b.col()), a.col().max(b.col()));
        ((left + 1)..right).map(|col| Location(col, a.row())).collect()
    } else if a.col() == b.col() {
        let (top, bottom) = (a.row().min(b.row()), a.row().max(b.row()));
        ((top + 1)..bottom).map(|row| Location(a.col(), row)).collect()
    } else {
        Vec::new()
    }
}

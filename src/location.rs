use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Ix;

pub(crate) type Coord = usize;
/// A board dimension measured in cells.
pub type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(x, y)` on a board. The top left vertex is `Location(0, 0)`.
///
/// Vertices range over `0..=width` and `0..=height`; the cell at `Location(x, y)` is the square whose top left corner is the vertex at the same location.
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    // internal arenas carry a one-unit halo around the board, so board coordinates are shifted by one
    pub(crate) fn padded(self) -> Self {
        self.offset_by((1, 1))
    }

    pub(crate) fn unpadded(self) -> Self {
        self.offset_by((-1, -1))
    }

    /// Whether a padded location lies on the board proper, given the board's extent in padded coordinates.
    pub(crate) fn within_padded(&self, max: (Coord, Coord)) -> bool {
        (1..=max.0).contains(&self.0) && (1..=max.1).contains(&self.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

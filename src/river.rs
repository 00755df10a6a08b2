use std::fmt::{Display, Formatter};

use unordered_pair::UnorderedPair;

use crate::board::{IslandId, RiverId};
use crate::location::Location;
use crate::shape::Orientation;

/// Most bridges a single river can ever hold.
pub const MAX_BRIDGES: u8 = 2;

/// The stretch of water between two islands with no island in between; an edge of the board graph.
#[derive(Clone, Debug)]
pub struct River {
    pub(crate) endpoints: UnorderedPair<IslandId>,
    pub(crate) orientation: Orientation,
    pub(crate) bridges: u8,
    // bridges this river could still take without exceeding its max or either endpoint's need
    pub(crate) to_give: u8,
    pub(crate) max: u8,
    pub(crate) crossings: Vec<RiverId>,
}

impl River {
    pub(crate) fn new(endpoints: UnorderedPair<IslandId>, orientation: Orientation, to_give: u8) -> Self {
        Self {
            endpoints,
            orientation,
            bridges: 0,
            to_give: to_give.min(MAX_BRIDGES),
            max: MAX_BRIDGES,
            crossings: Vec::new(),
        }
    }

    /// The islands at either end, in no particular order.
    pub fn endpoints(&self) -> (IslandId, IslandId) {
        (self.endpoints.0, self.endpoints.1)
    }

    /// Whether this river runs along a row or a column.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Bridges placed on this river so far.
    pub fn bridges(&self) -> u8 {
        self.bridges
    }

    /// Remaining capacity.
    pub fn to_give(&self) -> u8 {
        self.to_give
    }

    /// The most bridges this river may ever carry; always [`MAX_BRIDGES`].
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Rivers whose span intersects this one; at most one side of a crossing may ever carry bridges.
    pub fn crossings(&self) -> &[RiverId] {
        &self.crossings
    }

    /// Whether `other` crosses this river.
    pub fn crosses(&self, other: RiverId) -> bool {
        self.crossings.contains(&other)
    }

    /// Whether `island` is one of the ends of this river.
    pub fn connects(&self, island: IslandId) -> bool {
        self.endpoints.0 == island || self.endpoints.1 == island
    }

    /// The endpoint which is not `island`.
    pub fn neighbor(&self, island: IslandId) -> IslandId {
        if self.endpoints.0 == island {
            self.endpoints.1
        } else {
            self.endpoints.0
        }
    }
}

/// The two ends of a river, for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RiverSpan {
    /// The end indexed lower in row-major order.
    pub from: Location,
    /// The other end.
    pub to: Location,
}

impl Display for RiverSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <=> {}", self.from, self.to)
    }
}

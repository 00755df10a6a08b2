use std::fmt::{Display, Formatter};

use crate::board::RiverId;
use crate::cluster::ClusterId;
use crate::location::Location;

/// A numbered island, i.e. a vertex of the board graph.
///
/// Everything but `location` and `target` is derived from the incident [`River`](crate::river::River)s
/// and kept current by [`Board::update`](crate::Board).
#[derive(Clone, Debug)]
pub struct Island {
    pub(crate) location: Location,
    pub(crate) target: u8,
    pub(crate) bridges: u8,
    pub(crate) available: u8,
    // every incident river, in creation order
    pub(crate) rivers: Vec<RiverId>,
    // incident rivers which can still take a bridge
    pub(crate) live_rivers: Vec<RiverId>,
    pub(crate) cluster: ClusterId,
}

impl Island {
    pub(crate) fn new(location: Location, target: u8, cluster: ClusterId) -> Self {
        Self {
            location,
            target,
            bridges: 0,
            available: 0,
            rivers: Vec::new(),
            live_rivers: Vec::new(),
            cluster,
        }
    }

    /// Where this island sits on the board.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The number printed on this island.
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Bridges currently touching this island, summed over all incident rivers.
    pub fn bridges(&self) -> u8 {
        self.bridges
    }

    /// Bridges this island could still receive, summed over its live rivers.
    pub fn available(&self) -> u8 {
        self.available
    }

    /// Bridges still missing before this island reaches its target.
    pub fn need(&self) -> u8 {
        self.target.saturating_sub(self.bridges)
    }

    /// Whether this island has exactly as many bridges as its target.
    pub fn is_complete(&self) -> bool {
        self.bridges == self.target
    }

    /// Every river touching this island, including those which are closed.
    pub fn rivers(&self) -> &[RiverId] {
        &self.rivers
    }

    /// Rivers touching this island which can still take a bridge.
    pub fn live_rivers(&self) -> &[RiverId] {
        &self.live_rivers
    }

    /// The cluster this island currently belongs to.
    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }
}

impl Display for Island {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}] {} a{}", self.bridges, self.target, self.location, self.available)
    }
}

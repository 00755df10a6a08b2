use std::fmt::{Display, Formatter};

use crate::board::IslandId;

/// Label of a connected component. Islands carry the label of the cluster which owns them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ClusterId(pub(crate) usize);

impl Display for ClusterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A set of islands transitively joined by at least one bridge.
#[derive(Clone, Debug)]
pub struct Cluster {
    pub(crate) members: Vec<IslandId>,
}

impl Cluster {
    pub(crate) fn singleton(island: IslandId) -> Self {
        Self { members: vec![island] }
    }

    /// Take every member of `other`. Relabelling the absorbed islands is up to the caller.
    pub(crate) fn absorb(&mut self, other: Cluster) {
        self.members.extend(other.members);
    }

    /// Islands in this cluster, in the order they joined it.
    pub fn members(&self) -> &[IslandId] {
        &self.members
    }

    /// Whether `island` is a member.
    pub fn contains(&self, island: IslandId) -> bool {
        self.members.contains(&island)
    }

    /// The number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

use thiserror::Error;

use crate::board::{Board, RiverId};
use crate::location::Location;
use crate::river::RiverSpan;

/// Why a board is not (yet) a solution.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Unsolved {
    /// A river carries more bridges than any river may.
    #[error("river {span} has {bridges} bridges; max is {max}")]
    RiverOverMax {
        /// The river.
        span: RiverSpan,
        /// Bridges it carries.
        bridges: u8,
        /// Bridges it may carry.
        max: u8,
    },
    /// An island's bridges differ from its number.
    #[error("island at {location} has {bridges} bridges; target is {target}")]
    UnmetTarget {
        /// The island.
        location: Location,
        /// Bridges it has.
        bridges: u8,
        /// Bridges it should have.
        target: u8,
    },
    /// The islands form more than one cluster.
    #[error("islands are divided into {0} clusters; should have 1")]
    Disconnected(usize),
    /// The only cluster is missing some islands.
    #[error("cluster has {size} islands; should have all {total}")]
    PartialCluster {
        /// Members of the cluster.
        size: usize,
        /// Islands on the board.
        total: usize,
    },
    /// Two crossing rivers both carry bridges.
    #[error("bridges {first} and {second} cross, but both have bridges ({first_bridges} and {second_bridges})")]
    CrossingBridges {
        /// One river.
        first: RiverSpan,
        /// The river crossing it.
        second: RiverSpan,
        /// Bridges on `first`.
        first_bridges: u8,
        /// Bridges on `second`.
        second_bridges: u8,
    },
}

/// A state from which no solution can be reached.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Contradiction {
    /// A river carries more bridges than one of its ends wants in total.
    #[error("river {span} has {bridges} bridges; island at {location} needs {target}")]
    RiverOverTarget {
        /// The river.
        span: RiverSpan,
        /// Bridges it carries.
        bridges: u8,
        /// The overfilled end.
        location: Location,
        /// That end's number.
        target: u8,
    },
    /// An island needs more bridges than its live rivers can still give.
    #[error("island at {location} needs {needed} bridges, but only {available} are available")]
    UnderSupplied {
        /// The island.
        location: Location,
        /// Bridges it still needs.
        needed: u8,
        /// Bridges it could still receive.
        available: u8,
    },
    /// A cluster short of the whole board has no way left to grow.
    #[error("cluster of size {size} containing {location} has no edges and does not contain all islands")]
    StrandedCluster {
        /// Members of the cluster.
        size: usize,
        /// Its first member.
        location: Location,
    },
    /// Two crossing rivers both carry bridges.
    #[error("bridges {first} and {second} cross, but both have bridges ({first_bridges} and {second_bridges})")]
    CrossingBridges {
        /// One river.
        first: RiverSpan,
        /// The river crossing it.
        second: RiverSpan,
        /// Bridges on `first`.
        first_bridges: u8,
        /// Bridges on `second`.
        second_bridges: u8,
    },
}

impl Board {
    /// Check every condition of a solution, reporting the first which fails.
    pub fn verify(&self) -> Result<(), Unsolved> {
        for river in self.river_ids() {
            let river_ref = self.river(river);
            if river_ref.bridges > river_ref.max {
                return Err(Unsolved::RiverOverMax {
                    span: self.span(river),
                    bridges: river_ref.bridges,
                    max: river_ref.max,
                });
            }
        }

        if let Some(island) = self.islands().find(|island| island.bridges != island.target) {
            return Err(Unsolved::UnmetTarget {
                location: island.location,
                bridges: island.bridges,
                target: island.target,
            });
        }

        if self.cluster_count() != 1 {
            return Err(Unsolved::Disconnected(self.cluster_count()));
        }
        let total = self.graph.node_count();
        if let Some((_, cluster)) = self.clusters().find(|(_, cluster)| cluster.size() != total) {
            return Err(Unsolved::PartialCluster { size: cluster.size(), total });
        }

        if let Some((first, second)) = self.crossing_conflict() {
            return Err(Unsolved::CrossingBridges {
                first: self.span(first),
                second: self.span(second),
                first_bridges: self.river(first).bridges,
                second_bridges: self.river(second).bridges,
            });
        }

        Ok(())
    }

    /// Whether [`verify`](Self::verify) passes.
    pub fn is_solved(&self) -> bool {
        self.verify().is_ok()
    }

    /// Look for evidence that this board can no longer be solved.
    ///
    /// Cheaper than [`verify`](Self::verify) and fires much earlier, so it is run after every propagation pass.
    pub fn check_mistakes(&self) -> Result<(), Contradiction> {
        for river in self.river_ids() {
            let (a, b) = self.river(river).endpoints();
            for island in [self.island(a), self.island(b)] {
                if self.river(river).bridges > island.target {
                    return Err(Contradiction::RiverOverTarget {
                        span: self.span(river),
                        bridges: self.river(river).bridges,
                        location: island.location,
                        target: island.target,
                    });
                }
            }
        }

        if let Some(island) = self.islands().find(|island| island.available < island.need()) {
            return Err(Contradiction::UnderSupplied {
                location: island.location,
                needed: island.need(),
                available: island.available,
            });
        }

        if self.cluster_count() > 1 {
            for (id, cluster) in self.clusters() {
                if self.cluster_edges(id).is_empty() {
                    return Err(Contradiction::StrandedCluster {
                        size: cluster.size(),
                        location: self.island(cluster.members()[0]).location,
                    });
                }
            }
        }

        if let Some((first, second)) = self.crossing_conflict() {
            return Err(Contradiction::CrossingBridges {
                first: self.span(first),
                second: self.span(second),
                first_bridges: self.river(first).bridges,
                second_bridges: self.river(second).bridges,
            });
        }

        Ok(())
    }

    /// Whether [`check_mistakes`](Self::check_mistakes) finds anything.
    pub fn has_mistakes(&self) -> bool {
        self.check_mistakes().is_err()
    }

    /// Two crossing rivers which both carry bridges, if there are any.
    fn crossing_conflict(&self) -> Option<(RiverId, RiverId)> {
        self.river_ids()
            .filter(|river| self.river(*river).bridges > 0)
            .find_map(|river| self.river(river).crossings.iter()
                .find(|crossing| self.river(**crossing).bridges > 0)
                .map(|crossing| (river, *crossing)))
    }
}

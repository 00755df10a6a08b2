use std::collections::BTreeSet;

use itertools::Itertools;
use strum::{Display, VariantArray};

use crate::board::{Board, IslandId, RiverId};

/// The deductions available to the solver.
///
/// Each non-speculative rule is a pure function of the board state which reports whether it changed anything.
#[derive(Copy, Clone, Debug, Display, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[strum(serialize_all = "kebab-case")]
pub enum Rule {
    /// Force bridges onto rivers whose island cannot meet its need without them.
    RequiredFill,
    /// Keep a pair of single-exit clusters from sealing each other off.
    CapToAvoidJoinedIsolation,
    /// Keep a cluster's last two incomplete islands from finishing each other off.
    CapToAvoidSelfIsolation,
    /// Bound a pair of empty rivers which cannot both carry bridges without starving a crossed island.
    BadCorners,
    /// Refute a single-river hypothesis on a scratch copy of the board.
    MakeAGuess,
}

impl Rule {
    /// Rules run on every pass, in this order.
    pub const PROPAGATION: &'static [Self] = &[
        Self::RequiredFill,
        Self::CapToAvoidJoinedIsolation,
        Self::CapToAvoidSelfIsolation,
    ];

    /// Whether this rule works on scratch copies of the board rather than by direct deduction.
    pub fn is_speculative(&self) -> bool {
        matches!(self, Self::MakeAGuess)
    }
}

impl Board {
    /// Apply a single rule, returning whether the board changed.
    pub fn apply(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::RequiredFill => self.required_fill(),
            Rule::CapToAvoidJoinedIsolation => self.cap_to_avoid_joined_isolation(),
            Rule::CapToAvoidSelfIsolation => self.cap_to_avoid_self_isolation(),
            Rule::BadCorners => self.bad_corners(),
            Rule::MakeAGuess => self.make_a_guess().committed.is_some(),
        }
    }

    /// `rivers` must carry at least `required` more bridges between them.
    ///
    /// With `excess` the capacity of `rivers` beyond `required`, every river gets at least
    /// its own capacity less `excess`, so the rivers with the least slack fill first.
    pub fn must_provide(&mut self, rivers: &[RiverId], required: i32) -> bool {
        let available: i32 = rivers.iter().map(|river| i32::from(self.river(*river).to_give)).sum();
        let excess = available - required;

        let mut changed = false;
        for river in rivers {
            let forced = i32::from(self.river(*river).to_give) - excess;
            for _ in 0..forced {
                if self.add_bridge(*river).is_err() {
                    break;
                }
                changed = true;
            }
        }

        changed
    }

    /// Every island must get its need from its live rivers; force whatever the rivers cannot avoid giving.
    pub fn required_fill(&mut self) -> bool {
        let mut changed = false;
        for island in self.island_ids().collect_vec() {
            let live_rivers = self.island(island).live_rivers.clone();
            let need = i32::from(self.island(island).need());
            changed |= self.must_provide(&live_rivers, need);
        }
        changed
    }

    /// Where a cluster's only way out leads to another cluster with only one way out,
    /// and both ends need the same number of bridges, keep that river one short of finishing both.
    ///
    /// Only meaningful with more than two clusters; joining the last two is exactly what a solution does.
    pub fn cap_to_avoid_joined_isolation(&mut self) -> bool {
        if self.cluster_count() <= 2 {
            return false;
        }

        let mut changed = false;
        for cluster in self.clusters.keys().copied().collect_vec() {
            let edges = self.cluster_edges(cluster);
            if edges.len() != 1 {
                continue;
            }
            let island = edges[0];

            for river in self.island(island).live_rivers.clone() {
                let neighbor = self.neighbor(river, island);
                if self.cluster_edges(self.cluster_of(neighbor)).len() != 1 {
                    continue;
                }
                let need = self.island(island).need();
                if self.island(neighbor).need() != need {
                    continue;
                }
                changed |= self.cap_to_give(river, need.saturating_sub(1));
            }
        }

        changed
    }

    /// Where a cluster's last two incomplete islands share a river and need the same number of bridges,
    /// keep that river one short of finishing both.
    pub fn cap_to_avoid_self_isolation(&mut self) -> bool {
        if self.cluster_count() <= 2 {
            return false;
        }

        let mut changed = false;
        for cluster in self.clusters.keys().copied().collect_vec() {
            let incomplete = self.incomplete_islands(cluster);
            let [first, second] = incomplete[..] else {
                continue;
            };
            let Some(river) = self.river_with(first, second) else {
                continue;
            };

            let need = self.island(first).need();
            if self.island(second).need() != need || need > self.river(river).to_give {
                continue;
            }
            changed |= self.cap_to_give(river, need.saturating_sub(1));
        }

        changed
    }

    /// For each pair of empty rivers at an island, look for an island crossed by both whose other rivers
    /// cannot meet its need. Only one of the pair can then carry bridges, and the rest of the first island's
    /// need is forced onto its other rivers.
    pub fn bad_corners(&mut self) -> bool {
        let mut changed = false;

        for island in self.island_ids().collect_vec() {
            let island_ref = self.island(island);
            if island_ref.is_complete() || island_ref.live_rivers.len() < 2 {
                continue;
            }
            let empty_rivers = island_ref.live_rivers.iter()
                .copied()
                .filter(|river| self.river(*river).bridges == 0)
                .collect_vec();
            if empty_rivers.len() < 2 {
                continue;
            }

            for (first, second) in empty_rivers.into_iter().tuple_combinations() {
                let hit_by_first = self.crossed_islands(first);
                let hit_by_second = self.crossed_islands(second);

                for hit in hit_by_first.intersection(&hit_by_second) {
                    let hit_ref = self.island(*hit);
                    let left_after_corner: u8 = hit_ref.live_rivers.iter()
                        .filter(|river| !self.river(first).crosses(**river) && !self.river(second).crosses(**river))
                        .map(|river| self.river(*river).to_give)
                        .sum();
                    if left_after_corner >= hit_ref.need() {
                        continue;
                    }

                    // both corner rivers can't carry bridges, so the corner gives at most the larger of the two
                    let corner_max = self.river(first).to_give.max(self.river(second).to_give);
                    let others = self.island(island).live_rivers.iter()
                        .copied()
                        .filter(|river| *river != first && *river != second)
                        .collect_vec();
                    let required = i32::from(self.island(island).need()) - i32::from(corner_max);

                    if self.must_provide(&others, required) {
                        changed = true;
                        break;
                    }
                }
            }
        }

        changed
    }

    /// Endpoints of every river crossing `river`.
    fn crossed_islands(&self, river: RiverId) -> BTreeSet<IslandId> {
        self.river(river).crossings.iter()
            .flat_map(|crossing| {
                let (a, b) = self.river(*crossing).endpoints();
                [a, b]
            })
            .collect()
    }
}

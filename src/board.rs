use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use thiserror::Error;
use tracing::trace;
use unordered_pair::UnorderedPair;

use crate::cluster::{Cluster, ClusterId};
use crate::island::Island;
use crate::location::{cells_between, Dimension, Location};
use crate::river::{River, RiverSpan};
use crate::shape::{Direction, Orientation};

/// Stable handle of an island for the lifetime of a [`Board`] and all of its clones.
pub type IslandId = NodeIndex;
/// Stable handle of a river for the lifetime of a [`Board`] and all of its clones.
pub type RiverId = EdgeIndex;

/// Reasons a bridge may not be placed.
///
/// This is recoverable; speculative search treats it as evidence that a hypothesis is impossible.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum CapacityExceeded {
    /// The river is at its max, closed by a crossing, or would overfill an endpoint.
    #[error("river {0} has no more bridges to give")]
    Saturated(RiverSpan),
    /// No river joins the two islands.
    #[error("islands at {0} and {1} are not adjacent")]
    NotAdjacent(Location, Location),
}

/// A Hashiwokakero board: islands, the rivers between them, and the current partition into clusters.
///
/// The graph is an arena; [`IslandId`]s and [`RiverId`]s index straight into it and survive [`Clone`],
/// so a handle taken on one board addresses the same island or river on any clone of it.
/// Clones share nothing mutable with the original.
///
/// [`Board`]s should be built using a [`BoardBuilder`](crate::builder::BoardBuilder) or parsed from text.
#[derive(Clone)]
pub struct Board {
    pub(crate) graph: UnGraph<Island, River>,
    // row-major, indexed by Location::as_index
    pub(crate) grid: Array2<Option<IslandId>>,
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) clusters: BTreeMap<ClusterId, Cluster>,
    pub(crate) river_index: HashMap<UnorderedPair<IslandId>, RiverId>,
}

impl Board {
    /// Lay out islands from `cells` and generate every river and crossing between them.
    pub(crate) fn from_cells(dims: (Dimension, Dimension), cells: &Array2<Option<u8>>) -> Self {
        let island_count = cells.iter().flatten().count();
        let mut graph = UnGraph::with_capacity(
            island_count,
            // at most two forward rivers per island
            2 * island_count,
        );
        let mut grid = Array2::from_elem(cells.raw_dim(), None);
        let mut clusters = BTreeMap::new();

        for (index, target) in cells.indexed_iter() {
            let Some(target) = *target else { continue };
            let cluster = ClusterId(graph.node_count());
            let island = graph.add_node(Island::new(Location::from(index), target, cluster));
            grid[index] = Some(island);
            clusters.insert(cluster, Cluster::singleton(island));
        }

        let mut board = Self {
            graph,
            grid,
            dims,
            clusters,
            river_index: HashMap::with_capacity(2 * island_count),
        };
        board.create_rivers();
        board
    }

    fn create_rivers(&mut self) {
        // horizontal rivers all come first, then vertical ones
        for direction in Direction::FORWARD_VARIANTS {
            for island in self.island_ids().collect_vec() {
                if let Some(other) = self.scan(self.graph[island].location, *direction) {
                    self.create_river(island, other, direction.orientation());
                }
            }
        }

        let verticals = self.river_ids()
            .filter(|river| self.graph[*river].orientation == Orientation::Vertical)
            .collect_vec();
        for vertical in verticals {
            let span = self.span(vertical);
            for cell in cells_between(span.from, span.to) {
                if let Some(horizontal) = self.horizontal_river_through(cell) {
                    self.graph[horizontal].crossings.push(vertical);
                    self.graph[vertical].crossings.push(horizontal);
                }
            }
        }
    }

    fn create_river(&mut self, a: IslandId, b: IslandId, orientation: Orientation) -> RiverId {
        let to_give = self.graph[a].target.min(self.graph[b].target);
        let river = self.graph.add_edge(a, b, River::new(UnorderedPair(a, b), orientation, to_give));
        self.graph[a].rivers.push(river);
        self.graph[b].rivers.push(river);
        self.river_index.insert(UnorderedPair(a, b), river);
        self.update(a);
        self.update(b);
        river
    }

    /// Walk from `from` in `direction` and return the first island met, if any.
    fn scan(&self, from: Location, direction: Direction) -> Option<IslandId> {
        let mut location = direction.attempt_from(from);
        // stepping off the board wraps out of bounds, so this always ends
        while let Some(cell) = self.grid.get(location.as_index()) {
            if let Some(island) = cell {
                return Some(*island);
            }
            location = direction.attempt_from(location);
        }
        None
    }

    fn horizontal_river_through(&self, cell: Location) -> Option<RiverId> {
        let left = self.scan(cell, Direction::Left)?;
        let right = self.scan(cell, Direction::Right)?;
        self.river_with(left, right)
    }

    /// Recompute `start` from its incident rivers, then every island whose rivers were tightened as a result.
    ///
    /// Each river's remaining capacity is capped at the remaining need of both endpoints;
    /// a river tightened here queues its other endpoint, until nothing changes.
    pub(crate) fn update(&mut self, start: IslandId) {
        let mut pending = VecDeque::from([start]);

        while let Some(island) = pending.pop_front() {
            let rivers = self.graph[island].rivers.clone();
            let bridges: u8 = rivers.iter().map(|river| self.graph[*river].bridges).sum();
            self.graph[island].bridges = bridges;
            let need = self.graph[island].need();

            let mut live_rivers = Vec::with_capacity(rivers.len());
            let mut available = 0;
            for river in rivers {
                let river_ref = &mut self.graph[river];
                if river_ref.to_give > need {
                    river_ref.to_give = need;
                    pending.push_back(river_ref.neighbor(island));
                }
                if river_ref.to_give > 0 {
                    live_rivers.push(river);
                    available += river_ref.to_give;
                }
            }

            let island_ref = &mut self.graph[island];
            island_ref.live_rivers = live_rivers;
            island_ref.available = available;
        }
    }

    /// Place one bridge on `river`.
    ///
    /// Joins the endpoints' clusters and closes every crossing river for good.
    pub fn add_bridge(&mut self, river: RiverId) -> Result<(), CapacityExceeded> {
        let river_ref = &mut self.graph[river];
        if river_ref.to_give < 1 || river_ref.bridges >= river_ref.max {
            return Err(CapacityExceeded::Saturated(self.span(river)));
        }
        river_ref.bridges += 1;
        river_ref.to_give -= 1;
        let UnorderedPair(a, b) = river_ref.endpoints;
        let crossings = river_ref.crossings.clone();
        trace!(
            river = %self.span(river),
            orientation = %self.graph[river].orientation,
            bridges = self.graph[river].bridges,
            "bridge placed",
        );

        self.update(a);
        self.update(b);
        self.join_clusters(self.graph[a].cluster, self.graph[b].cluster);
        for crossing in crossings {
            self.set_to_give(crossing, 0);
        }

        Ok(())
    }

    /// Place one bridge on the river between `a` and `b`.
    pub fn add_bridge_between(&mut self, a: IslandId, b: IslandId) -> Result<(), CapacityExceeded> {
        match self.river_with(a, b) {
            Some(river) => self.add_bridge(river),
            None => Err(CapacityExceeded::NotAdjacent(self.graph[a].location, self.graph[b].location)),
        }
    }

    /// Lower the remaining capacity of `river` to exactly `count`, which must not exceed what it has now.
    pub(crate) fn set_to_give(&mut self, river: RiverId, count: u8) {
        let river_ref = &mut self.graph[river];
        river_ref.to_give = count.min(river_ref.to_give);
        let UnorderedPair(a, b) = river_ref.endpoints;
        trace!(river = %self.span(river), to_give = count, "capacity set");

        self.update(a);
        self.update(b);
    }

    /// Lower the remaining capacity of `river` to at most `max`, returning whether it changed.
    pub fn cap_to_give(&mut self, river: RiverId, max: u8) -> bool {
        if self.graph[river].to_give > max {
            self.set_to_give(river, max);
            true
        } else {
            false
        }
    }

    fn join_clusters(&mut self, a: ClusterId, b: ClusterId) -> bool {
        if a == b {
            return false;
        }

        let size_of = |id: ClusterId| self.clusters.get(&id).map_or(0, Cluster::size);
        let (kept, absorbed) = if size_of(a) >= size_of(b) { (a, b) } else { (b, a) };
        let Some(absorbed_cluster) = self.clusters.remove(&absorbed) else {
            return false;
        };

        for island in absorbed_cluster.members() {
            self.graph[*island].cluster = kept;
        }
        if let Some(kept_cluster) = self.clusters.get_mut(&kept) {
            kept_cluster.absorb(absorbed_cluster);
        }

        true
    }

    /// Board dimensions, `(width, height)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// # Panics
    /// If `island` does not belong to this board or one it was cloned from.
    pub fn island(&self, island: IslandId) -> &Island {
        &self.graph[island]
    }

    /// # Panics
    /// If `river` does not belong to this board or one it was cloned from.
    pub fn river(&self, river: RiverId) -> &River {
        &self.graph[river]
    }

    /// Islands in row-major order.
    pub fn island_ids(&self) -> impl Iterator<Item = IslandId> {
        self.graph.node_indices()
    }

    /// Rivers in creation order: every horizontal river, then every vertical one.
    pub fn river_ids(&self) -> impl Iterator<Item = RiverId> {
        self.graph.edge_indices()
    }

    /// Every island, in the order of [`island_ids`](Self::island_ids).
    pub fn islands(&self) -> impl Iterator<Item = &Island> {
        self.graph.node_indices().map(|island| &self.graph[island])
    }

    /// Every river, in the order of [`river_ids`](Self::river_ids).
    pub fn rivers(&self) -> impl Iterator<Item = &River> {
        self.graph.edge_indices().map(|river| &self.graph[river])
    }

    /// The island at `location`, or `None` for open water or a location off the board.
    pub fn island_at(&self, location: Location) -> Option<IslandId> {
        self.grid.get(location.as_index()).copied().flatten()
    }

    /// The river joining `a` and `b`, if they are adjacent.
    pub fn river_with(&self, a: IslandId, b: IslandId) -> Option<RiverId> {
        self.river_index.get(&UnorderedPair(a, b)).copied()
    }

    /// The end of `river` which is not `island`.
    pub fn neighbor(&self, river: RiverId, island: IslandId) -> IslandId {
        self.graph[river].neighbor(island)
    }

    /// The nearest island from `island` in `direction`, which is joined to it by a river.
    pub fn island_towards(&self, island: IslandId, direction: Direction) -> Option<IslandId> {
        self.scan(self.graph[island].location, direction)
    }

    /// The locations at either end of `river`.
    pub fn span(&self, river: RiverId) -> RiverSpan {
        let UnorderedPair(a, b) = self.graph[river].endpoints;
        RiverSpan { from: self.graph[a].location, to: self.graph[b].location }
    }

    /// Every cluster with its id, in id order.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &Cluster)> {
        self.clusters.iter().map(|(id, cluster)| (*id, cluster))
    }

    /// The cluster labelled `cluster`, if it has not been absorbed into another.
    pub fn cluster(&self, cluster: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&cluster)
    }

    /// The number of connected components; 1 once the board is connected.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// The cluster `island` currently belongs to.
    pub fn cluster_of(&self, island: IslandId) -> ClusterId {
        self.graph[island].cluster
    }

    /// Members of `cluster` with a live river leading out of it.
    ///
    /// A cluster without any such island can never grow.
    pub fn cluster_edges(&self, cluster: ClusterId) -> Vec<IslandId> {
        self.clusters.get(&cluster).map_or_else(Vec::new, |c| c.members().iter()
            .copied()
            .filter(|island| self.graph[*island].live_rivers.iter()
                .any(|river| self.graph[self.neighbor(*river, *island)].cluster != cluster))
            .collect())
    }

    /// Members of `cluster` which still need bridges.
    pub fn incomplete_islands(&self, cluster: ClusterId) -> Vec<IslandId> {
        self.clusters.get(&cluster).map_or_else(Vec::new, |c| c.members().iter()
            .copied()
            .filter(|island| !self.graph[*island].is_complete())
            .collect())
    }
}

fn bridge_glyph(orientation: Orientation, bridges: u8) -> char {
    match (orientation, bridges) {
        (Orientation::Horizontal, 1) => '-',
        (Orientation::Horizontal, _) => '=',
        (Orientation::Vertical, 1) => '|',
        (Orientation::Vertical, _) => '"',
    }
}

// two bridges drawn over one cell only happens on a broken board, but it should still be visible
fn overlay(existing: char, glyph: char) -> char {
    match (existing, glyph) {
        ('-', '|') | ('|', '-') => '+',
        ('=', '|') | ('|', '=') => 'F',
        ('-', '"') | ('"', '-') => 'H',
        ('=', '"') | ('"', '=') => '#',
        _ => glyph,
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut cells = self.grid.map(|cell| match cell {
            Some(island) => char::from(b'0' + self.graph[*island].target),
            None => '.',
        });

        for river in self.river_ids().filter(|river| self.graph[*river].bridges > 0) {
            let span = self.span(river);
            let glyph = bridge_glyph(self.graph[river].orientation, self.graph[river].bridges);
            for location in cells_between(span.from, span.to) {
                let cell = &mut cells[location.as_index()];
                *cell = overlay(*cell, glyph);
            }
        }

        let mut out = String::with_capacity(cells.nrows() * (cells.ncols() + 1));
        for row in cells.rows() {
            out.extend(row.iter());
            out.push('\n');
        }

        if f.alternate() {
            out.push_str(&format!("Clusters ({})\n", self.clusters.len()));
            for (id, cluster) in self.clusters() {
                out.push_str(&format!(
                    "{} of size {}: {} edges: [{}]\n",
                    id,
                    cluster.size(),
                    cluster.members().iter().map(|island| self.graph[*island].to_string()).join(" "),
                    self.cluster_edges(id).iter().map(|island| self.graph[*island].location).join(", "),
                ));
            }
        }

        write!(f, "{}", out)
    }
}

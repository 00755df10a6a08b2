#![warn(missing_docs)]

//! # `hashiwokakero`
//!
//! A solver for [Hashiwokakero](https://en.wikipedia.org/wiki/Hashiwokakero), also known as "Bridges".
//! Begin by building a board with a [`BoardBuilder`](builder::BoardBuilder) or parsing one from text with [`builder::parse`].
//! Then call [`solve()`](crate::Board::solve), consuming the board and yielding it back as far as it could be solved,
//! along with a [`Verdict`].
//!
//! # Internals
//! The board is an undirected graph G. A vertex is an island and carries its target; an edge is a river,
//! the open water between two islands in the same row or column with no island in between.
//! Every river tracks its bridges and its remaining capacity, the number of bridges it could still take
//! without exceeding two or the remaining need of either endpoint.
//! Rivers which geometrically cross are linked, and placing a bridge on one closes the others for good.
//!
//! Capacity only ever shrinks and bridges only ever grow.
//! Whenever a river changes, its endpoints are recomputed, which may in turn tighten their other rivers,
//! and so on until nothing changes. Every deduction is built on this.
//!
//! A high level overview of solving is as follows:
//! 1. Run the propagation [`Rule`]s over the whole board until a pass changes nothing.
//! After every pass, look for a contradiction and stop if one turns up.
//! 2. Once stuck, try [`Rule::BadCorners`].
//! 3. If still stuck, test a single hypothesis about one river (no more bridges, or every bridge it can take)
//! on a copy of the board, propagated without guessing. A hypothesis leading to a contradiction is refuted
//! and its negation is applied to the real board; then go back to 1.
//!
//! Connected components are tracked as bridges are placed, so "this move would strand a group of islands"
//! is a cheap question to ask.

pub use board::{Board, CapacityExceeded, IslandId, RiverId};
pub use builder::{BoardBuilder, ConstructionError};
pub use cluster::{Cluster, ClusterId};
pub use guess::{Guess, Hypothesis, HypothesisKind};
pub use island::Island;
pub use location::{Dimension, Location};
pub use river::{River, RiverSpan, MAX_BRIDGES};
pub use rules::Rule;
pub use shape::{Direction, Orientation};
pub use solver::{SolveEvent, SolveOutcome, SolveStats, Solver, Verdict};
pub use verify::{Contradiction, Unsolved};

// leaves first: geometry, then graph weights, then the board and everything built on it
pub(crate) mod location;
pub mod shape;
pub(crate) mod cluster;
pub(crate) mod island;
pub(crate) mod river;
pub(crate) mod board;
pub mod builder;
pub(crate) mod verify;
pub(crate) mod rules;
pub(crate) mod guess;
pub(crate) mod solver;
#[cfg(feature = "wasm")]
mod wasm;
mod tests;

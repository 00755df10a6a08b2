use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::{debug, debug_span, trace};

use crate::board::{Board, CapacityExceeded, RiverId};
use crate::solver::{SolveStats, Solver};

/// One of the two boundary assumptions that can be made about a river.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HypothesisKind {
    /// The river carries no more bridges.
    Forbid,
    /// The river takes every bridge it still can.
    Saturate,
}

/// A tentative assumption about a single river, to be tested on a copy of the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Hypothesis {
    /// The river assumed about.
    pub river: RiverId,
    /// What is assumed.
    pub kind: HypothesisKind,
}

impl Display for Hypothesis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HypothesisKind::Forbid => write!(f, "forbid river {}", self.river.index()),
            HypothesisKind::Saturate => write!(f, "saturate river {}", self.river.index()),
        }
    }
}

/// The result of one round of speculative search.
#[derive(Copy, Clone, Debug, Default)]
pub struct Guess {
    /// The refuted hypothesis whose negation was applied to the board, if any.
    pub committed: Option<Hypothesis>,
    /// How many hypotheses were tested.
    pub trials: usize,
    /// Time spent copying the board for trials. Only measured when asked for; zero otherwise.
    pub cloning: Duration,
}

impl Board {
    /// A copy of this board with `hypothesis` applied. `self` is left untouched.
    ///
    /// Fails if the hypothesis cannot even be applied.
    pub fn with_hypothesis(&self, hypothesis: Hypothesis) -> Result<Board, CapacityExceeded> {
        self.clone().assuming(hypothesis)
    }

    fn assuming(mut self, hypothesis: Hypothesis) -> Result<Board, CapacityExceeded> {
        match hypothesis.kind {
            HypothesisKind::Forbid => {
                self.cap_to_give(hypothesis.river, 0);
            }
            HypothesisKind::Saturate => {
                for _ in 0..self.river(hypothesis.river).to_give {
                    self.add_bridge(hypothesis.river)?;
                }
            }
        }
        Ok(self)
    }

    /// Whether `hypothesis` leads to a contradiction once propagated to a fixpoint, without guessing.
    pub fn refutes(&self, hypothesis: Hypothesis) -> bool {
        self.clone().refuted_on_copy(hypothesis)
    }

    // `self` is already a scratch copy
    fn refuted_on_copy(self, hypothesis: Hypothesis) -> bool {
        let Ok(mut trial) = self.assuming(hypothesis) else {
            return true;
        };
        Solver::new()
            .allow_guessing(false)
            .propagate(&mut trial, &mut SolveStats::default());
        trial.has_mistakes()
    }

    /// Try both boundary hypotheses on each live river of each incomplete island,
    /// and apply the negation of the first one refuted.
    ///
    /// At most one change is made per call.
    pub fn make_a_guess(&mut self) -> Guess {
        self.guess(false)
    }

    /// [`make_a_guess`](Self::make_a_guess), measuring the time spent cloning if `timed`.
    pub(crate) fn guess(&mut self, timed: bool) -> Guess {
        let _span = debug_span!("make_a_guess").entered();
        let mut trials = 0;
        let mut cloning = Duration::ZERO;

        let incomplete = self.island_ids()
            .filter(|island| !self.island(*island).is_complete())
            .collect_vec();
        for island in incomplete {
            for kind in [HypothesisKind::Forbid, HypothesisKind::Saturate] {
                for river in self.island(island).live_rivers.clone() {
                    let hypothesis = Hypothesis { river, kind };
                    trials += 1;

                    let started = timed.then(Instant::now);
                    let scratch = self.clone();
                    if let Some(started) = started {
                        cloning += started.elapsed();
                    }
                    if !scratch.refuted_on_copy(hypothesis) {
                        continue;
                    }

                    trace!(%hypothesis, span = %self.span(river), "hypothesis refuted");
                    let committed = match kind {
                        HypothesisKind::Forbid => self.add_bridge(river).is_ok(),
                        HypothesisKind::Saturate => {
                            let to_give = self.river(river).to_give;
                            self.cap_to_give(river, to_give.saturating_sub(1))
                        }
                    };
                    if committed {
                        debug!(%hypothesis, trials, "guess committed");
                        return Guess { committed: Some(hypothesis), trials, cloning };
                    }
                }
            }
        }

        debug!(trials, "no hypothesis refuted");
        Guess { committed: None, trials, cloning }
    }
}

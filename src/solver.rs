use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::debug;

use crate::board::Board;
use crate::guess::Hypothesis;
use crate::rules::Rule;
use crate::verify::{Contradiction, Unsolved};

/// Things that happen while solving, as reported to an observer registered with [`Solver::observer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolveEvent {
    /// `rule` changed the board.
    RuleFired {
        /// The rule.
        rule: Rule,
    },
    /// A speculative trial refuted `hypothesis`, and its negation was applied.
    GuessCommitted {
        /// The refuted hypothesis.
        hypothesis: Hypothesis,
    },
    /// Propagation stopped because the board can no longer be solved.
    ContradictionFound {
        /// The first contradiction found.
        contradiction: Contradiction,
    },
    /// Pass number `pass` (from 1) finished.
    PassCompleted {
        /// The pass number.
        pass: usize,
    },
}

/// How a solve ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// Every condition of a solution holds.
    Solved,
    /// The board reached a state no solution can come from.
    Contradiction(Contradiction),
    /// Nothing more could be deduced, and the board is not solved.
    Stalled(Unsolved),
}

impl Verdict {
    /// Whether this is [`Verdict::Solved`].
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solved => write!(f, "solved"),
            Self::Contradiction(contradiction) => write!(f, "contradiction ({})", contradiction),
            Self::Stalled(unsolved) => write!(f, "stalled ({})", unsolved),
        }
    }
}

/// Counters collected over one solve.
///
/// The durations are only measured by a [`Solver::timed`] solver and are zero otherwise.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SolveStats {
    /// Propagation passes run, counting the last one which changed nothing.
    pub passes: usize,
    /// Times each rule changed the board. Rules which never did are absent.
    pub firings: BTreeMap<Rule, usize>,
    /// Hypotheses tested on board copies; each one costs a full clone and propagation.
    pub trials: usize,
    /// Refuted hypotheses whose negation was applied.
    pub guesses: usize,
    /// Wall time of the whole solve.
    pub elapsed: Duration,
    /// Time spent in speculative search, trials included.
    pub guessing: Duration,
    /// Time spent copying the board for trials; part of `guessing`.
    pub cloning: Duration,
}

impl SolveStats {
    /// How many times `rule` changed the board.
    pub fn firings_of(&self, rule: Rule) -> usize {
        self.firings.get(&rule).copied().unwrap_or(0)
    }

    fn record(&mut self, rule: Rule) {
        *self.firings.entry(rule).or_default() += 1;
    }

    /// The measured durations, one per line.
    pub fn profile(&self) -> String {
        format!(
            "solve: {:?}\nspeculative search: {:?}\nclone board: {:?}\n",
            self.elapsed,
            self.guessing,
            self.cloning,
        )
    }
}

impl Display for SolveStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passes, {} trials, {} guesses; {}",
            self.passes,
            self.trials,
            self.guesses,
            self.firings.iter().map(|(rule, count)| format!("{}: {}", rule, count)).join(", "),
        )
    }
}

/// The result of [`Solver::solve`]. The board is always handed back, however far it got.
pub struct SolveOutcome {
    /// The board as far as it was solved.
    pub board: Board,
    /// How solving ended.
    pub verdict: Verdict,
    /// What it took to get there.
    pub stats: SolveStats,
}

/// Drives the rules in [`Rule`] to a fixpoint, falling back to speculative search when allowed.
///
/// ```ignore
/// let outcome = Solver::new()
///     .allow_guessing(false)
///     .observer(|event| println!("{:?}", event))
///     .solve(board);
/// ```
pub struct Solver<'a> {
    allow_guessing: bool,
    timed: bool,
    observer: Option<Box<dyn FnMut(&SolveEvent) + 'a>>,
}

impl Default for Solver<'_> {
    fn default() -> Self {
        Self {
            allow_guessing: true,
            timed: false,
            observer: None,
        }
    }
}

impl<'a> Solver<'a> {
    /// A solver with guessing allowed and no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`Rule::MakeAGuess`] may run once the other rules are exhausted. On by default.
    pub fn allow_guessing(mut self, allow: bool) -> Self {
        self.allow_guessing = allow;
        self
    }

    /// Whether to measure the durations in [`SolveStats`]. Off by default.
    ///
    /// The clock is not read at all unless this is on, as some targets (`wasm32-unknown-unknown`) have none.
    pub fn timed(mut self, timed: bool) -> Self {
        self.timed = timed;
        self
    }

    /// Register a callback to receive every [`SolveEvent`].
    pub fn observer(mut self, observer: impl FnMut(&SolveEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn emit(&mut self, event: SolveEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Solve `board` as far as possible, consuming it and handing it back alongside a [`Verdict`].
    pub fn solve(&mut self, mut board: Board) -> SolveOutcome {
        let started = self.timed.then(Instant::now);
        let mut stats = SolveStats::default();
        self.propagate(&mut board, &mut stats);

        let verdict = match board.verify() {
            Ok(()) => Verdict::Solved,
            Err(unsolved) => match board.check_mistakes() {
                Err(contradiction) => Verdict::Contradiction(contradiction),
                Ok(()) => Verdict::Stalled(unsolved),
            },
        };
        if let Some(started) = started {
            stats.elapsed = started.elapsed();
        }
        debug!(%verdict, %stats, "solve finished");

        SolveOutcome { board, verdict, stats }
    }

    /// Run passes until one changes nothing or a contradiction shows up.
    ///
    /// Every pass runs [`Rule::PROPAGATION`]; [`Rule::BadCorners`] and then guessing are tried only on passes where those did nothing.
    pub(crate) fn propagate(&mut self, board: &mut Board, stats: &mut SolveStats) {
        loop {
            stats.passes += 1;

            let mut changed = false;
            for rule in Rule::PROPAGATION {
                changed |= self.fire(*rule, board, stats);
            }

            if let Err(contradiction) = board.check_mistakes() {
                debug!(%contradiction, pass = stats.passes, "contradiction");
                self.emit(SolveEvent::ContradictionFound { contradiction });
                return;
            }

            if !changed {
                changed = self.fire(Rule::BadCorners, board, stats);
            }
            if !changed && self.allow_guessing {
                changed = self.fire(Rule::MakeAGuess, board, stats);
            }

            self.emit(SolveEvent::PassCompleted { pass: stats.passes });
            if !changed {
                return;
            }
        }
    }

    fn fire(&mut self, rule: Rule, board: &mut Board, stats: &mut SolveStats) -> bool {
        let changed = if rule.is_speculative() {
            let started = self.timed.then(Instant::now);
            let guess = board.guess(self.timed);
            if let Some(started) = started {
                stats.guessing += started.elapsed();
            }
            stats.cloning += guess.cloning;
            stats.trials += guess.trials;
            if let Some(hypothesis) = guess.committed {
                stats.guesses += 1;
                self.emit(SolveEvent::GuessCommitted { hypothesis });
            }
            guess.committed.is_some()
        } else {
            board.apply(rule)
        };

        if changed {
            debug!(%rule, pass = stats.passes, "rule fired");
            stats.record(rule);
            self.emit(SolveEvent::RuleFired { rule });
        }
        changed
    }
}

impl Board {
    /// Solve with the default [`Solver`], consuming this board and handing it back alongside a [`Verdict`].
    pub fn solve(self) -> SolveOutcome {
        Solver::new().solve(self)
    }
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use hashiwokakero::{Board, Solver};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Solve a Hashiwokakero puzzle.
///
/// The puzzle file has one line per row: `1` through `8` for islands and any other character for water.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Puzzle file to solve.
    puzzle: PathBuf,
    /// Stop at the deductive fixpoint instead of testing hypotheses on scratch boards.
    #[arg(long)]
    no_guess: bool,
    /// Also list every cluster of the final board.
    #[arg(long)]
    clusters: bool,
    /// Print rule and guessing statistics, and an execution time profile.
    #[arg(short = 't', long)]
    stats: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let loading = Instant::now();
    let text = fs::read_to_string(&args.puzzle)
        .with_context(|| format!("error reading {}", args.puzzle.display()))?;
    let board: Board = text.parse()
        .with_context(|| format!("error loading {}", args.puzzle.display()))?;
    let loaded = loading.elapsed();
    info!(
        puzzle = %args.puzzle.display(),
        islands = board.islands().count(),
        rivers = board.rivers().count(),
        "board loaded",
    );

    let outcome = Solver::new()
        .allow_guessing(!args.no_guess)
        .timed(args.stats)
        .solve(board);
    info!(verdict = %outcome.verdict, passes = outcome.stats.passes, "solve finished");

    if args.clusters {
        print!("{:#}", outcome.board);
    } else {
        print!("{}", outcome.board);
    }
    println!("Solved: {}", outcome.verdict);
    if args.stats {
        println!("{}", outcome.stats);
        println!("load board: {:?}", loaded);
        print!("{}", outcome.stats.profile());
    }

    Ok(if outcome.verdict.is_solved() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

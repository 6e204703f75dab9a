//! Headless autoplay runner (default binary).
//!
//! Drives the engine through its pull-based API the same way an animated
//! client would: ask for a hint, click both cells, then call `advance()` once
//! per cascade step until the turn settles. Output is either a text board per
//! turn or one JSON object per phase transition.
//!
//! Set `RUST_LOG=debug` to see the engine's own decisions.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use match3::core::{EngineConfig, GameState, Match3Error, OverlapPolicy, ScoringRule};
use match3::types::{Phase, PhaseTransitionEvent, SelectOutcome};

/// Scoring rule selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scoring {
    Multiplier,
    Additive,
}

/// Play a match-3 board by always taking the first available move.
#[derive(Parser, Debug)]
#[command(author, version, about = "Headless match-3 autoplay driver")]
struct Args {
    /// RNG seed for board generation and refills
    #[arg(short, long, default_value_t = 1)]
    seed: u32,

    /// Board rows
    #[arg(long, default_value_t = 8)]
    rows: usize,

    /// Board columns
    #[arg(long, default_value_t = 8)]
    cols: usize,

    /// Number of gem kinds in play (3-8)
    #[arg(short, long, default_value_t = 6)]
    gems: u8,

    /// Stop after this many accepted swaps
    #[arg(short, long, default_value_t = 20)]
    moves: u32,

    /// Scoring rule
    #[arg(long, value_enum, default_value_t = Scoring::Multiplier)]
    scoring: Scoring,

    /// Count a gem shared by two groups only once
    #[arg(long)]
    distinct: bool,

    /// Emit one JSON object per phase transition instead of text boards
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> EngineConfig {
        let scoring = match self.scoring {
            Scoring::Multiplier => ScoringRule::default(),
            Scoring::Additive => ScoringRule::additive(),
        };
        let overlap = if self.distinct {
            OverlapPolicy::Distinct
        } else {
            OverlapPolicy::PerGroup
        };
        EngineConfig::new(self.rows, self.cols, self.gems)
            .with_scoring(scoring)
            .with_overlap(overlap)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut game = GameState::new(args.config(), args.seed)
        .with_context(|| format!("cannot start a game with {:?}", args))?;

    if !args.json {
        println!("seed {}\n{}", args.seed, game.board());
    }

    while game.moves() < args.moves {
        let Some((a, b)) = game.get_hint() else {
            break;
        };
        game.handle_select(a.row, a.col)?;
        if game.handle_select(b.row, b.col)? != SelectOutcome::SwapAccepted {
            bail!("engine rejected its own hint {:?} <-> {:?}", a, b);
        }

        let before = game.score();
        let mut passes = 0;
        while game.phase().is_resolving() {
            match game.advance() {
                Ok(event) => {
                    if event.phase == Phase::Matching {
                        passes = event.combo_index;
                    }
                    if args.json {
                        emit(&event)?;
                    }
                }
                Err(Match3Error::ResolutionBudgetExceeded(limit)) => {
                    warn!("Turn abandoned after {} cascade passes", limit);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !args.json {
            println!(
                "move {}: ({}, {}) <-> ({}, {})  +{} over {} pass(es)\n{}",
                game.moves(),
                a.row,
                a.col,
                b.row,
                b.col,
                game.score() - before,
                passes,
                game.board()
            );
        }
    }

    let snapshot = game.snapshot();
    if args.json {
        println!("{}", serde_json::to_string(&snapshot)?);
    } else {
        println!(
            "final score {} after {} moves{}",
            snapshot.session.score,
            snapshot.session.moves,
            if game.game_over() { " (no moves left)" } else { "" }
        );
    }
    info!("Autoplay finished in phase {}", game.phase().as_str());
    Ok(())
}

fn emit(event: &PhaseTransitionEvent) -> Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

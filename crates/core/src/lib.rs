//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains the board rules, match detection, cascade resolution,
//! scoring and the turn state machine. It has **no dependencies** on rendering,
//! timing, or I/O, making it:
//!
//! - **Deterministic**: Same seed and same inputs produce identical games
//! - **Testable**: Every rule can be exercised on a hand-built board
//! - **Portable**: Runs under an animated client, a test, or a headless driver
//! - **Clock-free**: The host decides when each cascade step happens
//!
//! # Module Structure
//!
//! - [`board`]: `rows x cols` gem grid with swap, gravity, refill and move search
//! - [`matcher`]: Run-length match detection and the local per-cell query
//! - [`cascade`]: Remove, drop, refill, re-detect until the board is stable
//! - [`scoring`]: Points per pass with combo scaling
//! - [`game_state`]: Selection handling and the phase-by-phase turn machine
//! - [`rng`]: Seedable random source for generation and refills
//! - [`snapshot`]: Owned copies of the game for renderers and traces
//!
//! # Game Rules
//!
//! - **Swaps**: Only edge-adjacent tiles may be exchanged, and only if the swap
//!   forms a run of at least three on either moved tile; otherwise it is undone
//! - **Cascades**: Matched tiles vanish, the columns compact downwards, empty
//!   slots at the top are refilled, and detection repeats until nothing matches
//! - **Combos**: Each further pass of the same turn is worth more
//! - **Game Over**: Reached when no single swap on the board can form a match
//!
//! # Example
//!
//! ```
//! use match3_core::GameState;
//! use match3_types::Phase;
//!
//! let mut game = GameState::initialize(8, 8, 6, 12345).unwrap();
//! assert_eq!(game.phase(), Phase::Idle);
//!
//! // Play whatever move the engine suggests
//! let (a, b) = game.get_hint().unwrap();
//! game.handle_swap(a, b).unwrap();
//!
//! // Step the cascade until the turn is over
//! while game.phase().is_resolving() {
//!     game.advance().unwrap();
//! }
//! assert!(game.score() > 0);
//! assert_eq!(game.moves(), 1);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod game_state;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use cascade::{CascadeResolver, CascadeSummary, MatchPass};
pub use config::EngineConfig;
pub use error::{Match3Error, Result};
pub use game_state::GameState;
pub use matcher::MatchDetector;
pub use rng::{RandomSource, SimpleRng};
pub use scoring::{calculate_score, OverlapPolicy, ScoreKeeper, ScoreResult, ScoringRule};
pub use snapshot::{BoardSnapshot, GameSnapshot};

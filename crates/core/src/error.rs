use thiserror::Error;

use crate::types::{Phase, Position};

/// Everything an engine operation can refuse.
///
/// Apart from `Configuration`, these are ordinary control-flow outcomes
/// (a misclick, a click during an animation) and never leave state modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Match3Error {
    #[error("position ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("({}, {}) and ({}, {}) are not edge neighbours", .a.row, .a.col, .b.row, .b.col)]
    NotAdjacent { a: Position, b: Position },
    #[error("operation not accepted while {}", .0.as_str())]
    InvalidPhase(Phase),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Internal-logic signal, not a player-facing error
    #[error("cascade did not settle within {0} passes")]
    ResolutionBudgetExceeded(u32),
}

pub type Result<T, E = Match3Error> = std::result::Result<T, E>;

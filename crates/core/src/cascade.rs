//! Cascade resolution - remove, drop, refill, re-detect until stable
//!
//! The resolver exposes each step of a pass separately so the game state can
//! surface them as distinct phases, and [`CascadeResolver::resolve`] runs the
//! whole loop at once for headless callers.
//!
//! Every turn is capped at `max_passes` non-empty matching passes. Random
//! refills can in principle keep producing matches forever; hitting the cap
//! returns [`Match3Error::ResolutionBudgetExceeded`] instead of spinning.

use std::collections::HashSet;

use log::{debug, error};

use crate::board::Board;
use crate::error::{Match3Error, Result};
use crate::matcher::MatchDetector;
use crate::rng::RandomSource;
use crate::scoring::{ScoreKeeper, ScoreResult};
use crate::types::{MatchGroup, Position, TileMove};

/// Outcome of one non-empty matching pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPass {
    pub groups: Vec<MatchGroup>,
    /// 1-based pass index within the current turn
    pub combo: u32,
    pub score: ScoreResult,
}

/// Totals for a cascade run to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeSummary {
    pub passes: u32,
    pub removed: u32,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct CascadeResolver {
    detector: MatchDetector,
    gem_types: u8,
    max_passes: u32,
    combo: u32,
    /// Groups from the last matching pass, waiting to be removed
    pending: Vec<MatchGroup>,
}

impl CascadeResolver {
    pub fn new(detector: MatchDetector, gem_types: u8, max_passes: u32) -> Self {
        Self {
            detector,
            gem_types,
            max_passes,
            combo: 0,
            pending: Vec::new(),
        }
    }

    pub fn detector(&self) -> &MatchDetector {
        &self.detector
    }

    /// Current combo index (0 when no cascade is running)
    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_passes(&self) -> u32 {
        self.max_passes
    }

    /// Forget any in-flight cascade
    pub fn reset(&mut self) {
        self.combo = 0;
        self.pending.clear();
    }

    /// Detect and score the next pass.
    ///
    /// `Ok(None)` means the board is stable; the combo resets to 0.
    pub fn match_pass(&mut self, board: &Board, keeper: &mut ScoreKeeper) -> Result<Option<MatchPass>> {
        let groups = self.detector.detect_all(board);
        if groups.is_empty() {
            self.reset();
            return Ok(None);
        }

        if self.combo >= self.max_passes {
            error!(
                "Cascade still matching after {} passes, abandoning turn",
                self.max_passes
            );
            self.reset();
            return Err(Match3Error::ResolutionBudgetExceeded(self.max_passes));
        }

        self.combo += 1;
        let score = keeper.award(&groups, self.combo);
        debug!(
            "Pass {}: {} groups, {} gems, +{}",
            self.combo,
            groups.len(),
            score.gems,
            score.total
        );

        self.pending = groups.clone();
        Ok(Some(MatchPass {
            groups,
            combo: self.combo,
            score,
        }))
    }

    /// Remove every tile in the pending groups, each cell once.
    ///
    /// Returns the cleared positions in group order.
    pub fn eliminate(&mut self, board: &mut Board) -> Vec<Position> {
        let removed = union_positions(&self.pending);
        self.pending.clear();
        board.remove_at(&removed);
        removed
    }

    pub fn fall(&self, board: &mut Board) -> Vec<TileMove> {
        board.apply_gravity()
    }

    pub fn refill<R: RandomSource>(&self, board: &mut Board, rng: &mut R) -> Vec<Position> {
        board.fill_empty_slots(self.gem_types, rng)
    }

    /// Run passes until the board is stable
    pub fn resolve<R: RandomSource>(
        &mut self,
        board: &mut Board,
        keeper: &mut ScoreKeeper,
        rng: &mut R,
    ) -> Result<CascadeSummary> {
        let mut summary = CascadeSummary::default();
        while let Some(pass) = self.match_pass(board, keeper)? {
            summary.passes = pass.combo;
            summary.score = summary.score.saturating_add(pass.score.total);
            summary.removed += self.eliminate(board).len() as u32;
            self.fall(board);
            self.refill(board, rng);
        }
        Ok(summary)
    }
}

/// Positions of all groups with duplicates dropped, first occurrence wins
pub fn union_positions(groups: &[MatchGroup]) -> Vec<Position> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|g| g.positions.iter().copied())
        .filter(|p| seen.insert(*p))
        .collect()
}

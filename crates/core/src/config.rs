//! Engine configuration
//!
//! Defaults follow the classic 8x8, six-gem layout. Every value is checked by
//! [`EngineConfig::validate`] before a board is built from it.

use serde::{Deserialize, Serialize};

use crate::error::{Match3Error, Result};
use crate::scoring::{OverlapPolicy, ScoringRule};
use crate::types::{
    GemKind, DEFAULT_COLS, DEFAULT_GEM_TYPES, DEFAULT_ROWS, MAX_CASCADE_PASSES, MAX_INIT_ATTEMPTS,
    MIN_DIMENSION, MIN_MATCH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub rows: usize,
    pub cols: usize,
    pub gem_types: u8,
    pub min_match: usize,
    pub max_cascade_passes: u32,
    pub max_init_attempts: u32,
    pub scoring: ScoringRule,
    pub overlap: OverlapPolicy,
}

impl EngineConfig {
    /// Board of the given size and palette, defaults for everything else
    pub fn new(rows: usize, cols: usize, gem_types: u8) -> Self {
        Self {
            rows,
            cols,
            gem_types,
            ..Self::default()
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringRule) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_min_match(mut self, min_match: usize) -> Self {
        self.min_match = min_match;
        self
    }

    pub fn with_max_cascade_passes(mut self, passes: u32) -> Self {
        self.max_cascade_passes = passes;
        self
    }

    /// Reject any configuration on which a match can never form
    pub fn validate(&self) -> Result<()> {
        if self.rows < MIN_DIMENSION || self.cols < MIN_DIMENSION {
            return Err(Match3Error::Configuration(format!(
                "board must be at least {MIN_DIMENSION}x{MIN_DIMENSION}, got {}x{}",
                self.rows, self.cols
            )));
        }
        if (self.gem_types as usize) < MIN_DIMENSION || self.gem_types as usize > GemKind::COUNT {
            return Err(Match3Error::Configuration(format!(
                "gem types must be in {MIN_DIMENSION}..={}, got {}",
                GemKind::COUNT,
                self.gem_types
            )));
        }
        let longest = self.rows.max(self.cols);
        if self.min_match < MIN_MATCH || self.min_match > longest {
            return Err(Match3Error::Configuration(format!(
                "match threshold must be in {MIN_MATCH}..={longest}, got {}",
                self.min_match
            )));
        }
        let flat = match self.scoring {
            ScoringRule::Multiplier {
                per_gem,
                combo_percent,
            } => per_gem == 0 || combo_percent == 0,
            ScoringRule::Additive { per_gem, per_combo } => per_gem == 0 || per_combo == 0,
        };
        if flat {
            // A zero term stops the score growing with gem count or combo
            return Err(Match3Error::Configuration(format!(
                "scoring terms must be positive, got {:?}",
                self.scoring
            )));
        }
        if self.max_cascade_passes == 0 {
            return Err(Match3Error::Configuration(
                "cascade pass budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            gem_types: DEFAULT_GEM_TYPES,
            min_match: MIN_MATCH,
            max_cascade_passes: MAX_CASCADE_PASSES,
            max_init_attempts: MAX_INIT_ATTEMPTS,
            scoring: ScoringRule::default(),
            overlap: OverlapPolicy::default(),
        }
    }
}

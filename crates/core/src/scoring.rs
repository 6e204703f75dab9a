//! Scoring module - points for matched gems and cascade combos
//!
//! Two rules are supported, both strictly increasing in gem count and combo index
//! as long as every term is positive (checked by `EngineConfig::validate`):
//! - `Multiplier`: `gems * per_gem`, scaled by `1 + (combo - 1) * combo_percent / 100`
//!   from the second pass of a cascade onwards.
//! - `Additive`: `gems * per_gem + combo * per_combo`.
//!
//! How a cell shared by a horizontal and a vertical run is counted is decided by
//! [`OverlapPolicy`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{
    MatchGroup, Position, ADDITIVE_COMBO_SCORE, ADDITIVE_GEM_SCORE, BASE_SCORE, COMBO_PERCENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "rule")]
pub enum ScoringRule {
    Multiplier { per_gem: u32, combo_percent: u32 },
    Additive { per_gem: u32, per_combo: u32 },
}

impl ScoringRule {
    /// Flat per-gem score plus a per-combo bonus
    pub fn additive() -> Self {
        ScoringRule::Additive {
            per_gem: ADDITIVE_GEM_SCORE,
            per_combo: ADDITIVE_COMBO_SCORE,
        }
    }
}

impl Default for ScoringRule {
    fn default() -> Self {
        ScoringRule::Multiplier {
            per_gem: BASE_SCORE,
            combo_percent: COMBO_PERCENT,
        }
    }
}

/// How gems shared by overlapping groups are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlapPolicy {
    /// Sum of group sizes; an intersection cell counts once per group
    #[default]
    PerGroup,
    /// Size of the union; an intersection cell counts once
    Distinct,
}

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Gems counted under the overlap policy
    pub gems: u32,
    /// Points before any combo scaling or bonus
    pub base: u32,
    /// Points added by the combo index
    pub combo_bonus: u32,
    pub total: u32,
}

/// Gems a pass is worth under `policy`
pub fn count_gems(groups: &[MatchGroup], policy: OverlapPolicy) -> u32 {
    match policy {
        OverlapPolicy::PerGroup => groups.iter().map(|g| g.len() as u32).sum(),
        OverlapPolicy::Distinct => groups
            .iter()
            .flat_map(|g| g.positions.iter().copied())
            .collect::<HashSet<Position>>()
            .len() as u32,
    }
}

/// Calculate the score for `gems` matched at 1-based `combo` index.
///
/// A combo of 0 is treated as 1.
pub fn calculate_score(gems: u32, combo: u32, rule: ScoringRule) -> ScoreResult {
    if gems == 0 {
        return ScoreResult::default();
    }
    let combo = combo.max(1);

    let (base, total) = match rule {
        ScoringRule::Multiplier {
            per_gem,
            combo_percent,
        } => {
            let base = gems.saturating_mul(per_gem);
            let percent = 100u64 + u64::from(combo - 1) * u64::from(combo_percent);
            let scaled = (u64::from(base) * percent / 100).min(u64::from(u32::MAX)) as u32;
            (base, scaled)
        }
        ScoringRule::Additive { per_gem, per_combo } => {
            let base = gems.saturating_mul(per_gem);
            (base, base.saturating_add(combo.saturating_mul(per_combo)))
        }
    };

    ScoreResult {
        gems,
        base,
        combo_bonus: total - base,
        total,
    }
}

/// Running session score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreKeeper {
    rule: ScoringRule,
    overlap: OverlapPolicy,
    score: u32,
}

impl ScoreKeeper {
    pub fn new(rule: ScoringRule, overlap: OverlapPolicy) -> Self {
        Self {
            rule,
            overlap,
            score: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rule(&self) -> ScoringRule {
        self.rule
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.overlap
    }

    /// Score one matching pass and add it to the total
    pub fn award(&mut self, groups: &[MatchGroup], combo: u32) -> ScoreResult {
        let result = calculate_score(count_gems(groups, self.overlap), combo, self.rule);
        self.score = self.score.saturating_add(result.total);
        result
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

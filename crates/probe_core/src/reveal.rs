//! Mission-log reveal cursor and reward-tier lookup.

use crate::RewardTier;
use serde::{Deserialize, Serialize};

/// Cursor over an outcome's mission log. The underlying outcome never
/// changes; only `shown` advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    pub shown: usize,
}

impl RevealState {
    /// Reveal the next entry. Returns true once every entry is shown.
    pub fn advance(&mut self, total: usize) -> bool {
        if self.shown < total {
            self.shown += 1;
        }
        self.is_finished(total)
    }

    pub fn is_finished(&self, total: usize) -> bool {
        self.shown >= total
    }
}

/// First tier whose `max_score` is at or above `score`; the top tier when
/// the score is above every bound.
pub fn reward_for_score(tiers: &[RewardTier], score: u32) -> &RewardTier {
    tiers
        .iter()
        .find(|tier| score <= tier.max_score)
        .unwrap_or_else(|| tiers.last().expect("reward tier table must not be empty"))
}

use serde::{Deserialize, Serialize};

use crate::models::quest::QuestId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLine {
    pub quest_id: QuestId,
    pub title: String,
    pub reward: u32,
}

/// Derived from a player's completions and the catalog at read time. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub total: u64,
    /// Catalog quests only, in completion order.
    pub breakdown: Vec<RewardLine>,
    /// Completed ids the catalog does not know. They count as zero.
    pub unrecognized: Vec<QuestId>,
}

impl RewardSummary {
    pub fn pairs(&self) -> Vec<(QuestId, u32)> {
        self.breakdown.iter().map(|l| (l.quest_id, l.reward)).collect()
    }
}

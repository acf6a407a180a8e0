// santaops-core/src/services/reward.rs

use santaops_common::models::{Player, RewardLine, RewardSummary};

use crate::catalog::QuestCatalog;

/// Joins a player's completions against the catalog.
///
/// Completion order drives the breakdown. Ids the catalog does not know are
/// reported in `unrecognized` and contribute nothing to `total`.
pub fn summarize(player: &Player, catalog: &QuestCatalog) -> RewardSummary {
    let mut summary = RewardSummary::default();
    for &quest_id in &player.completed_quests {
        match catalog.get_by_id(quest_id) {
            Some(quest) => {
                summary.total += u64::from(quest.reward);
                summary.breakdown.push(RewardLine {
                    quest_id,
                    title: quest.title.clone(),
                    reward: quest.reward,
                });
            }
            None => summary.unrecognized.push(quest_id),
        }
    }
    summary
}

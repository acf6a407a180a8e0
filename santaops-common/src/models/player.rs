use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::quest::QuestId;

/// A registered participant. Nickname and proof are fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub external_id: String,
    pub nickname: String,
    pub proof_url: String,
    /// Unique ids in the order they were first recorded.
    pub completed_quests: Vec<QuestId>,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(external_id: &str, nickname: &str, proof_url: &str) -> Self {
        Self {
            external_id: external_id.to_string(),
            nickname: nickname.to_string(),
            proof_url: proof_url.to_string(),
            completed_quests: Vec::new(),
            joined_at: Utc::now(),
        }
    }

    pub fn has_completed(&self, quest_id: QuestId) -> bool {
        self.completed_quests.contains(&quest_id)
    }

    /// Set insertion. Returns `false` when the id was already present.
    pub fn insert_completion(&mut self, quest_id: QuestId) -> bool {
        if self.has_completed(quest_id) {
            return false;
        }
        self.completed_quests.push(quest_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_completion_collapses_duplicates() {
        let mut p = Player::new("u1", "Vasya", "http://x/1");
        let q3 = QuestId::new(3).unwrap();
        let q1 = QuestId::new(1).unwrap();
        assert!(p.insert_completion(q3));
        assert!(!p.insert_completion(q3));
        assert!(p.insert_completion(q1));
        assert_eq!(p.completed_quests, vec![q3, q1]);
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Catalog quest number. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i64", into = "i64")]
#[sqlx(transparent)]
pub struct QuestId(i32);

impl QuestId {
    pub fn new(raw: i64) -> Result<Self, Error> {
        if raw < 1 || raw > i64::from(i32::MAX) {
            return Err(Error::InvalidInput(format!("quest id must be a positive number, got {raw}")));
        }
        Ok(Self(raw as i32))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for QuestId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        QuestId::new(raw)
    }
}

impl From<QuestId> for i64 {
    fn from(id: QuestId) -> Self {
        i64::from(id.0)
    }
}

impl FromStr for QuestId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("'{}' is not a quest number", s.trim())))?;
        QuestId::new(raw)
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    /// Currency units granted on completion.
    pub reward: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quest_id_rejects_non_positive() {
        assert!(QuestId::new(0).is_err());
        assert!(QuestId::new(-3).is_err());
        assert!(QuestId::new(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(QuestId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_quest_id_parses_trimmed_text() {
        assert_eq!(" 4 ".parse::<QuestId>().unwrap().get(), 4);
        assert!("four".parse::<QuestId>().is_err());
        assert!("".parse::<QuestId>().is_err());
    }

    #[test]
    fn test_quest_deserialize_validates_id() {
        let ok: Quest = serde_json::from_str(r#"{"id": 2, "title": "Gifts", "reward": 30}"#).unwrap();
        assert_eq!(ok.id.get(), 2);
        let bad = serde_json::from_str::<Quest>(r#"{"id": 0, "title": "Nope", "reward": 1}"#);
        assert!(bad.is_err());
    }
}

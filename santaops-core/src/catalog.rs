// santaops-core/src/catalog.rs
//
// Static quest list, loaded once at startup and shared read-only behind an Arc.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use santaops_common::models::{Quest, QuestId};

use crate::Error;

const BUILTIN_QUESTS: &str = include_str!("../../data/quests.json");

#[derive(Debug, Clone)]
pub struct QuestCatalog {
    quests: Vec<Quest>,
    index: HashMap<QuestId, usize>,
}

impl QuestCatalog {
    /// Fails on duplicate ids. Order is preserved as given.
    pub fn new(quests: Vec<Quest>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for q in &quests {
            if !seen.insert(q.id) {
                return Err(Error::Config(format!("duplicate quest id {} in catalog", q.id)));
            }
        }
        let index = quests.iter().enumerate().map(|(i, q)| (q.id, i)).collect();
        Ok(Self { quests, index })
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let quests: Vec<Quest> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid quest catalog: {e}")))?;
        Self::new(quests)
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_json(BUILTIN_QUESTS)
    }

    /// Reads `path` if it exists, otherwise falls back to the built-in catalog.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            info!("Quest catalog '{}' not found; using built-in quests", path.display());
            return Self::builtin();
        }
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!("Loaded {} quests from '{}'", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get_all(&self) -> &[Quest] {
        &self.quests
    }

    pub fn get_by_id(&self, id: QuestId) -> Option<&Quest> {
        self.index.get(&id).map(|&i| &self.quests[i])
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

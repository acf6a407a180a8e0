use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use santaops_common::models::{Player, QuestId};
use santaops_common::traits::repository_traits::PlayerRepository;

use crate::Error;

#[derive(Default)]
pub struct MemoryPlayerRepository {
    players: DashMap<String, Player>,
}

impl MemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for MemoryPlayerRepository {
    async fn get(&self, external_id: &str) -> Result<Option<Player>, Error> {
        Ok(self.players.get(external_id).map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(&self, player: &Player) -> Result<Option<Player>, Error> {
        match self.players.entry(player.external_id.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let stored = slot.insert(player.clone());
                Ok(Some(stored.value().clone()))
            }
        }
    }

    async fn insert_completion(&self, external_id: &str, quest_id: QuestId) -> Result<bool, Error> {
        match self.players.get_mut(external_id) {
            Some(mut entry) => Ok(entry.insert_completion(quest_id)),
            None => Err(Error::PlayerNotFound(external_id.to_string())),
        }
    }

    async fn delete(&self, external_id: &str) -> Result<bool, Error> {
        Ok(self.players.remove(external_id).is_some())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.players.len() as i64)
    }
}

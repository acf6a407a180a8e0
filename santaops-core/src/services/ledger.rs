use std::sync::Arc;

use tracing::{debug, info};

use santaops_common::models::{Player, QuestId};
use santaops_common::traits::repository_traits::PlayerRepository;

use crate::Error;

/// Owns player records. Every mutation is one atomic repository call; nothing
/// here reads and then writes.
pub struct PlayerLedger {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerLedger {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    pub async fn find_by_identity(&self, external_id: &str) -> Result<Option<Player>, Error> {
        self.players.get(external_id).await
    }

    /// Creates the player. Exactly one of any number of concurrent calls for the
    /// same identity succeeds; the rest get `AlreadyRegistered`.
    pub async fn register(&self, external_id: &str, nickname: &str, proof_url: &str) -> Result<Player, Error> {
        let nickname = nickname.trim();
        let proof_url = proof_url.trim();
        if external_id.is_empty() {
            return Err(Error::InvalidInput("identity must not be empty".into()));
        }
        if nickname.is_empty() {
            return Err(Error::InvalidInput("nickname must not be empty".into()));
        }
        if proof_url.is_empty() {
            return Err(Error::InvalidInput("proof link must not be empty".into()));
        }

        let candidate = Player::new(external_id, nickname, proof_url);
        match self.players.insert_if_absent(&candidate).await? {
            Some(player) => {
                info!(player = %player.external_id, nickname = %player.nickname, "player registered");
                Ok(player)
            }
            None => {
                debug!(player = external_id, "duplicate registration rejected");
                Err(Error::AlreadyRegistered(external_id.to_string()))
            }
        }
    }

    /// Records `quest_id` for the player without consulting the catalog.
    /// Returns `false` if it was already recorded.
    pub async fn record_completion(&self, external_id: &str, quest_id: QuestId) -> Result<bool, Error> {
        let inserted = self.players.insert_completion(external_id, quest_id).await?;
        if inserted {
            info!(player = external_id, quest = %quest_id, "completion recorded");
        } else {
            debug!(player = external_id, quest = %quest_id, "completion already recorded");
        }
        Ok(inserted)
    }

    /// `false` when there was no such player, which is expected for stale or
    /// duplicate admin actions.
    pub async fn delete(&self, external_id: &str) -> Result<bool, Error> {
        let removed = self.players.delete(external_id).await?;
        if removed {
            info!(player = external_id, "player deleted");
        } else {
            debug!(player = external_id, "delete of absent player");
        }
        Ok(removed)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        self.players.count().await
    }
}

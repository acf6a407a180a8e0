use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::player::Player;
use crate::models::quest::QuestId;
use crate::models::review::{Claim, Resolution};

/// Durable store of player records.
///
/// Implementations must make each method a single atomic step per identity:
/// `insert_if_absent` is a conditional insert, `insert_completion` a
/// read-modify-write under the record's lock, `delete` a delete-if-exists.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn get(&self, external_id: &str) -> Result<Option<Player>, Error>;

    /// Stores `player` unless a record with the same identity exists.
    /// Returns `None` if one did; the existing record is left untouched.
    async fn insert_if_absent(&self, player: &Player) -> Result<Option<Player>, Error>;

    /// Adds `quest_id` to the player's completions.
    /// `Ok(false)` if it was already there, `PlayerNotFound` if the player is not.
    async fn insert_completion(&self, external_id: &str, quest_id: QuestId) -> Result<bool, Error>;

    /// Removes the record. `Ok(false)` if there was nothing to remove.
    async fn delete(&self, external_id: &str) -> Result<bool, Error>;

    async fn count(&self) -> Result<i64, Error>;
}

/// Per-artifact `Pending -> InProgress -> Resolved` state for review controls.
#[async_trait]
pub trait ResolutionRepository: Send + Sync {
    /// Atomically records `resolution` as an unfinished claim if the artifact
    /// has none yet.
    async fn try_claim(&self, resolution: &Resolution) -> Result<Claim, Error>;

    /// Marks the claim held by `resolved_by` as finished. `Ok(false)` if that
    /// actor holds no claim on the artifact.
    async fn complete(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error>;

    /// Undoes an unfinished claim whose effect failed. Only removes the row if
    /// it is owned by `resolved_by` and not yet completed.
    async fn release(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error>;

    async fn get(&self, artifact_id: Uuid) -> Result<Option<Resolution>, Error>;
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::quest::QuestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    AcknowledgeReward,
    CancelRegistration,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AcknowledgeReward => "reward-ack",
            ActionKind::CancelRegistration => "registration-cancel",
        }
    }

    /// Every review action currently acts on behalf of an admin.
    pub fn requires_admin(&self) -> bool {
        match self {
            ActionKind::AcknowledgeReward => true,
            ActionKind::CancelRegistration => true,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reward-ack" => Ok(ActionKind::AcknowledgeReward),
            "registration-cancel" => Ok(ActionKind::CancelRegistration),
            other => Err(Error::MalformedToken(format!("unknown action kind '{other}'"))),
        }
    }
}

/// What a review control means. Carried entirely by the control's token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    AcknowledgeReward {
        artifact_id: Uuid,
        quest_id: QuestId,
        player_id: String,
    },
    CancelRegistration {
        artifact_id: Uuid,
        player_id: String,
    },
}

impl ReviewAction {
    /// Mints a fresh artifact id for a newly submitted report.
    pub fn acknowledge_reward(quest_id: QuestId, player_id: &str) -> Self {
        ReviewAction::AcknowledgeReward {
            artifact_id: Uuid::new_v4(),
            quest_id,
            player_id: player_id.to_string(),
        }
    }

    /// Mints a fresh artifact id for a newly created registration.
    pub fn cancel_registration(player_id: &str) -> Self {
        ReviewAction::CancelRegistration {
            artifact_id: Uuid::new_v4(),
            player_id: player_id.to_string(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ReviewAction::AcknowledgeReward { .. } => ActionKind::AcknowledgeReward,
            ReviewAction::CancelRegistration { .. } => ActionKind::CancelRegistration,
        }
    }

    pub fn artifact_id(&self) -> Uuid {
        match self {
            ReviewAction::AcknowledgeReward { artifact_id, .. } => *artifact_id,
            ReviewAction::CancelRegistration { artifact_id, .. } => *artifact_id,
        }
    }

    /// Identity of the player the action is about.
    pub fn subject(&self) -> &str {
        match self {
            ReviewAction::AcknowledgeReward { player_id, .. } => player_id,
            ReviewAction::CancelRegistration { player_id, .. } => player_id,
        }
    }
}

/// Claim on a review artifact. While `completed` is false the claimant's
/// effect is still running and the artifact is not yet `Resolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub artifact_id: Uuid,
    pub action_kind: ActionKind,
    pub subject_id: String,
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
    pub completed: bool,
}

impl Resolution {
    pub fn new(action: &ReviewAction, resolved_by: &str) -> Self {
        Self {
            artifact_id: action.artifact_id(),
            action_kind: action.kind(),
            subject_id: action.subject().to_string(),
            resolved_by: resolved_by.to_string(),
            resolved_at: Utc::now(),
            completed: false,
        }
    }
}

/// Result of the atomic claim attempt on one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// This caller holds the artifact and may run its effect.
    Won(Resolution),
    /// Someone else holds it, finished or not; carries their claim untouched.
    Lost(Resolution),
}

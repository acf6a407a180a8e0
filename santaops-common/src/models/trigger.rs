// Plain data crossing the boundary between the transport and the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::player::Player;
use crate::models::quest::QuestId;
use crate::models::review::{Resolution, ReviewAction};
use crate::models::reward::RewardSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub identity: String,
    pub nickname: String,
    pub proof_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub identity: String,
    pub quest_id: QuestId,
    pub proof_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewActivation {
    pub token: String,
    pub actor_identity: String,
    pub actor_has_admin_capability: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub player: Player,
    pub summary: RewardSummary,
}

/// Posted to the review channel when someone registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationArtifact {
    pub player_id: String,
    pub nickname: String,
    pub proof_url: String,
    pub joined_at: DateTime<Utc>,
    pub action: ReviewAction,
    pub token: String,
}

/// Posted to the review channel when a quest report comes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub player_id: String,
    pub nickname: String,
    pub quest_id: QuestId,
    /// `None` when the quest is not in the catalog.
    pub quest_title: Option<String>,
    pub reward: u32,
    pub proof_url: String,
    /// `false` when this player had already reported the same quest.
    pub first_completion: bool,
    /// Ready-to-paste in-game payout command for the admin.
    pub payout_command: String,
    pub action: ReviewAction,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewEffect {
    RewardAcknowledged,
    RegistrationCancelled { removed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    /// This activation won; the effect ran exactly once.
    Performed {
        action: ReviewAction,
        resolution: Resolution,
        effect: ReviewEffect,
    },
    /// The artifact was already resolved; nothing happened.
    /// Another admin's action on this artifact has not finished yet.
    InProgress {
        action: ReviewAction,
        resolution: Resolution,
    },
    AlreadyResolved {
        action: ReviewAction,
        resolution: Resolution,
    },
}

impl ReviewOutcome {
    pub fn resolution(&self) -> &Resolution {
        match self {
            ReviewOutcome::Performed { resolution, .. } => resolution,
            ReviewOutcome::InProgress { resolution, .. } => resolution,
            ReviewOutcome::AlreadyResolved { resolution, .. } => resolution,
        }
    }

    pub fn was_performed(&self) -> bool {
        matches!(self, ReviewOutcome::Performed { .. })
    }
}

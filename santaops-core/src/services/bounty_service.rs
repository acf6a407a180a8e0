// santaops-core/src/services/bounty_service.rs
//
// Entry point for trigger events coming from the transport. Each call is
// self-contained: the transport may run any number of them concurrently.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use santaops_common::models::{
    Profile, RegisterRequest, RegistrationArtifact, ReportArtifact, ReportRequest, ReviewAction,
    ReviewActivation, ReviewEffect, ReviewOutcome,
};
use santaops_common::traits::repository_traits::{PlayerRepository, ResolutionRepository};

use crate::Error;
use crate::catalog::QuestCatalog;
use crate::review::{Activation, OneShotGuard, token};
use crate::services::ledger::PlayerLedger;
use crate::services::reward;

/// In-game command admins paste to pay out a reward.
pub const PAYOUT_COMMAND: &str = "/givemydonateoff";

pub struct BountyService {
    ledger: PlayerLedger,
    catalog: Arc<QuestCatalog>,
    guard: OneShotGuard,
}

impl BountyService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        resolutions: Arc<dyn ResolutionRepository>,
        catalog: Arc<QuestCatalog>,
    ) -> Self {
        Self {
            ledger: PlayerLedger::new(players),
            catalog,
            guard: OneShotGuard::new(resolutions),
        }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &PlayerLedger {
        &self.ledger
    }

    pub fn guard(&self) -> &OneShotGuard {
        &self.guard
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<RegistrationArtifact, Error> {
        let player = self
            .ledger
            .register(&req.identity, &req.nickname, &req.proof_url)
            .await?;

        let action = ReviewAction::cancel_registration(&player.external_id);
        Ok(RegistrationArtifact {
            token: token::encode(&action),
            player_id: player.external_id,
            nickname: player.nickname,
            proof_url: player.proof_url,
            joined_at: player.joined_at,
            action,
        })
    }

    /// Registers the player and hands the artifact to `publish`. If publishing
    /// fails the registration is undone, since a player without a posted
    /// cancel control could never be removed by an admin.
    pub async fn register_and_publish<F, Fut>(
        &self,
        req: &RegisterRequest,
        publish: F,
    ) -> Result<RegistrationArtifact, Error>
    where
        F: FnOnce(RegistrationArtifact) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let artifact = self.register(req).await?;
        if let Err(e) = publish(artifact.clone()).await {
            warn!(player = %artifact.player_id, "registration artifact not published, undoing registration: {e}");
            if let Err(undo) = self.ledger.delete(&artifact.player_id).await {
                error!(player = %artifact.player_id, "failed to undo registration: {undo}");
            }
            return Err(e);
        }
        Ok(artifact)
    }

    /// Records the completion and builds the artifact admins review.
    /// Quest ids missing from the catalog are accepted with a zero reward.
    pub async fn report(&self, req: &ReportRequest) -> Result<ReportArtifact, Error> {
        let proof_url = req.proof_url.trim();
        if proof_url.is_empty() {
            return Err(Error::InvalidInput("proof link must not be empty".into()));
        }

        let player = self
            .ledger
            .find_by_identity(&req.identity)
            .await?
            .ok_or_else(|| Error::PlayerNotFound(req.identity.clone()))?;

        let first_completion = self.ledger.record_completion(&req.identity, req.quest_id).await?;

        let quest = self.catalog.get_by_id(req.quest_id);
        if quest.is_none() {
            warn!(player = %req.identity, quest = %req.quest_id, "report for quest not in catalog");
        }
        let reward = quest.map(|q| q.reward).unwrap_or(0);

        let action = ReviewAction::acknowledge_reward(req.quest_id, &player.external_id);
        Ok(ReportArtifact {
            token: token::encode(&action),
            payout_command: format!("{PAYOUT_COMMAND} {} {}", player.nickname, reward),
            player_id: player.external_id,
            nickname: player.nickname,
            quest_id: req.quest_id,
            quest_title: quest.map(|q| q.title.clone()),
            reward,
            proof_url: proof_url.to_string(),
            first_completion,
            action,
        })
    }

    /// Decodes the control's token, checks the capability flag and runs the
    /// action through the one-shot guard.
    pub async fn review(&self, activation: &ReviewActivation) -> Result<ReviewOutcome, Error> {
        let action = token::decode(&activation.token)?;
        let actor = activation.actor_identity.as_str();

        if action.kind().requires_admin() && !activation.actor_has_admin_capability {
            warn!(actor, kind = %action.kind(), subject = action.subject(), "review activation without admin rights");
            return Err(Error::Unauthorized(actor.to_string()));
        }

        let activated = match &action {
            ReviewAction::AcknowledgeReward { .. } => {
                // Payouts are not tracked; acknowledging only closes the artifact.
                self.guard
                    .activate(&action, actor, || async { Ok(ReviewEffect::RewardAcknowledged) })
                    .await?
            }
            ReviewAction::CancelRegistration { player_id, .. } => {
                self.guard
                    .activate(&action, actor, || async {
                        let removed = self.ledger.delete(player_id).await?;
                        Ok(ReviewEffect::RegistrationCancelled { removed })
                    })
                    .await?
            }
        };

        Ok(match activated {
            Activation::Performed { resolution, value } => {
                info!(actor, kind = %action.kind(), subject = action.subject(), "review action performed");
                ReviewOutcome::Performed { action, resolution, effect: value }
            }
            Activation::InProgress { resolution } => ReviewOutcome::InProgress { action, resolution },
            Activation::Rejected { resolution } => ReviewOutcome::AlreadyResolved { action, resolution },
        })
    }

    /// `PlayerNotFound` doubles as "not registered".
    pub async fn profile(&self, identity: &str) -> Result<Profile, Error> {
        let player = self
            .ledger
            .find_by_identity(identity)
            .await?
            .ok_or_else(|| Error::PlayerNotFound(identity.to_string()))?;
        let summary = reward::summarize(&player, &self.catalog);
        Ok(Profile { player, summary })
    }
}

//! Review action tokens.
//!
//! A review control (a Discord button) carries everything needed to resolve a
//! click in its own id, so a click still means the same thing after a restart.
//!
//! Wire forms, `:`-delimited, subject always last:
//!
//! ```text
//! reward-ack:<artifact-uuid>:<quest-id>:<subject>
//! registration-cancel:<artifact-uuid>:<subject>
//! ```
//!
//! Decoding uses bounded splits, so a subject containing `:` survives intact.

use uuid::Uuid;

use santaops_common::models::{ActionKind, QuestId, ReviewAction};

use crate::Error;

pub const DELIMITER: char = ':';

/// Discord rejects component ids longer than this.
pub const MAX_TOKEN_LEN: usize = 100;

pub fn encode(action: &ReviewAction) -> String {
    match action {
        ReviewAction::AcknowledgeReward { artifact_id, quest_id, player_id } => format!(
            "{kind}{d}{artifact}{d}{quest}{d}{player}",
            kind = action.kind().as_str(),
            d = DELIMITER,
            artifact = artifact_id.simple(),
            quest = quest_id,
            player = player_id,
        ),
        ReviewAction::CancelRegistration { artifact_id, player_id } => format!(
            "{kind}{d}{artifact}{d}{player}",
            kind = action.kind().as_str(),
            d = DELIMITER,
            artifact = artifact_id.simple(),
            player = player_id,
        ),
    }
}

pub fn decode(token: &str) -> Result<ReviewAction, Error> {
    let (kind, rest) = token
        .split_once(DELIMITER)
        .ok_or_else(|| malformed(token, "missing action kind"))?;
    let kind: ActionKind = kind.parse()?;

    match kind {
        ActionKind::AcknowledgeReward => {
            let mut parts = rest.splitn(3, DELIMITER);
            let (Some(artifact), Some(quest), Some(subject)) = (parts.next(), parts.next(), parts.next()) else {
                return Err(malformed(token, "expected artifact, quest and subject"));
            };
            let quest_id: QuestId = quest.parse().map_err(|_| malformed(token, "bad quest id"))?;
            Ok(ReviewAction::AcknowledgeReward {
                artifact_id: parse_artifact(token, artifact)?,
                quest_id,
                player_id: parse_subject(token, subject)?,
            })
        }
        ActionKind::CancelRegistration => {
            let (artifact, subject) = rest
                .split_once(DELIMITER)
                .ok_or_else(|| malformed(token, "expected artifact and subject"))?;
            Ok(ReviewAction::CancelRegistration {
                artifact_id: parse_artifact(token, artifact)?,
                player_id: parse_subject(token, subject)?,
            })
        }
    }
}

/// Cheap pre-check the transport uses to tell review clicks from other buttons.
pub fn looks_like_token(custom_id: &str) -> bool {
    custom_id
        .split_once(DELIMITER)
        .is_some_and(|(kind, _)| kind.parse::<ActionKind>().is_ok())
}

fn parse_artifact(token: &str, raw: &str) -> Result<Uuid, Error> {
    Uuid::try_parse(raw).map_err(|_| malformed(token, "bad artifact id"))
}

fn parse_subject(token: &str, raw: &str) -> Result<String, Error> {
    if raw.is_empty() {
        return Err(malformed(token, "empty subject"));
    }
    Ok(raw.to_string())
}

fn malformed(token: &str, why: &str) -> Error {
    // Tokens come from clients; keep log lines bounded.
    let shown: String = token.chars().take(MAX_TOKEN_LEN).collect();
    Error::MalformedToken(format!("{why} in '{shown}'"))
}

use std::sync::Arc;

use futures_util::future::join_all;

use santaops_core::Error;
use santaops_core::models::{
    QuestId, RegisterRequest, ReportRequest, ReviewActivation, ReviewEffect, ReviewOutcome,
};
use santaops_core::review::token;
use santaops_core::services::BountyService;
use santaops_core::test_utils::helpers::memory_service;

fn activation(token: &str, actor: &str, admin: bool) -> ReviewActivation {
    ReviewActivation {
        token: token.to_string(),
        actor_identity: actor.to_string(),
        actor_has_admin_capability: admin,
    }
}

async fn register(service: &BountyService, id: &str) -> Result<String, Error> {
    let artifact = service
        .register(&RegisterRequest {
            identity: id.to_string(),
            nickname: format!("{id}-nick"),
            proof_url: "https://x/stats.png".to_string(),
        })
        .await?;
    Ok(artifact.token)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admin_clicks_perform_once() -> Result<(), Error> {
    let service = Arc::new(memory_service());
    register(&service, "u1").await?;
    let report = service
        .report(&ReportRequest {
            identity: "u1".into(),
            quest_id: QuestId::new(2)?,
            proof_url: "https://x/proof.png".into(),
        })
        .await?;

    let tasks = (0..10).map(|i| {
        let service = service.clone();
        let act = activation(&report.token, &format!("admin-{i}"), true);
        tokio::spawn(async move { service.review(&act).await })
    });
    let outcomes = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect::<Result<Vec<ReviewOutcome>, Error>>()?;

    let performed: Vec<_> = outcomes.iter().filter(|o| o.was_performed()).collect();
    assert_eq!(performed.len(), 1);
    let winner = performed[0].resolution().resolved_by.clone();
    for outcome in &outcomes {
        assert_eq!(outcome.resolution().resolved_by, winner);
        // Nobody is told "already handled" before the winner's effect finished.
        if let ReviewOutcome::AlreadyResolved { resolution, .. } = outcome {
            assert!(resolution.completed);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_cancel_registration_deletes_player_once() -> Result<(), Error> {
    let service = memory_service();
    let token = register(&service, "u1").await?;

    match service.review(&activation(&token, "admin-a", true)).await? {
        ReviewOutcome::Performed { effect, resolution, .. } => {
            assert_eq!(effect, ReviewEffect::RegistrationCancelled { removed: true });
            assert_eq!(resolution.resolved_by, "admin-a");
        }
        other => panic!("expected performed, got {other:?}"),
    }
    assert!(service.ledger().find_by_identity("u1").await?.is_none());

    // Player registers again; the fresh artifact is independent of the old one.
    let second_token = register(&service, "u1").await?;
    assert_ne!(second_token, token);

    let late = service.review(&activation(&token, "admin-b", true)).await?;
    assert!(!late.was_performed());
    assert_eq!(late.resolution().resolved_by, "admin-a");
    assert!(service.ledger().find_by_identity("u1").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_cancel_of_already_deleted_player_still_resolves() -> Result<(), Error> {
    let service = memory_service();
    let token = register(&service, "u1").await?;
    service.ledger().delete("u1").await?;

    let outcome = service.review(&activation(&token, "admin-a", true)).await?;
    assert!(matches!(
        outcome,
        ReviewOutcome::Performed { effect: ReviewEffect::RegistrationCancelled { removed: false }, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn test_non_admin_is_unauthorized_and_artifact_stays_pending() -> Result<(), Error> {
    let service = memory_service();
    let token = register(&service, "u1").await?;

    let denied = service.review(&activation(&token, "u1", false)).await;
    assert!(matches!(denied, Err(Error::Unauthorized(ref who)) if who == "u1"));
    assert!(service.ledger().find_by_identity("u1").await?.is_some());

    let action = token::decode(&token)?;
    assert!(service.guard().state(&action).await?.is_none());

    let allowed = service.review(&activation(&token, "admin-a", true)).await?;
    assert!(allowed.was_performed());
    Ok(())
}

#[tokio::test]
async fn test_malformed_token_wins_over_missing_capability() {
    let service = memory_service();
    for bad in ["reward-ack:nope", "registration-cancel:", "garbage"] {
        let result = service.review(&activation(bad, "u1", false)).await;
        assert!(matches!(result, Err(Error::MalformedToken(_))), "{bad} => {result:?}");
    }
}

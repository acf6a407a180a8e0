// Needs a reachable Postgres; run with `cargo test -- --ignored`.

use std::sync::Arc;

use futures_util::future::join_all;

use santaops_core::Error;
use santaops_core::models::{Claim, Player, QuestId, Resolution, ReviewAction};
use santaops_core::repositories::{
    PlayerRepository, PostgresPlayerRepository, PostgresResolutionRepository, ResolutionRepository,
};
use santaops_core::test_utils::helpers::setup_test_database;

#[tokio::test]
#[ignore]
async fn test_player_insert_and_completion_order() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresPlayerRepository::new(db.pool().clone());

    let player = Player::new("u1", "Vasya", "https://x/stats.png");
    assert!(repo.insert_if_absent(&player).await?.is_some());
    assert!(repo.insert_if_absent(&Player::new("u1", "Other", "https://y")).await?.is_none());

    for id in [5, 2, 5, 9] {
        repo.insert_completion("u1", QuestId::new(id)?).await?;
    }
    let stored = repo.get("u1").await?.unwrap();
    assert_eq!(stored.nickname, "Vasya");
    assert_eq!(
        stored.completed_quests,
        vec![QuestId::new(5)?, QuestId::new(2)?, QuestId::new(9)?]
    );

    assert!(matches!(
        repo.insert_completion("ghost", QuestId::new(1)?).await,
        Err(Error::PlayerNotFound(_))
    ));

    assert!(repo.delete("u1").await?);
    assert!(!repo.delete("u1").await?);
    assert!(repo.get("u1").await?.is_none());
    assert_eq!(repo.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_concurrent_player_inserts_have_one_winner() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = Arc::new(PostgresPlayerRepository::new(db.pool().clone()));

    let attempts = (0..8).map(|i| {
        let repo = repo.clone();
        async move { repo.insert_if_absent(&Player::new("u1", &format!("n{i}"), "https://x")).await }
    });
    let results = join_all(attempts).await.into_iter().collect::<Result<Vec<_>, Error>>()?;
    assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_resolution_claim_is_one_shot() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresResolutionRepository::new(db.pool().clone());
    let action = ReviewAction::cancel_registration("u1");

    let first = repo.try_claim(&Resolution::new(&action, "admin-a")).await?;
    assert!(matches!(first, Claim::Won(ref r) if r.resolved_by == "admin-a" && !r.completed));

    let second = repo.try_claim(&Resolution::new(&action, "admin-b")).await?;
    assert!(matches!(second, Claim::Lost(ref r) if r.resolved_by == "admin-a" && !r.completed));

    // Only the holder can release.
    assert!(!repo.release(action.artifact_id(), "admin-b").await?);
    assert!(repo.release(action.artifact_id(), "admin-a").await?);
    assert!(repo.get(action.artifact_id()).await?.is_none());

    // Completed claims are terminal and can no longer be released.
    repo.try_claim(&Resolution::new(&action, "admin-b")).await?;
    assert!(!repo.complete(action.artifact_id(), "admin-a").await?);
    assert!(repo.complete(action.artifact_id(), "admin-b").await?);
    assert!(!repo.release(action.artifact_id(), "admin-b").await?);
    let late = repo.try_claim(&Resolution::new(&action, "admin-c")).await?;
    assert!(matches!(late, Claim::Lost(ref r) if r.resolved_by == "admin-b" && r.completed));
    Ok(())
}

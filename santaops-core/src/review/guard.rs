// santaops-core/src/review/guard.rs
//
// Per-artifact `Pending -> InProgress -> Resolved` state machine for admin
// review controls. `Resolved` is terminal; `InProgress` falls back to
// `Pending` only if the claimant's effect fails.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use santaops_common::models::{Claim, Resolution, ReviewAction};
use santaops_common::traits::repository_traits::ResolutionRepository;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation<T> {
    /// First accepted activation. The effect ran and returned `value`.
    Performed { resolution: Resolution, value: T },
    /// Another actor's effect is still running. Nothing happened; the caller may retry.
    InProgress { resolution: Resolution },
    /// The artifact was already `Resolved`. The effect did not run.
    Rejected { resolution: Resolution },
}

pub struct OneShotGuard {
    resolutions: Arc<dyn ResolutionRepository>,
}

impl OneShotGuard {
    pub fn new(resolutions: Arc<dyn ResolutionRepository>) -> Self {
        Self { resolutions }
    }

    /// Runs `effect` only if this call claims the artifact. The claim is a
    /// single conditional write, so concurrent calls on one artifact produce
    /// at most one running effect and exactly one `Performed`.
    ///
    /// Callers arriving while the effect runs get `InProgress`, never
    /// `Rejected`: the artifact is only reported `Resolved` once the effect
    /// succeeded and the claim was marked complete.
    ///
    /// If `effect` fails, or the completion cannot be recorded, the claim is
    /// released and the error returned; the artifact is `Pending` again. Effects
    /// must therefore be safe to run again.
    pub async fn activate<T, F, Fut>(
        &self,
        action: &ReviewAction,
        actor: &str,
        effect: F,
    ) -> Result<Activation<T>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let attempt = Resolution::new(action, actor);
        let mut resolution = match self.resolutions.try_claim(&attempt).await? {
            Claim::Lost(resolution) if !resolution.completed => {
                debug!(
                    artifact = %resolution.artifact_id,
                    actor,
                    held_by = %resolution.resolved_by,
                    "activation while effect in progress"
                );
                return Ok(Activation::InProgress { resolution });
            }
            Claim::Lost(resolution) => {
                debug!(
                    artifact = %resolution.artifact_id,
                    actor,
                    resolved_by = %resolution.resolved_by,
                    "late activation rejected"
                );
                return Ok(Activation::Rejected { resolution });
            }
            Claim::Won(resolution) => resolution,
        };

        let value = match effect().await {
            Ok(value) => value,
            Err(e) => {
                warn!(artifact = %resolution.artifact_id, actor, "review effect failed, releasing claim: {e}");
                self.release(&resolution).await;
                return Err(e);
            }
        };

        if let Err(e) = self.resolutions.complete(resolution.artifact_id, actor).await {
            warn!(artifact = %resolution.artifact_id, actor, "could not mark claim complete, releasing: {e}");
            self.release(&resolution).await;
            return Err(e);
        }
        resolution.completed = true;

        info!(
            artifact = %resolution.artifact_id,
            kind = %resolution.action_kind,
            subject = %resolution.subject_id,
            actor,
            "review artifact resolved"
        );
        Ok(Activation::Performed { resolution, value })
    }

    /// Best effort. A failed release leaves the claim `InProgress` and is logged;
    /// the caller still sees the error that caused it.
    async fn release(&self, resolution: &Resolution) {
        if let Err(e) = self.resolutions.release(resolution.artifact_id, &resolution.resolved_by).await {
            error!(artifact = %resolution.artifact_id, "failed to release review claim: {e}");
        }
    }

    /// `None` while the artifact is still `Pending`. Check `completed` to tell
    /// `InProgress` from `Resolved`.
    pub async fn state(&self, action: &ReviewAction) -> Result<Option<Resolution>, Error> {
        self.resolutions.get(action.artifact_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use mockall::mock;
    use uuid::Uuid;

    use crate::repositories::MemoryResolutionRepository;

    mock! {
        ResolutionRepo {}
        #[async_trait]
        impl ResolutionRepository for ResolutionRepo {
            async fn try_claim(&self, resolution: &Resolution) -> Result<Claim, Error>;
            async fn complete(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error>;
            async fn release(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error>;
            async fn get(&self, artifact_id: Uuid) -> Result<Option<Resolution>, Error>;
        }
    }

    fn storage_down() -> Error {
        Error::StorageUnavailable(sqlx::Error::PoolTimedOut)
    }

    fn guard() -> OneShotGuard {
        OneShotGuard::new(Arc::new(MemoryResolutionRepository::new()))
    }

    #[tokio::test]
    async fn test_second_activation_rejected_and_keeps_first_actor() -> Result<(), Error> {
        let guard = guard();
        let action = ReviewAction::cancel_registration("u1");
        let runs = AtomicUsize::new(0);

        let first = guard
            .activate(&action, "admin-a", || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await?;
        assert!(matches!(first, Activation::Performed { ref resolution, .. } if resolution.resolved_by == "admin-a"));

        let second = guard
            .activate(&action, "admin-b", || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await?;
        match second {
            Activation::Rejected { resolution } => assert_eq!(resolution.resolved_by, "admin-a"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_effect_leaves_artifact_pending() -> Result<(), Error> {
        let guard = guard();
        let action = ReviewAction::cancel_registration("u1");

        let failed = guard
            .activate(&action, "admin-a", || async {
                Err::<(), _>(Error::StorageUnavailable(sqlx::Error::PoolTimedOut))
            })
            .await;
        assert!(matches!(failed, Err(Error::StorageUnavailable(_))));
        assert!(guard.state(&action).await?.is_none());

        let retried = guard.activate(&action, "admin-b", || async { Ok(5) }).await?;
        match retried {
            Activation::Performed { resolution, value } => {
                assert_eq!(value, 5);
                assert_eq!(resolution.resolved_by, "admin-b");
            }
            other => panic!("expected performed, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_performed_activation_is_recorded_complete() -> Result<(), Error> {
        let guard = guard();
        let action = ReviewAction::cancel_registration("u1");
        let performed = guard.activate(&action, "admin-a", || async { Ok(()) }).await?;
        assert!(matches!(performed, Activation::Performed { ref resolution, .. } if resolution.completed));
        assert!(guard.state(&action).await?.is_some_and(|r| r.completed));
        Ok(())
    }

    #[tokio::test]
    async fn test_click_during_failing_effect_is_in_progress_not_resolved() -> Result<(), Error> {
        let guard = guard();
        let action = ReviewAction::cancel_registration("u1");

        let (first, second) = tokio::join!(
            guard.activate(&action, "admin-a", || async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Err::<(), _>(storage_down())
            }),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                guard.activate(&action, "admin-b", || async { Ok(()) }).await
            }
        );

        assert!(matches!(first, Err(Error::StorageUnavailable(_))));
        match second? {
            Activation::InProgress { resolution } => {
                assert_eq!(resolution.resolved_by, "admin-a");
                assert!(!resolution.completed);
            }
            other => panic!("expected in-progress, got {other:?}"),
        }
        assert!(guard.state(&action).await?.is_none());

        let retried = guard.activate(&action, "admin-b", || async { Ok(()) }).await?;
        assert!(matches!(retried, Activation::Performed { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_release_failure_keeps_effect_error() {
        let action = ReviewAction::cancel_registration("u1");
        let mut repo = MockResolutionRepo::new();
        repo.expect_try_claim().times(1).returning(|r| Ok(Claim::Won(r.clone())));
        repo.expect_complete().times(0);
        repo.expect_release().times(1).returning(|_, _| Err(storage_down()));

        let guard = OneShotGuard::new(Arc::new(repo));
        let result = guard
            .activate(&action, "admin-a", || async {
                Err::<(), _>(Error::InvalidInput("effect failed".into()))
            })
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(ref msg)) if msg == "effect failed"));
    }

    #[tokio::test]
    async fn test_completion_failure_releases_claim() {
        let action = ReviewAction::cancel_registration("u1");
        let mut repo = MockResolutionRepo::new();
        repo.expect_try_claim().times(1).returning(|r| Ok(Claim::Won(r.clone())));
        repo.expect_complete().times(1).returning(|_, _| Err(storage_down()));
        repo.expect_release().times(1).returning(|_, _| Ok(true));

        let guard = OneShotGuard::new(Arc::new(repo));
        let result = guard.activate(&action, "admin-a", || async { Ok(()) }).await;
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }
}

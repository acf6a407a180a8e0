// santaops-core/src/repositories/postgres/review_resolution.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use santaops_common::models::{ActionKind, Claim, Resolution};
use santaops_common::traits::repository_traits::ResolutionRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresResolutionRepository {
    pool: Pool<Postgres>,
}

impl PostgresResolutionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn resolution_from_row(r: &PgRow) -> Result<Resolution, Error> {
    let kind: String = r.try_get("action_kind")?;
    Ok(Resolution {
        artifact_id: r.try_get("artifact_id")?,
        action_kind: kind.parse::<ActionKind>()?,
        subject_id: r.try_get("subject_id")?,
        resolved_by: r.try_get("resolved_by")?,
        resolved_at: r.try_get::<DateTime<Utc>, _>("resolved_at")?,
        completed: r.try_get("completed")?,
    })
}

#[async_trait]
impl ResolutionRepository for PostgresResolutionRepository {
    async fn try_claim(&self, resolution: &Resolution) -> Result<Claim, Error> {
        // The no-op DO UPDATE locks the existing row and hands it back, so both the
        // winner and every loser learn the recorded actor from this one statement.
        // xmax = 0 only on the freshly inserted row.
        let row = sqlx::query(
            r#"
            INSERT INTO review_resolutions (artifact_id, action_kind, subject_id, resolved_by, resolved_at, completed)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            ON CONFLICT (artifact_id) DO UPDATE
                SET artifact_id = review_resolutions.artifact_id
            RETURNING artifact_id, action_kind, subject_id, resolved_by, resolved_at, completed,
                      (xmax = 0) AS inserted
            "#,
        )
            .bind(resolution.artifact_id)
            .bind(resolution.action_kind.as_str())
            .bind(&resolution.subject_id)
            .bind(&resolution.resolved_by)
            .bind(resolution.resolved_at)
            .fetch_one(&self.pool)
            .await?;

        let inserted: bool = row.try_get("inserted")?;
        let stored = resolution_from_row(&row)?;
        if inserted {
            Ok(Claim::Won(stored))
        } else {
            Ok(Claim::Lost(stored))
        }
    }

    async fn complete(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE review_resolutions SET completed = TRUE WHERE artifact_id = $1 AND resolved_by = $2",
        )
            .bind(artifact_id)
            .bind(resolved_by)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM review_resolutions WHERE artifact_id = $1 AND resolved_by = $2 AND NOT completed",
        )
            .bind(artifact_id)
            .bind(resolved_by)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, artifact_id: Uuid) -> Result<Option<Resolution>, Error> {
        let row = sqlx::query(
            r#"
            SELECT artifact_id, action_kind, subject_id, resolved_by, resolved_at, completed
            FROM review_resolutions
            WHERE artifact_id = $1
            "#,
        )
            .bind(artifact_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(resolution_from_row(&r)?)),
            None => Ok(None),
        }
    }
}

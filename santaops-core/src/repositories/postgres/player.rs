// santaops-core/src/repositories/postgres/player.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use santaops_common::models::{Player, QuestId};
use santaops_common::traits::repository_traits::PlayerRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresPlayerRepository {
    pool: Pool<Postgres>,
}

impl PostgresPlayerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn player_from_row(r: &PgRow, completed_quests: Vec<QuestId>) -> Result<Player, Error> {
    Ok(Player {
        external_id: r.try_get("external_id")?,
        nickname: r.try_get("nickname")?,
        proof_url: r.try_get("proof_url")?,
        completed_quests,
        joined_at: r.try_get::<DateTime<Utc>, _>("joined_at")?,
    })
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn get(&self, external_id: &str) -> Result<Option<Player>, Error> {
        // Single statement so the record and its completions come from one snapshot.
        let row = sqlx::query(
            r#"
            SELECT p.external_id,
                   p.nickname,
                   p.proof_url,
                   p.joined_at,
                   COALESCE(
                       array_agg(c.quest_id ORDER BY c.seq) FILTER (WHERE c.quest_id IS NOT NULL),
                       '{}'
                   ) AS completed_quests
            FROM players p
            LEFT JOIN player_completions c ON c.external_id = p.external_id
            WHERE p.external_id = $1
            GROUP BY p.external_id
            "#,
        )
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let completed: Vec<QuestId> = r.try_get("completed_quests")?;
                Ok(Some(player_from_row(&r, completed)?))
            }
            None => Ok(None),
        }
    }

    async fn insert_if_absent(&self, player: &Player) -> Result<Option<Player>, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO players (external_id, nickname, proof_url, joined_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING external_id, nickname, proof_url, joined_at
            "#,
        )
            .bind(&player.external_id)
            .bind(&player.nickname)
            .bind(&player.proof_url)
            .bind(player.joined_at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(player_from_row(&r, Vec::new())?)),
            None => Ok(None),
        }
    }

    async fn insert_completion(&self, external_id: &str, quest_id: QuestId) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        // FOR SHARE keeps a concurrent delete from slipping in between the two statements.
        let exists = sqlx::query("SELECT 1 FROM players WHERE external_id = $1 FOR SHARE")
            .bind(external_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Err(Error::PlayerNotFound(external_id.to_string()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO player_completions (external_id, quest_id)
            VALUES ($1, $2)
            ON CONFLICT (external_id, quest_id) DO NOTHING
            "#,
        )
            .bind(external_id)
            .bind(quest_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, external_id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM players WHERE external_id = $1")
            .bind(external_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM players")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}

// File: santaops-core/src/test_utils/helpers.rs

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};

use santaops_common::models::{Quest, QuestId};

use crate::Error;
use crate::catalog::QuestCatalog;
use crate::db::Database;
use crate::repositories::{MemoryPlayerRepository, MemoryResolutionRepository};
use crate::services::BountyService;

const TEST_DB: &str = "santaops_test";

/// Three quests worth 50, 100 and 300.
pub fn sample_catalog() -> QuestCatalog {
    let quest = |id: i64, title: &str, reward: u32| Quest {
        id: QuestId::new(id).expect("positive id"),
        title: title.to_string(),
        reward,
    };
    QuestCatalog::new(vec![
        quest(1, "Rob the gift truck", 50),
        quest(2, "Catch the Grinch on Vinewood", 100),
        quest(3, "Deliver 10 presents to Grove Street", 300),
    ])
    .expect("unique ids")
}

/// Service over fresh in-memory stores and [`sample_catalog`].
pub fn memory_service() -> BountyService {
    BountyService::new(
        Arc::new(MemoryPlayerRepository::new()),
        Arc::new(MemoryResolutionRepository::new()),
        Arc::new(sample_catalog()),
    )
}

/// Create the test database if it does not exist yet.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    let admin_url = std::env::var("DATABASE_ADMIN_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());
    let mut conn = PgConnection::connect(&admin_url).await?;

    match sqlx::query(&format!("CREATE DATABASE {TEST_DB};")).execute(&mut conn).await {
        Ok(_) => println!("Created test DB '{TEST_DB}'."),
        // 42P04 => duplicate_database
        Err(e) if e.as_database_error().and_then(|d| d.code()).as_deref() == Some("42P04") => {}
        Err(e) => return Err(Error::StorageUnavailable(e)),
    }
    Ok(())
}

/// `TEST_DATABASE_URL`, else a local `santaops_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| format!("postgres://postgres@localhost/{TEST_DB}"));
    let pool = PgPoolOptions::new().max_connections(10).connect(&url).await?;
    Ok(pool)
}

pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("TRUNCATE TABLE player_completions, players, review_resolutions RESTART IDENTITY CASCADE;")
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns a migrated, empty test DB handle.
pub async fn setup_test_database() -> Result<Database, Error> {
    ensure_test_database_exists().await?;
    let db = Database::from_pool(create_test_db_pool().await?);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}

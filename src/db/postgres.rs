use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::domain::Key;

use super::{Database, DbError, InsertOutcome, stored_key};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to postgres and brings the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        // Run SQL migrations
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("SQL migrations failed")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    #[tracing::instrument(name = "db::key_for_url", skip(self))]
    async fn key_for_url(&self, url: &str) -> Result<Option<Key>, DbError> {
        let key: Option<String> = sqlx::query_scalar(r#"SELECT key FROM urls WHERE url = $1"#)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        key.map(stored_key).transpose()
    }

    #[tracing::instrument(name = "db::url_for_key", skip(self))]
    async fn url_for_key(&self, key: &Key) -> Result<Option<String>, DbError> {
        let url = sqlx::query_scalar(r#"SELECT url FROM urls WHERE key = $1"#)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(url)
    }

    #[tracing::instrument(name = "db::insert_if_absent", skip(self))]
    async fn insert_if_absent(&self, key: &Key, url: &str) -> Result<InsertOutcome, DbError> {
        // A conflict on either unique column skips the row instead of failing
        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO urls (key, url)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING key
            "#,
        )
        .bind(key.as_str())
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            return Ok(InsertOutcome::Inserted);
        }

        // Rows are never deleted, so a miss here means the key was the conflict
        match self.key_for_url(url).await? {
            Some(existing) => Ok(InsertOutcome::UrlExists(existing)),
            None => Ok(InsertOutcome::KeyTaken),
        }
    }
}

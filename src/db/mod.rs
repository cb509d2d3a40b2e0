use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Key, KeyParseError};

mod memory;
mod postgres;

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error {0}")]
    Query(#[from] sqlx::Error),
    #[error("stored key `{0}` is malformed: {1}")]
    MalformedKey(String, KeyParseError),
}

/// Result of an atomic insert attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// the generated key already belongs to another url
    KeyTaken,
    /// the url was stored in the meantime, under the contained key
    UrlExists(Key),
}

/// The `urls` table. Both columns are unique, implementations must enforce that themselves.
#[async_trait]
pub trait Database: Send + Sync {
    async fn key_for_url(&self, url: &str) -> Result<Option<Key>, DbError>;

    async fn url_for_key(&self, key: &Key) -> Result<Option<String>, DbError>;

    /// Stores `key -> url` unless either side is already present
    async fn insert_if_absent(&self, key: &Key, url: &str) -> Result<InsertOutcome, DbError>;
}

fn stored_key(raw: String) -> Result<Key, DbError> {
    Key::parse(&raw).map_err(|e| DbError::MalformedKey(raw, e))
}

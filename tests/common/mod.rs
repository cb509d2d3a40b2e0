#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use shortgo::{
    app::AppState,
    db::{Database, DbError, InsertOutcome, MemoryDatabase},
    domain::Key,
};

pub const INDEX_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/index.html");

/// Wraps a `MemoryDatabase` and injects failures
#[derive(Default)]
pub struct FaultyDB {
    pub inner: MemoryDatabase,
    /// number of upcoming inserts that fail with a db error
    pub insert_error_count: Mutex<u32>,
    /// every insert reports a key collision
    pub keys_always_taken: bool,
    /// url lookups fail with a db error
    pub lookups_fail: bool,
    /// url lookups miss, as if a concurrent request had not committed yet
    pub lookups_blind: bool,
    pub insert_calls: AtomicU32,
}

impl FaultyDB {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_insert_error_count(&self, count: u32) {
        *self.insert_error_count.lock().unwrap() = count;
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

fn simulated() -> DbError {
    DbError::Query(sqlx::Error::Protocol("simulated failure".to_string()))
}

#[async_trait]
impl Database for FaultyDB {
    async fn key_for_url(&self, url: &str) -> Result<Option<Key>, DbError> {
        if self.lookups_fail {
            return Err(simulated());
        }
        if self.lookups_blind {
            return Ok(None);
        }
        self.inner.key_for_url(url).await
    }

    async fn url_for_key(&self, key: &Key) -> Result<Option<String>, DbError> {
        if self.lookups_fail {
            return Err(simulated());
        }
        self.inner.url_for_key(key).await
    }

    async fn insert_if_absent(&self, key: &Key, url: &str) -> Result<InsertOutcome, DbError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut error_count = self.insert_error_count.lock().unwrap();
            if *error_count > 0 {
                *error_count -= 1;
                return Err(simulated());
            }
        }

        if self.keys_always_taken {
            return Ok(InsertOutcome::KeyTaken);
        }

        self.inner.insert_if_absent(key, url).await
    }
}

pub fn state(db: Arc<dyn Database>) -> AppState {
    let mut state = AppState::new(db);
    state.index_file = INDEX_FILE.into();
    state
}

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;

use crate::domain::Key;

use super::{Database, DbError, InsertOutcome};

#[derive(Default)]
struct Tables {
    by_key: HashMap<Key, String>,
    by_url: HashMap<String, Key>,
}

/// Process-local store with the same uniqueness rules as the `urls` table
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of stored mappings
    pub fn len(&self) -> usize {
        self.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // the maps are always left consistent, a panic elsewhere can't corrupt them
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn key_for_url(&self, url: &str) -> Result<Option<Key>, DbError> {
        Ok(self.lock().by_url.get(url).cloned())
    }

    async fn url_for_key(&self, key: &Key) -> Result<Option<String>, DbError> {
        Ok(self.lock().by_key.get(key).cloned())
    }

    async fn insert_if_absent(&self, key: &Key, url: &str) -> Result<InsertOutcome, DbError> {
        let mut tables = self.lock();

        if let Some(existing) = tables.by_url.get(url) {
            return Ok(InsertOutcome::UrlExists(existing.clone()));
        }
        if tables.by_key.contains_key(key) {
            return Ok(InsertOutcome::KeyTaken);
        }

        tables.by_key.insert(key.clone(), url.to_string());
        tables.by_url.insert(url.to_string(), key.clone());

        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(raw: &str) -> Key {
        Key::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn insert_then_lookup_both_ways() {
        let db = MemoryDatabase::new();

        let outcome = db.insert_if_absent(&key("0000beef"), "example.com").await;
        assert_eq!(outcome.unwrap(), InsertOutcome::Inserted);

        assert_eq!(
            db.key_for_url("example.com").await.unwrap(),
            Some(key("0000beef"))
        );
        assert_eq!(
            db.url_for_key(&key("0000beef")).await.unwrap().as_deref(),
            Some("example.com")
        );
        assert_eq!(db.key_for_url("other.com").await.unwrap(), None);
        assert_eq!(db.url_for_key(&key("00000000")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn both_columns_are_unique() {
        let db = MemoryDatabase::new();
        db.insert_if_absent(&key("0000beef"), "example.com")
            .await
            .unwrap();

        let taken = db.insert_if_absent(&key("0000beef"), "other.com").await;
        assert_eq!(taken.unwrap(), InsertOutcome::KeyTaken);

        let exists = db.insert_if_absent(&key("0000cafe"), "example.com").await;
        assert_eq!(exists.unwrap(), InsertOutcome::UrlExists(key("0000beef")));

        assert_eq!(db.len(), 1);
    }
}

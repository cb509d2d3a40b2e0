use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    api,
    config::Settings,
    db::{Database, DbError, InsertOutcome, PgDatabase},
    domain::{Key, Url, redirect_target},
};

pub const DEFAULT_MAX_KEY_ATTEMPTS: u32 = 10;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub max_key_attempts: u32,
    pub base_url: Option<url::Url>,
    pub index_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("key does not exist")]
    NotFound,
    #[error("no free key found after {0} attempts")]
    KeyAttemptsExhausted(u32),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl AppState {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            max_key_attempts: DEFAULT_MAX_KEY_ATTEMPTS,
            base_url: None,
            index_file: PathBuf::from("index.html"),
        }
    }

    pub fn from_settings(db: Arc<dyn Database>, settings: &Settings) -> Self {
        Self {
            db,
            max_key_attempts: settings.max_key_attempts,
            base_url: settings.base_url.clone(),
            index_file: settings.index_file.clone(),
        }
    }

    /// Returns the key of `url`, storing it under a fresh key when it is new
    #[tracing::instrument(name = "app::shorten", skip(self))]
    pub async fn shorten(&self, url: &Url) -> Result<Key, AppError> {
        if let Some(key) = self.db.key_for_url(url.as_str()).await? {
            return Ok(key);
        }

        for attempt in 1..=self.max_key_attempts {
            let key = Key::generate();

            match self.db.insert_if_absent(&key, url.as_str()).await {
                Ok(InsertOutcome::Inserted) => return Ok(key),
                // a concurrent request stored the same url first
                Ok(InsertOutcome::UrlExists(existing)) => return Ok(existing),
                Ok(InsertOutcome::KeyTaken) => {
                    tracing::warn!(%key, attempt, "key collision");
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "inserting a new key failed");
                }
            }
        }

        Err(AppError::KeyAttemptsExhausted(self.max_key_attempts))
    }

    /// Looks up the redirect target for a key taken from a request path
    #[tracing::instrument(name = "app::resolve", skip(self))]
    pub async fn resolve(&self, key: &str) -> Result<String, AppError> {
        // nothing but well-formed keys is ever stored
        let Ok(key) = Key::parse(key) else {
            return Err(AppError::NotFound);
        };

        let stored = self
            .db
            .url_for_key(&key)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(redirect_target(&stored))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

pub async fn run(settings: Settings) -> Result<()> {
    let db = PgDatabase::connect(settings.database_url.as_str()).await?;
    tracing::info!("Successfully connected to database");

    let state = AppState::from_settings(Arc::new(db), &settings);
    let router = api::build_router(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("App running on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub(crate) mod memory;
pub(crate) mod models;
pub(crate) mod postgres;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use thiserror::Error;

use crate::core::config::Settings;

/// One whole collection as read from the store, together with the version
/// token expected back on the next write.
#[derive(Debug, Default)]
pub(crate) struct Versioned {
    pub(crate) records: Vec<serde_json::Value>,
    pub(crate) version: i64,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("version conflict on '{key}': expected {expected}, found {found}")]
    VersionConflict { key: String, expected: i64, found: i64 },
    #[error(transparent)]
    Codec(#[from] serde_json::Error),
    #[error("storage backend: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Key-addressed record store. Each collection lives whole under one key;
/// `put` replaces the collection and bumps its version, failing when the
/// caller's expected version no longer matches (lost-update guard).
#[async_trait]
pub(crate) trait RecordStore: Send + Sync {
    /// Missing keys read as an empty collection at version 0.
    async fn get(&self, key: &str) -> Result<Versioned, StoreError>;

    /// Returns the new version on success.
    async fn put(
        &self,
        key: &str,
        records: Vec<serde_json::Value>,
        expected_version: i64,
    ) -> Result<i64, StoreError>;
}

pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database_url = settings.database().database_url();
    let mut connect_options: PgConnectOptions = database_url.parse()?;

    connect_options = connect_options
        .application_name("acadia-rust")
        .log_statements(tracing::log::LevelFilter::Off);

    PgPoolOptions::new()
        .max_connections(30)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{RecordStore, StoreError, Versioned};

/// Record store over a single `collections` table: one row per key, the
/// collection as a JSONB array, and a version column used for compare-and-swap.
pub(crate) struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, key: &str) -> Result<i64, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM collections WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(version.unwrap_or(0))
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get(&self, key: &str) -> Result<Versioned, StoreError> {
        let row: Option<(serde_json::Value, i64)> =
            sqlx::query_as("SELECT records, version FROM collections WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((records, version)) = row else {
            return Ok(Versioned::default());
        };

        let serde_json::Value::Array(records) = records else {
            return Err(StoreError::Backend(format!("collection '{key}' is not a JSON array")));
        };

        Ok(Versioned { records, version })
    }

    async fn put(
        &self,
        key: &str,
        records: Vec<serde_json::Value>,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let records = serde_json::Value::Array(records);
        let new_version: Option<i64> = if expected_version == 0 {
            sqlx::query_scalar(
                "INSERT INTO collections (key, records, version, updated_at)
                 VALUES ($1, $2, 1, now())
                 ON CONFLICT (key) DO UPDATE
                     SET records = EXCLUDED.records,
                         version = collections.version + 1,
                         updated_at = now()
                     WHERE collections.version = 0
                 RETURNING version",
            )
            .bind(key)
            .bind(records)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "UPDATE collections
                 SET records = $2, version = version + 1, updated_at = now()
                 WHERE key = $1 AND version = $3
                 RETURNING version",
            )
            .bind(key)
            .bind(records)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?
        };

        match new_version {
            Some(version) => Ok(version),
            None => {
                let found = self.current_version(key).await?;
                Err(StoreError::VersionConflict {
                    key: key.to_string(),
                    expected: expected_version,
                    found,
                })
            }
        }
    }
}

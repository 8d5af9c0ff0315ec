use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::{RecordStore, StoreError, Versioned};

/// In-memory record store with the same CAS semantics as the Postgres one.
/// Backs tests and local demos.
#[derive(Default)]
pub(crate) struct MemoryRecordStore {
    collections: Mutex<HashMap<String, (Vec<serde_json::Value>, i64)>>,
}

impl MemoryRecordStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &str) -> Result<Versioned, StoreError> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))?;

        Ok(match collections.get(key) {
            Some((records, version)) => Versioned { records: records.clone(), version: *version },
            None => Versioned::default(),
        })
    }

    async fn put(
        &self,
        key: &str,
        records: Vec<serde_json::Value>,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))?;

        let found = collections.get(key).map(|(_, version)| *version).unwrap_or(0);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
                found,
            });
        }

        let new_version = found + 1;
        collections.insert(key.to_string(), (records, new_version));
        Ok(new_version)
    }
}

pub(crate) mod gradebook;
pub(crate) mod quizzes;
pub(crate) mod submissions;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{RecordStore, StoreError};

/// Reads a whole collection and decodes every record. The store has no
/// secondary indexes, so callers filter in memory after the read.
pub(crate) async fn load_collection<T: DeserializeOwned>(
    store: &dyn RecordStore,
    key: &str,
) -> Result<(Vec<T>, i64), StoreError> {
    let snapshot = store.get(key).await?;
    let items = snapshot
        .records
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok((items, snapshot.version))
}

/// Whole-collection replace-on-write with the version read earlier.
pub(crate) async fn save_collection<T: Serialize>(
    store: &dyn RecordStore,
    key: &str,
    items: &[T],
    expected_version: i64,
) -> Result<i64, StoreError> {
    let records = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<serde_json::Value>, _>>()?;
    store.put(key, records, expected_version).await
}

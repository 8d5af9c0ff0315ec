use crate::db::models::GradebookEntry;
use crate::db::{RecordStore, StoreError};

pub(crate) const KEY: &str = "gradebook";

pub(crate) async fn load(store: &dyn RecordStore) -> Result<(Vec<GradebookEntry>, i64), StoreError> {
    super::load_collection(store, KEY).await
}

pub(crate) async fn save(
    store: &dyn RecordStore,
    entries: &[GradebookEntry],
    expected_version: i64,
) -> Result<i64, StoreError> {
    super::save_collection(store, KEY, entries, expected_version).await
}

pub(crate) async fn list_by_course(
    store: &dyn RecordStore,
    course_id: &str,
) -> Result<Vec<GradebookEntry>, StoreError> {
    let (entries, _) = load(store).await?;
    Ok(entries.into_iter().filter(|entry| entry.course_id == course_id).collect())
}

pub(crate) async fn list_by_student(
    store: &dyn RecordStore,
    student_id: &str,
) -> Result<Vec<GradebookEntry>, StoreError> {
    let (entries, _) = load(store).await?;
    Ok(entries.into_iter().filter(|entry| entry.student_id == student_id).collect())
}

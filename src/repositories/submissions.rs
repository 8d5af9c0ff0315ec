use crate::db::models::Submission;
use crate::db::{RecordStore, StoreError};

pub(crate) const KEY: &str = "submissions";

pub(crate) async fn load(store: &dyn RecordStore) -> Result<(Vec<Submission>, i64), StoreError> {
    super::load_collection(store, KEY).await
}

pub(crate) async fn save(
    store: &dyn RecordStore,
    submissions: &[Submission],
    expected_version: i64,
) -> Result<i64, StoreError> {
    super::save_collection(store, KEY, submissions, expected_version).await
}

pub(crate) async fn find_by_id(
    store: &dyn RecordStore,
    submission_id: &str,
) -> Result<Option<Submission>, StoreError> {
    let (submissions, _) = load(store).await?;
    Ok(submissions.into_iter().find(|submission| submission.id == submission_id))
}

pub(crate) async fn list_by_quiz(
    store: &dyn RecordStore,
    quiz_id: &str,
) -> Result<Vec<Submission>, StoreError> {
    let (submissions, _) = load(store).await?;
    Ok(submissions.into_iter().filter(|submission| submission.quiz_id == quiz_id).collect())
}

pub(crate) async fn list_by_student(
    store: &dyn RecordStore,
    student_id: &str,
) -> Result<Vec<Submission>, StoreError> {
    let (submissions, _) = load(store).await?;
    Ok(submissions.into_iter().filter(|submission| submission.student_id == student_id).collect())
}

pub(crate) async fn any_for_quiz(
    store: &dyn RecordStore,
    quiz_id: &str,
) -> Result<bool, StoreError> {
    let (submissions, _) = load(store).await?;
    Ok(submissions.iter().any(|submission| submission.quiz_id == quiz_id))
}

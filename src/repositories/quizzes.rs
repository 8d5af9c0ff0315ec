use crate::db::models::Quiz;
use crate::db::{RecordStore, StoreError};

pub(crate) const KEY: &str = "quizzes";

pub(crate) async fn load(store: &dyn RecordStore) -> Result<(Vec<Quiz>, i64), StoreError> {
    super::load_collection(store, KEY).await
}

pub(crate) async fn save(
    store: &dyn RecordStore,
    quizzes: &[Quiz],
    expected_version: i64,
) -> Result<i64, StoreError> {
    super::save_collection(store, KEY, quizzes, expected_version).await
}

pub(crate) async fn find_by_id(
    store: &dyn RecordStore,
    quiz_id: &str,
) -> Result<Option<Quiz>, StoreError> {
    let (quizzes, _) = load(store).await?;
    Ok(quizzes.into_iter().find(|quiz| quiz.id == quiz_id))
}

pub(crate) async fn list_by_course(
    store: &dyn RecordStore,
    course_id: &str,
) -> Result<Vec<Quiz>, StoreError> {
    let (quizzes, _) = load(store).await?;
    Ok(quizzes.into_iter().filter(|quiz| quiz.course_id == course_id).collect())
}

pub(crate) async fn list_by_instructor(
    store: &dyn RecordStore,
    instructor_id: &str,
) -> Result<Vec<Quiz>, StoreError> {
    let (quizzes, _) = load(store).await?;
    Ok(quizzes.into_iter().filter(|quiz| quiz.instructor_id == instructor_id).collect())
}

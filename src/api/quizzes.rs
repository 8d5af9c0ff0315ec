use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::{Question, Quiz};
use crate::schemas::quiz::{
    QuestionCreate, QuizCreate, QuizUpdate, ReorderRequest, StudentQuizView,
};
use crate::services::catalog;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quiz).get(list_quizzes))
        .route("/:quiz_id", get(get_quiz).patch(update_quiz).delete(delete_quiz))
        .route("/:quiz_id/publish", post(publish_quiz))
        .route("/:quiz_id/questions", post(add_question))
        .route("/:quiz_id/questions/order", put(reorder_questions))
        .route("/:quiz_id/questions/:question_id", axum::routing::delete(remove_question))
        .route("/:quiz_id/student-view", get(student_view))
        .route("/question-template/:question_type", get(question_template))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    course_id: Option<String>,
    instructor_id: Option<String>,
    student_id: Option<String>,
    #[serde(default)]
    skip: usize,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: usize,
}

impl ListQuery {
    fn page(&self) -> PageQuery {
        PageQuery { skip: self.skip, limit: self.limit }
    }
}

#[derive(Debug, Deserialize)]
struct StudentViewQuery {
    student_id: String,
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let quiz = catalog::create_quiz(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<Quiz>>, ApiError> {
    let quizzes = match (&query.course_id, &query.instructor_id, &query.student_id) {
        (Some(course_id), None, Some(student_id)) => {
            catalog::list_for_student(&state, course_id, student_id).await?
        }
        (Some(course_id), None, None) => catalog::list_by_course(&state, course_id).await?,
        (None, Some(instructor_id), None) => {
            catalog::list_by_instructor(&state, instructor_id).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "pass course_id, course_id with student_id, or instructor_id".to_string(),
            ))
        }
    };
    Ok(Json(PaginatedResponse::paginate(quizzes, &query.page())))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Quiz>, ApiError> {
    Ok(Json(catalog::get_quiz(&state, &quiz_id).await?))
}

async fn update_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<QuizUpdate>,
) -> Result<Json<Quiz>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(catalog::update_quiz(&state, &quiz_id, payload).await?))
}

async fn delete_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_quiz(&state, &quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Quiz>, ApiError> {
    Ok(Json(catalog::publish_quiz(&state, &quiz_id).await?))
}

async fn add_question(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let quiz = catalog::add_question(&state, &quiz_id, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn remove_question(
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<Json<Quiz>, ApiError> {
    Ok(Json(catalog::remove_question(&state, &quiz_id, &question_id).await?))
}

async fn reorder_questions(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Quiz>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(catalog::reorder_questions(&state, &quiz_id, payload.question_ids).await?))
}

async fn question_template(
    Path(question_type): Path<String>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(catalog::question_template(&question_type)?))
}

async fn student_view(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Query(query): Query<StudentViewQuery>,
) -> Result<Json<StudentQuizView>, ApiError> {
    Ok(Json(catalog::student_view(&state, &quiz_id, &query.student_id).await?))
}

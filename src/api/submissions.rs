use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::Submission;
use crate::schemas::submission::{ManualGradeRequest, StartSubmissionRequest, SubmitAnswersRequest};
use crate::services::{grading, ledger};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_attempt).get(list_submissions))
        .route("/:submission_id", get(get_submission))
        .route("/:submission_id/submit", post(submit_answers))
        .route("/:submission_id/grade", post(auto_grade))
        .route("/:submission_id/manual-grade", post(manual_grade))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    quiz_id: Option<String>,
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

async fn start_attempt(
    State(state): State<AppState>,
    Json(payload): Json<StartSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let submission = ledger::start_attempt(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<Submission>>, ApiError> {
    let submissions = match (&query.quiz_id, &query.student_id) {
        (Some(quiz_id), None) => ledger::list_by_quiz(&state, quiz_id).await?,
        (None, Some(student_id)) => ledger::list_by_student(&state, student_id).await?,
        _ => {
            return Err(ApiError::BadRequest(
                "pass exactly one of quiz_id or student_id".to_string(),
            ))
        }
    };
    Ok(Json(PaginatedResponse::paginate(submissions, &query.page())))
}

async fn get_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> Result<Json<Submission>, ApiError> {
    Ok(Json(ledger::get_submission(&state, &submission_id).await?))
}

async fn submit_answers(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<Json<Submission>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(ledger::submit_answers(&state, &submission_id, payload).await?))
}

async fn auto_grade(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> Result<Json<Submission>, ApiError> {
    Ok(Json(grading::auto_grade(&state, &submission_id).await?))
}

async fn manual_grade(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(payload): Json<ManualGradeRequest>,
) -> Result<Json<Submission>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(grading::manual_grade(&state, &submission_id, payload).await?))
}

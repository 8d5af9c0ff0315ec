use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::EngineError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::QuizNotFound(_)
            | EngineError::SubmissionNotFound(_)
            | EngineError::UnknownQuestion(_) => ApiError::NotFound(err.to_string()),
            EngineError::InvalidQuestionType(_)
            | EngineError::Validation(_)
            | EngineError::InvalidSettings(_)
            | EngineError::StaleMetadata => ApiError::BadRequest(err.to_string()),
            EngineError::EmptyQuiz
            | EngineError::AlreadySubmitted
            | EngineError::NotSubmitted
            | EngineError::AlreadyGraded
            | EngineError::AttemptLimitReached
            | EngineError::QuizHasSubmissions
            | EngineError::ConcurrentModification => ApiError::Conflict(err.to_string()),
            EngineError::Store(inner) => {
                tracing::error!(error = %inner, "Record store failure");
                ApiError::Internal("Record store failure".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
    }
}

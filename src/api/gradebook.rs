use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::GradebookEntry;
use crate::services::gradebook;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses/:course_id", get(course_entries))
        .route("/students/:student_id", get(student_entries))
}

async fn course_entries(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<GradebookEntry>>, ApiError> {
    let entries = gradebook::list_by_course(&state, &course_id).await?;
    Ok(Json(PaginatedResponse::paginate(entries, &page)))
}

async fn student_entries(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<GradebookEntry>>, ApiError> {
    let entries = gradebook::list_by_student(&state, &student_id).await?;
    Ok(Json(PaginatedResponse::paginate(entries, &page)))
}

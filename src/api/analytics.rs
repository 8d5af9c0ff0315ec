use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::InstructorAnalytics;
use crate::services::analytics;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/instructors/:instructor_id", get(instructor_analytics))
}

async fn instructor_analytics(
    State(state): State<AppState>,
    Path(instructor_id): Path<String>,
) -> Result<Json<InstructorAnalytics>, ApiError> {
    Ok(Json(analytics::instructor_analytics(&state, &instructor_id).await?))
}

use axum::{
    http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    http::{HeaderName, Method, Request, Response},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::api::analytics;
use crate::api::gradebook;
use crate::api::handlers;
use crate::api::quizzes;
use crate::api::submissions;
use crate::core::{config::Settings, state::AppState};

pub(crate) fn router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings());
    let api_v1_prefix = state.settings().api().api_v1_str.clone();
    let api_v1 = Router::new()
        .nest("/quizzes", quizzes::router())
        .nest("/submissions", submissions::router())
        .nest("/gradebook", gradebook::router())
        .nest("/analytics", analytics::router());

    let request_id_header = HeaderName::from_static("x-request-id");
    let request_id_header_for_span = request_id_header.clone();
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<_>| {
            let request_id = request
                .headers()
                .get(&request_id_header_for_span)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_response(|response: &Response<axum::body::Body>, latency: Duration, _span: &Span| {
            let status_label = response.status().as_u16().to_string();
            metrics::counter!(
                "http_requests_total",
                "status" => status_label.clone()
            )
            .increment(1);
            metrics::histogram!(
                "http_request_duration_seconds",
                "status" => status_label
            )
            .record(latency.as_secs_f64());
        });

    let mut router: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz))
        .nest(&api_v1_prefix, api_v1)
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(trace_layer)
        .layer(cors);

    if state.settings().telemetry().prometheus_enabled {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router.with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            ORIGIN,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        // Wildcard origin cannot be combined with allow_credentials
        base.allow_origin(Any)
    } else {
        base.allow_credentials(true).allow_origin(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::test_support::{self, read_json};

    #[tokio::test]
    async fn root_reports_service_and_version() {
        let ctx = test_support::test_context().await;
        let response = ctx
            .app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["message"], "Acadia Assessment API");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn healthz_reports_the_store_component() {
        let ctx = test_support::test_context().await;
        let response = ctx
            .app
            .clone()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["store"], "healthy");
    }

    #[tokio::test]
    async fn unknown_quiz_maps_to_404_with_problem_body() {
        let ctx = test_support::test_context().await;
        let response = ctx
            .app
            .clone()
            .oneshot(
                Request::builder().uri("/api/v1/quizzes/missing").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = read_json(response).await;
        assert_eq!(body["status"], 404);
        assert!(body["detail"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn listing_without_a_filter_is_a_bad_request() {
        let ctx = test_support::test_context().await;
        let response = ctx
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/quizzes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quiz_lifecycle_over_http() {
        let ctx = test_support::test_context().await;

        let create = test_support::json_request(
            "POST",
            "/api/v1/quizzes",
            serde_json::json!({
                "course_id": "course-1",
                "instructor_id": "inst-1",
                "title": "Geography basics",
                "questions": [{
                    "question_type": "multiple-choice",
                    "text": "Capital of France?",
                    "points": 10,
                    "options": ["Paris", "Lyon"],
                    "correct_answer": "Paris"
                }]
            }),
        );
        let response = ctx.app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let quiz = read_json(response).await;
        let quiz_id = quiz["id"].as_str().unwrap().to_string();
        assert_eq!(quiz["metadata"]["total_points"], 10);

        let publish = test_support::json_request(
            "POST",
            &format!("/api/v1/quizzes/{quiz_id}/publish"),
            serde_json::json!({}),
        );
        let response = ctx.app.clone().oneshot(publish).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let start = test_support::json_request(
            "POST",
            "/api/v1/submissions",
            serde_json::json!({
                "quiz_id": quiz_id,
                "student_id": "s1",
                "student_name": "Sam Lee"
            }),
        );
        let response = ctx.app.clone().oneshot(start).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let submission = read_json(response).await;
        let submission_id = submission["id"].as_str().unwrap().to_string();
        assert_eq!(submission["max_score"], 10);

        let question_id = quiz["questions"][0]["id"].as_str().unwrap();
        let submit = test_support::json_request(
            "POST",
            &format!("/api/v1/submissions/{submission_id}/submit"),
            serde_json::json!({
                "answers": [{ "question_id": question_id, "answer": "Paris" }]
            }),
        );
        let response = ctx.app.clone().oneshot(submit).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let grade = test_support::json_request(
            "POST",
            &format!("/api/v1/submissions/{submission_id}/grade"),
            serde_json::json!({}),
        );
        let response = ctx.app.clone().oneshot(grade).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let graded = read_json(response).await;
        assert_eq!(graded["total_score"], 10);
        assert_eq!(graded["status"], "graded");

        let response = ctx
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/gradebook/students/s1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let entries = read_json(response).await;
        assert_eq!(entries["total_count"], 1);
        assert_eq!(entries["items"][0]["percentage"], 100.0);

        // Deleting a quiz with submissions is refused.
        let response = ctx
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/quizzes/{quiz_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}

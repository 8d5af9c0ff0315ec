use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::core::{config::Settings, state::AppState};
use crate::db::memory::MemoryRecordStore;
use crate::db::types::AnswerValue;
use crate::schemas::quiz::{QuestionCreate, QuizCreate};
use crate::schemas::submission::{AnswerInput, StartSubmissionRequest};
use crate::services::catalog;
use crate::services::directory::{CourseDirectory, RosterCourse, RosterDirectory};

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("ACADIA_ENV", "test");
    std::env::set_var("ACADIA_STRICT_CONFIG", "0");
    std::env::set_var("ACADIA_RANKING_GRADING", "strict");
    std::env::remove_var("ACADIA_ROSTER_FILE");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

/// In-memory engine wired exactly like production, minus Postgres: the
/// record store is a `MemoryRecordStore` and the directory is a fixed
/// two-student roster.
pub(crate) async fn test_context() -> TestContext {
    test_context_with_roster(roster()).await
}

pub(crate) async fn test_context_with_roster(courses: Vec<RosterCourse>) -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let store = Arc::new(MemoryRecordStore::default());
    let directory: Arc<dyn CourseDirectory> = Arc::new(RosterDirectory::new(courses));
    let state = AppState::new(settings, store, directory);
    let app = api::router(state.clone());

    TestContext { state, app, _guard: guard }
}

pub(crate) fn roster() -> Vec<RosterCourse> {
    vec![RosterCourse {
        id: "course-1".to_string(),
        title: "World Geography".to_string(),
        instructor_id: "inst-1".to_string(),
        instructor_name: "Dana Roe".to_string(),
        enrolled_students: vec!["s1".to_string(), "s2".to_string()],
    }]
}

pub(crate) fn quiz_payload(questions: Vec<QuestionCreate>) -> QuizCreate {
    QuizCreate {
        course_id: "course-1".to_string(),
        instructor_id: "inst-1".to_string(),
        title: "Geography basics".to_string(),
        description: String::new(),
        instructions: None,
        settings: None,
        categories: vec![],
        tags: vec![],
        assigned_students: vec![],
        questions,
    }
}

pub(crate) fn mc_question(
    text: &str,
    options: &[&str],
    correct: &str,
    points: i64,
) -> QuestionCreate {
    QuestionCreate {
        question_type: "multiple-choice".to_string(),
        text: text.to_string(),
        points,
        required: true,
        options: options.iter().map(|option| option.to_string()).collect(),
        correct_answer: Some(AnswerValue::Text(correct.to_string())),
        difficulty: None,
        category: None,
        tags: vec![],
        media: vec![],
    }
}

pub(crate) fn essay_question(points: i64) -> QuestionCreate {
    QuestionCreate {
        question_type: "essay".to_string(),
        text: "Discuss in your own words".to_string(),
        points,
        required: true,
        options: vec![],
        correct_answer: None,
        difficulty: None,
        category: None,
        tags: vec![],
        media: vec![],
    }
}

/// Creates and publishes a quiz in one step.
pub(crate) async fn published_quiz(
    state: &AppState,
    questions: Vec<QuestionCreate>,
) -> crate::db::models::Quiz {
    let quiz = catalog::create_quiz(state, quiz_payload(questions)).await.expect("create quiz");
    catalog::publish_quiz(state, &quiz.id).await.expect("publish quiz")
}

pub(crate) fn start_request(quiz_id: &str, student_id: &str) -> StartSubmissionRequest {
    StartSubmissionRequest {
        quiz_id: quiz_id.to_string(),
        student_id: student_id.to_string(),
        student_name: format!("Student {student_id}"),
    }
}

pub(crate) fn answer(question_id: &str, text: &str) -> AnswerInput {
    AnswerInput {
        question_id: question_id.to_string(),
        answer: AnswerValue::Text(text.to_string()),
    }
}

pub(crate) fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method.parse::<Method>().expect("method"))
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(crate) async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

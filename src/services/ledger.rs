use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{AnswerRecord, Submission};
use crate::db::types::SubmissionStatus;
use crate::repositories::{quizzes, submissions};
use crate::schemas::submission::{StartSubmissionRequest, SubmitAnswersRequest};
use crate::services::EngineError;

/// Opens a new attempt. The quiz must be published and visible to the
/// student; its current total points are frozen onto the submission so
/// later quiz edits cannot move the denominator.
pub(crate) async fn start_attempt(
    state: &AppState,
    payload: StartSubmissionRequest,
) -> Result<Submission, EngineError> {
    let quiz = quizzes::find_by_id(state.store(), &payload.quiz_id)
        .await?
        .filter(|quiz| quiz.visible_to(&payload.student_id))
        .ok_or_else(|| EngineError::QuizNotFound(payload.quiz_id.clone()))?;

    let existing = submissions::list_by_quiz(state.store(), &quiz.id).await?;
    let attempts = existing
        .iter()
        .filter(|submission| submission.student_id == payload.student_id)
        .count() as i64;
    let allowed = if quiz.settings.allow_multiple_attempts { quiz.settings.max_attempts } else { 1 };
    if attempts >= allowed {
        return Err(EngineError::AttemptLimitReached);
    }

    let submission = Submission {
        id: Uuid::new_v4().to_string(),
        quiz_id: quiz.id.clone(),
        student_id: payload.student_id,
        student_name: payload.student_name,
        answers: Vec::new(),
        total_score: None,
        max_score: quiz.metadata.total_points,
        status: SubmissionStatus::InProgress,
        started_at: now_utc(),
        submitted_at: None,
        graded_at: None,
    };

    let (mut all, version) = submissions::load(state.store()).await?;
    all.push(submission.clone());
    submissions::save(state.store(), &all, version).await?;

    tracing::info!(
        submission_id = %submission.id,
        quiz_id = %submission.quiz_id,
        student_id = %submission.student_id,
        "Attempt started"
    );
    Ok(submission)
}

/// Records the student's answers and seals the attempt. Answers arrive
/// ungraded; scoring fields stay empty until the grading pass runs.
pub(crate) async fn submit_answers(
    state: &AppState,
    submission_id: &str,
    payload: SubmitAnswersRequest,
) -> Result<Submission, EngineError> {
    let (mut all, version) = submissions::load(state.store()).await?;
    let submission = all
        .iter_mut()
        .find(|submission| submission.id == submission_id)
        .ok_or_else(|| EngineError::SubmissionNotFound(submission_id.to_string()))?;

    if submission.status != SubmissionStatus::InProgress {
        return Err(EngineError::AlreadySubmitted);
    }

    let quiz = quizzes::find_by_id(state.store(), &submission.quiz_id)
        .await?
        .ok_or_else(|| EngineError::QuizNotFound(submission.quiz_id.clone()))?;
    let mut seen = std::collections::HashSet::new();
    for answer in &payload.answers {
        if quiz.question(&answer.question_id).is_none() {
            return Err(EngineError::UnknownQuestion(answer.question_id.clone()));
        }
        if !seen.insert(answer.question_id.as_str()) {
            return Err(EngineError::Validation(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }
    }

    submission.answers = payload
        .answers
        .into_iter()
        .map(|input| AnswerRecord {
            question_id: input.question_id,
            answer: input.answer,
            points: None,
            is_correct: None,
            feedback: None,
        })
        .collect();
    submission.status = SubmissionStatus::Submitted;
    submission.submitted_at = Some(now_utc());
    let sealed = submission.clone();

    submissions::save(state.store(), &all, version).await?;

    tracing::info!(
        submission_id = %sealed.id,
        answers = sealed.answers.len(),
        "Submission sealed"
    );
    Ok(sealed)
}

pub(crate) async fn get_submission(
    state: &AppState,
    submission_id: &str,
) -> Result<Submission, EngineError> {
    submissions::find_by_id(state.store(), submission_id)
        .await?
        .ok_or_else(|| EngineError::SubmissionNotFound(submission_id.to_string()))
}

pub(crate) async fn list_by_quiz(
    state: &AppState,
    quiz_id: &str,
) -> Result<Vec<Submission>, EngineError> {
    Ok(submissions::list_by_quiz(state.store(), quiz_id).await?)
}

pub(crate) async fn list_by_student(
    state: &AppState,
    student_id: &str,
) -> Result<Vec<Submission>, EngineError> {
    Ok(submissions::list_by_student(state.store(), student_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::AnswerValue;
    use crate::schemas::submission::AnswerInput;
    use crate::services::catalog;
    use crate::test_support;

    #[tokio::test]
    async fn start_freezes_max_score_against_later_edits() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Q1", &["a", "b"], "a", 10)],
        )
        .await;

        let submission = start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect("start");
        assert_eq!(submission.max_score, 10);
        assert_eq!(submission.status, SubmissionStatus::InProgress);

        catalog::add_question(
            &ctx.state,
            &quiz.id,
            test_support::mc_question("Q2", &["c", "d"], "c", 40),
        )
        .await
        .expect("grow quiz");

        let reloaded = get_submission(&ctx.state, &submission.id).await.expect("reload");
        assert_eq!(reloaded.max_score, 10);
    }

    #[tokio::test]
    async fn start_rejects_draft_and_unassigned_quizzes() {
        let ctx = test_support::test_context().await;
        let draft = catalog::create_quiz(
            &ctx.state,
            test_support::quiz_payload(vec![test_support::mc_question("Q", &["a", "b"], "a", 5)]),
        )
        .await
        .expect("create");

        let err = start_attempt(&ctx.state, test_support::start_request(&draft.id, "s1"))
            .await
            .expect_err("draft");
        assert!(matches!(err, EngineError::QuizNotFound(_)));

        let mut payload =
            test_support::quiz_payload(vec![test_support::mc_question("Q", &["a", "b"], "a", 5)]);
        payload.assigned_students = vec!["s2".to_string()];
        let restricted = catalog::create_quiz(&ctx.state, payload).await.expect("create");
        catalog::publish_quiz(&ctx.state, &restricted.id).await.expect("publish");

        let err = start_attempt(&ctx.state, test_support::start_request(&restricted.id, "s1"))
            .await
            .expect_err("unassigned");
        assert!(matches!(err, EngineError::QuizNotFound(_)));
    }

    #[tokio::test]
    async fn attempt_limit_counts_per_student() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Q", &["a", "b"], "a", 5)],
        )
        .await;

        start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect("first attempt");
        let err = start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect_err("second attempt");
        assert!(matches!(err, EngineError::AttemptLimitReached));

        // A different student is unaffected.
        start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s2"))
            .await
            .expect("other student");
    }

    #[tokio::test]
    async fn submit_seals_the_attempt_exactly_once() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Capital of France?", &["Paris", "Lyon"], "Paris", 10)],
        )
        .await;
        let submission = start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect("start");

        let answers = SubmitAnswersRequest {
            answers: vec![AnswerInput {
                question_id: quiz.questions[0].id.clone(),
                answer: AnswerValue::Text("Paris".to_string()),
            }],
        };
        let sealed = submit_answers(&ctx.state, &submission.id, answers)
            .await
            .expect("submit");
        assert_eq!(sealed.status, SubmissionStatus::Submitted);
        assert!(sealed.submitted_at.is_some());
        assert!(sealed.answers[0].points.is_none(), "scoring waits for the grading pass");

        let err = submit_answers(&ctx.state, &submission.id, SubmitAnswersRequest { answers: vec![] })
            .await
            .expect_err("resubmit");
        assert!(matches!(err, EngineError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn submit_rejects_repeated_answers_to_one_question() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Q", &["a", "b"], "a", 10)],
        )
        .await;
        let submission = start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect("start");

        // Repeating a correct answer must not multiply its points.
        let question_id = quiz.questions[0].id.clone();
        let answers = SubmitAnswersRequest {
            answers: (0..3)
                .map(|_| AnswerInput {
                    question_id: question_id.clone(),
                    answer: AnswerValue::Text("a".to_string()),
                })
                .collect(),
        };
        let err = submit_answers(&ctx.state, &submission.id, answers)
            .await
            .expect_err("duplicate answers");
        assert!(matches!(err, EngineError::Validation(_)));

        let reloaded = get_submission(&ctx.state, &submission.id).await.expect("reload");
        assert_eq!(reloaded.status, SubmissionStatus::InProgress);
        assert!(reloaded.answers.is_empty());
    }

    #[tokio::test]
    async fn submit_rejects_answers_for_unknown_questions() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Q", &["a", "b"], "a", 5)],
        )
        .await;
        let submission = start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
            .await
            .expect("start");

        let answers = SubmitAnswersRequest {
            answers: vec![AnswerInput {
                question_id: "no-such-question".to_string(),
                answer: AnswerValue::Text("a".to_string()),
            }],
        };
        let err = submit_answers(&ctx.state, &submission.id, answers)
            .await
            .expect_err("unknown question");
        assert!(matches!(err, EngineError::UnknownQuestion(_)));

        let reloaded = get_submission(&ctx.state, &submission.id).await.expect("reload");
        assert_eq!(reloaded.status, SubmissionStatus::InProgress);
    }
}

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{Question, Submission};
use crate::db::types::{AnswerShape, AnswerValue, RankingGrading, SubmissionStatus};
use crate::repositories::{quizzes, submissions};
use crate::schemas::submission::ManualGradeRequest;
use crate::services::{gradebook, EngineError};

pub(crate) const PENDING_FEEDBACK: &str = "Pending manual review";

/// Verdict for a single answer. A pending answer carries zero points and no
/// correctness verdict until an instructor overrides it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Verdict {
    pub(crate) points: Option<i64>,
    pub(crate) is_correct: Option<bool>,
    pub(crate) feedback: Option<String>,
    pub(crate) pending: bool,
}

impl Verdict {
    fn pending() -> Self {
        Self {
            points: Some(0),
            is_correct: None,
            feedback: Some(PENDING_FEEDBACK.to_string()),
            pending: true,
        }
    }

    fn scored(question: &Question, correct: bool) -> Self {
        Self {
            points: Some(if correct { question.points } else { 0 }),
            is_correct: Some(correct),
            feedback: None,
            pending: false,
        }
    }
}

/// Deterministic per-answer scoring. All comparisons are exact string
/// equality; auto-gradable types without an answer key fall through to
/// manual review instead of being marked wrong.
pub(crate) fn evaluate_answer(
    question: &Question,
    submitted: &AnswerValue,
    ranking: RankingGrading,
) -> Verdict {
    let shape = question.question_type.answer_shape();
    let Some(key) = &question.correct_answer else {
        return Verdict::pending();
    };

    match shape {
        AnswerShape::Manual => Verdict::pending(),
        AnswerShape::Scalar => {
            let correct = match (key.as_text(), submitted.as_text()) {
                (Some(expected), Some(actual)) => expected == actual,
                _ => false,
            };
            Verdict::scored(question, correct)
        }
        AnswerShape::Unordered => {
            let correct = match (key.as_list(), submitted.as_list()) {
                (Some(expected), Some(actual)) => {
                    let mut expected = expected.to_vec();
                    let mut actual = actual.to_vec();
                    expected.sort();
                    actual.sort();
                    expected == actual
                }
                _ => false,
            };
            Verdict::scored(question, correct)
        }
        AnswerShape::Ordered => {
            let correct = match (key.as_list(), submitted.as_list()) {
                (Some(expected), Some(actual)) => match ranking {
                    RankingGrading::Strict => expected == actual,
                    RankingGrading::Lenient => {
                        let mut expected = expected.to_vec();
                        let mut actual = actual.to_vec();
                        expected.sort();
                        actual.sort();
                        expected == actual
                    }
                },
                _ => false,
            };
            Verdict::scored(question, correct)
        }
    }
}

/// Scores every recorded answer against the quiz's current answer keys,
/// seals the total, and projects the result into the gradebook. Runs at
/// most once per submission; regrading goes through `manual_grade`.
pub(crate) async fn auto_grade(
    state: &AppState,
    submission_id: &str,
) -> Result<Submission, EngineError> {
    let ranking = state.settings().grading().ranking_grading;

    let (mut all, version) = submissions::load(state.store()).await?;
    let submission = all
        .iter_mut()
        .find(|submission| submission.id == submission_id)
        .ok_or_else(|| EngineError::SubmissionNotFound(submission_id.to_string()))?;

    match submission.status {
        SubmissionStatus::InProgress => return Err(EngineError::NotSubmitted),
        SubmissionStatus::Graded => return Err(EngineError::AlreadyGraded),
        SubmissionStatus::Submitted => {}
    }

    let quiz = quizzes::find_by_id(state.store(), &submission.quiz_id)
        .await?
        .ok_or_else(|| EngineError::QuizNotFound(submission.quiz_id.clone()))?;

    let mut pending = 0usize;
    for record in &mut submission.answers {
        match quiz.question(&record.question_id) {
            Some(question) => {
                let verdict = evaluate_answer(question, &record.answer, ranking);
                if verdict.pending {
                    pending += 1;
                }
                record.points = verdict.points;
                record.is_correct = verdict.is_correct;
                record.feedback = verdict.feedback;
            }
            None => {
                // The question was removed after the attempt started.
                record.points = Some(0);
                record.is_correct = None;
                record.feedback = None;
            }
        }
    }

    submission.total_score =
        Some(submission.answers.iter().filter_map(|record| record.points).sum());
    submission.status = SubmissionStatus::Graded;
    submission.graded_at = Some(now_utc());
    let graded = submission.clone();

    submissions::save(state.store(), &all, version).await?;
    gradebook::project(state, &graded, &quiz).await?;

    metrics::counter!("grading_runs_total", "mode" => "auto").increment(1);
    tracing::info!(
        submission_id = %graded.id,
        total_score = graded.total_score,
        pending_answers = pending,
        "Submission auto-graded"
    );
    Ok(graded)
}

/// Instructor override. Accepts submitted or already-graded submissions,
/// rewrites per-answer scores, and replaces the gradebook entry.
pub(crate) async fn manual_grade(
    state: &AppState,
    submission_id: &str,
    request: ManualGradeRequest,
) -> Result<Submission, EngineError> {
    let (mut all, version) = submissions::load(state.store()).await?;
    let submission = all
        .iter_mut()
        .find(|submission| submission.id == submission_id)
        .ok_or_else(|| EngineError::SubmissionNotFound(submission_id.to_string()))?;

    if submission.status == SubmissionStatus::InProgress {
        return Err(EngineError::NotSubmitted);
    }
    if request.total_score < 0 || request.total_score > submission.max_score {
        return Err(EngineError::Validation(format!(
            "total_score {} must lie within 0..={}",
            request.total_score, submission.max_score
        )));
    }

    let quiz = quizzes::find_by_id(state.store(), &submission.quiz_id)
        .await?
        .ok_or_else(|| EngineError::QuizNotFound(submission.quiz_id.clone()))?;

    for grade in &request.answers {
        let record = submission
            .answers
            .iter_mut()
            .find(|record| record.question_id == grade.question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(grade.question_id.clone()))?;
        record.points = Some(grade.points);
        record.is_correct = grade.is_correct;
        record.feedback = grade.feedback.clone();
    }

    submission.total_score = Some(request.total_score);
    submission.status = SubmissionStatus::Graded;
    submission.graded_at = Some(now_utc());
    let graded = submission.clone();

    submissions::save(state.store(), &all, version).await?;
    gradebook::project(state, &graded, &quiz).await?;

    metrics::counter!("grading_runs_total", "mode" => "manual").increment(1);
    tracing::info!(
        submission_id = %graded.id,
        total_score = graded.total_score,
        "Submission manually graded"
    );
    Ok(graded)
}

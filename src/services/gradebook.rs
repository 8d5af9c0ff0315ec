use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{GradebookEntry, Quiz, Submission};
use crate::repositories::gradebook as repo;
use crate::services::EngineError;

const UNKNOWN_COURSE: &str = "Unknown Course";
const UNKNOWN_INSTRUCTOR: &str = "Unknown Instructor";

/// Score as a percentage, rounded to two decimal places. A non-positive
/// denominator yields 0 instead of dividing by zero.
pub(crate) fn percentage(score: i64, max_score: i64) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    let raw = score as f64 / max_score as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Projects a graded submission into the gradebook. The entry id equals the
/// submission id, so re-running the projection replaces the previous entry
/// instead of appending a duplicate.
pub(crate) async fn project(
    state: &AppState,
    submission: &Submission,
    quiz: &Quiz,
) -> Result<GradebookEntry, EngineError> {
    let course = state.directory().find_course(&quiz.course_id).await;
    let (course_title, instructor_name) = match course {
        Some(course) => (course.title, course.instructor_name),
        None => {
            tracing::warn!(course_id = %quiz.course_id, "Course not in directory, projecting with placeholders");
            (UNKNOWN_COURSE.to_string(), UNKNOWN_INSTRUCTOR.to_string())
        }
    };

    let score = submission.total_score.unwrap_or(0);
    let entry = GradebookEntry {
        id: submission.id.clone(),
        course_id: quiz.course_id.clone(),
        course_title,
        instructor_id: quiz.instructor_id.clone(),
        instructor_name,
        student_id: submission.student_id.clone(),
        student_name: submission.student_name.clone(),
        quiz_id: quiz.id.clone(),
        quiz_title: quiz.title.clone(),
        score,
        max_score: submission.max_score,
        percentage: percentage(score, submission.max_score),
        submitted_at: submission.submitted_at,
        graded_at: submission.graded_at.unwrap_or_else(now_utc),
        status: submission.status,
    };

    let (mut entries, version) = repo::load(state.store()).await?;
    match entries.iter_mut().find(|existing| existing.id == entry.id) {
        Some(existing) => *existing = entry.clone(),
        None => entries.push(entry.clone()),
    }
    repo::save(state.store(), &entries, version).await?;

    Ok(entry)
}

pub(crate) async fn list_by_course(
    state: &AppState,
    course_id: &str,
) -> Result<Vec<GradebookEntry>, EngineError> {
    Ok(repo::list_by_course(state.store(), course_id).await?)
}

pub(crate) async fn list_by_student(
    state: &AppState,
    student_id: &str,
) -> Result<Vec<GradebookEntry>, EngineError> {
    Ok(repo::list_by_student(state.store(), student_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::submission::SubmitAnswersRequest;
    use crate::services::{grading, ledger};
    use crate::test_support;

    #[test]
    fn percentage_handles_degenerate_denominators() {
        assert_eq!(percentage(10, 0), 0.0);
        assert_eq!(percentage(10, -5), 0.0);
        assert_eq!(percentage(0, 40), 0.0);
        assert_eq!(percentage(40, 40), 100.0);
        assert_eq!(percentage(1, 3), 33.33);
    }

    #[tokio::test]
    async fn unknown_course_projects_with_placeholders() {
        let ctx = test_support::test_context().await;
        let mut payload =
            test_support::quiz_payload(vec![test_support::mc_question("Q", &["a", "b"], "a", 10)]);
        payload.course_id = "course-not-in-roster".to_string();
        let quiz = crate::services::catalog::create_quiz(&ctx.state, payload).await.expect("create");
        crate::services::catalog::publish_quiz(&ctx.state, &quiz.id).await.expect("publish");

        let submission =
            ledger::start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
                .await
                .expect("start");
        ledger::submit_answers(
            &ctx.state,
            &submission.id,
            SubmitAnswersRequest { answers: vec![test_support::answer(&quiz.questions[0].id, "a")] },
        )
        .await
        .expect("submit");
        grading::auto_grade(&ctx.state, &submission.id).await.expect("grade");

        let entries = list_by_course(&ctx.state, "course-not-in-roster").await.expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].course_title, "Unknown Course");
        assert_eq!(entries[0].instructor_name, "Unknown Instructor");
        assert_eq!(entries[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn entries_resolve_directory_names() {
        let ctx = test_support::test_context().await;
        let quiz = test_support::published_quiz(
            &ctx.state,
            vec![test_support::mc_question("Q", &["a", "b"], "a", 10)],
        )
        .await;

        let submission =
            ledger::start_attempt(&ctx.state, test_support::start_request(&quiz.id, "s1"))
                .await
                .expect("start");
        ledger::submit_answers(
            &ctx.state,
            &submission.id,
            SubmitAnswersRequest { answers: vec![test_support::answer(&quiz.questions[0].id, "b")] },
        )
        .await
        .expect("submit");
        grading::auto_grade(&ctx.state, &submission.id).await.expect("grade");

        let entries = list_by_student(&ctx.state, "s1").await.expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].course_title, "World Geography");
        assert_eq!(entries[0].instructor_name, "Dana Roe");
        assert_eq!(entries[0].score, 0);
        assert_eq!(entries[0].percentage, 0.0);
    }
}

use std::collections::HashSet;

use crate::core::state::AppState;
use crate::db::models::InstructorAnalytics;
use crate::db::types::SubmissionStatus;
use crate::repositories::{quizzes, submissions};
use crate::services::{gradebook, EngineError};

/// Dashboard rollup for one instructor, computed on demand from the live
/// collections and the course directory.
pub(crate) async fn instructor_analytics(
    state: &AppState,
    instructor_id: &str,
) -> Result<InstructorAnalytics, EngineError> {
    let courses = state.directory().courses_by_instructor(instructor_id).await;
    let students: HashSet<&str> = courses
        .iter()
        .flat_map(|course| course.enrolled_students.iter())
        .map(String::as_str)
        .collect();

    let owned_quizzes = quizzes::list_by_instructor(state.store(), instructor_id).await?;
    let quiz_ids: HashSet<&str> = owned_quizzes.iter().map(|quiz| quiz.id.as_str()).collect();

    let all_submissions = submissions::load(state.store()).await?.0;
    let mut graded_total = 0i64;
    let mut graded_max = 0i64;
    let mut awaiting_grade = 0usize;
    for submission in
        all_submissions.iter().filter(|submission| quiz_ids.contains(submission.quiz_id.as_str()))
    {
        match submission.status {
            SubmissionStatus::Graded => {
                graded_total += submission.total_score.unwrap_or(0);
                graded_max += submission.max_score;
            }
            SubmissionStatus::Submitted => awaiting_grade += 1,
            SubmissionStatus::InProgress => {}
        }
    }

    Ok(InstructorAnalytics {
        total_courses: courses.len(),
        total_students: students.len(),
        total_quizzes: owned_quizzes.len(),
        average_quiz_score: gradebook::percentage(graded_total, graded_max),
        // Both count sealed submissions awaiting a grade.
        active_submissions: awaiting_grade,
        pending_grades: awaiting_grade,
    })
}

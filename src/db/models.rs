use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::types::{AnswerValue, DifficultyLevel, QuestionType, SubmissionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) instructor_id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) instructions: Option<String>,
    #[serde(default)]
    pub(crate) questions: Vec<Question>,
    pub(crate) settings: QuizSettings,
    pub(crate) metadata: QuizMetadata,
    #[serde(default)]
    pub(crate) categories: Vec<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    /// Empty means visible to every student of the course once published.
    #[serde(default)]
    pub(crate) assigned_students: Vec<String>,
}

impl Quiz {
    pub(crate) fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }

    /// Re-derives the metadata fields that must always reflect the question
    /// list, and bumps the record version. Call after every mutation.
    pub(crate) fn recompute_metadata(&mut self, now: OffsetDateTime) {
        self.metadata.total_points = self.questions.iter().map(|question| question.points).sum();
        self.metadata.question_count = self.questions.len() as i64;
        self.metadata.updated_at = now;
        self.metadata.version += 1;
    }

    pub(crate) fn visible_to(&self, student_id: &str) -> bool {
        self.metadata.published
            && (self.assigned_students.is_empty()
                || self.assigned_students.iter().any(|id| id == student_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizMetadata {
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
    pub(crate) total_points: i64,
    pub(crate) question_count: i64,
    pub(crate) published: bool,
    pub(crate) version: i64,
}

impl QuizMetadata {
    pub(crate) fn draft(now: OffsetDateTime) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            total_points: 0,
            question_count: 0,
            published: false,
            version: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    pub(crate) points: i64,
    pub(crate) required: bool,
    /// Dense 0-based position within the quiz.
    pub(crate) order: i32,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) media: Vec<String>,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) correct_answer: Option<AnswerValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizSettings {
    #[serde(default)]
    pub(crate) time_limit_minutes: Option<i64>,
    pub(crate) passing_score: i64,
    #[serde(default)]
    pub(crate) shuffle_questions: bool,
    #[serde(default)]
    pub(crate) shuffle_options: bool,
    #[serde(default)]
    pub(crate) allow_multiple_attempts: bool,
    pub(crate) max_attempts: i64,
    #[serde(default)]
    pub(crate) show_correct_answers: bool,
    #[serde(default)]
    pub(crate) show_results: bool,
    #[serde(default)]
    pub(crate) show_feedback: bool,
    #[serde(default)]
    pub(crate) allow_review: bool,
    #[serde(default)]
    pub(crate) require_passing_grade: bool,
    #[serde(default)]
    pub(crate) schedule: Option<ScheduleWindow>,
    /// Subset size for randomized delivery; None delivers every question.
    #[serde(default)]
    pub(crate) question_pool: Option<usize>,
    /// Opaque to the engine; stored and passed through unvalidated.
    #[serde(default)]
    pub(crate) proctoring: serde_json::Value,
    #[serde(default)]
    pub(crate) accessibility: serde_json::Value,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: None,
            passing_score: 60,
            shuffle_questions: false,
            shuffle_options: false,
            allow_multiple_attempts: false,
            max_attempts: 1,
            show_correct_answers: false,
            show_results: true,
            show_feedback: true,
            allow_review: true,
            require_passing_grade: false,
            schedule: None,
            question_pool: None,
            proctoring: serde_json::Value::Null,
            accessibility: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ScheduleWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) end_date: OffsetDateTime,
    pub(crate) time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    #[serde(default)]
    pub(crate) answers: Vec<AnswerRecord>,
    #[serde(default)]
    pub(crate) total_score: Option<i64>,
    /// Quiz total points frozen at start time; later quiz edits do not move it.
    pub(crate) max_score: i64,
    pub(crate) status: SubmissionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) submitted_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) graded_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AnswerRecord {
    pub(crate) question_id: String,
    pub(crate) answer: AnswerValue,
    #[serde(default)]
    pub(crate) points: Option<i64>,
    #[serde(default)]
    pub(crate) is_correct: Option<bool>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

/// Denormalized, reportable record of one graded submission. The id equals
/// the submission id, which makes projection an upsert and guarantees at
/// most one entry per submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GradebookEntry {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) instructor_id: String,
    pub(crate) instructor_name: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) score: i64,
    pub(crate) max_score: i64,
    pub(crate) percentage: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) submitted_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) graded_at: OffsetDateTime,
    pub(crate) status: SubmissionStatus,
}

/// Computed on demand, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct InstructorAnalytics {
    pub(crate) total_courses: usize,
    pub(crate) total_students: usize,
    pub(crate) total_quizzes: usize,
    pub(crate) average_quiz_score: f64,
    pub(crate) active_submissions: usize,
    pub(crate) pending_grades: usize,
}

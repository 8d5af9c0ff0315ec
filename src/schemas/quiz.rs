use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Question, Quiz, QuizSettings};
use crate::db::types::{AnswerValue, DifficultyLevel, QuestionType};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    /// One of the eleven wire names, e.g. "multiple-choice".
    #[serde(alias = "questionType", alias = "type")]
    pub(crate) question_type: String,
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub(crate) text: String,
    #[validate(range(min = 1, message = "points must be positive"))]
    pub(crate) points: i64,
    #[serde(default = "default_required")]
    pub(crate) required: bool,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: Option<AnswerValue>,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) media: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[serde(alias = "courseId")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub(crate) course_id: String,
    #[serde(alias = "instructorId")]
    #[validate(length(min = 1, message = "instructor_id must not be empty"))]
    pub(crate) instructor_id: String,
    #[validate(length(min = 1, max = 300, message = "title must be 1-300 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) instructions: Option<String>,
    #[serde(default)]
    pub(crate) settings: Option<QuizSettings>,
    #[serde(default)]
    pub(crate) categories: Vec<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    #[serde(alias = "assignedStudents")]
    pub(crate) assigned_students: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

/// Explicit metadata in an update payload. The fields are derived, so any
/// value that disagrees with the recomputed totals is rejected.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataOverride {
    #[serde(default)]
    #[serde(alias = "totalPoints")]
    pub(crate) total_points: Option<i64>,
    #[serde(default)]
    #[serde(alias = "questionCount")]
    pub(crate) question_count: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub(crate) struct QuizUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 300, message = "title must be 1-300 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Absent leaves instructions alone; an explicit null clears them.
    #[serde(default, deserialize_with = "nullable_field")]
    pub(crate) instructions: Option<Option<String>>,
    #[serde(default)]
    pub(crate) settings: Option<QuizSettings>,
    #[serde(default)]
    pub(crate) categories: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) tags: Option<Vec<String>>,
    #[serde(default)]
    #[serde(alias = "assignedStudents")]
    pub(crate) assigned_students: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) metadata: Option<MetadataOverride>,
    /// Quiz record version the caller last read; mismatch is rejected.
    #[serde(default)]
    #[serde(alias = "expectedVersion")]
    pub(crate) expected_version: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ReorderRequest {
    #[serde(alias = "questionIds")]
    #[validate(length(min = 1, message = "question_ids must not be empty"))]
    pub(crate) question_ids: Vec<String>,
}

/// Student rendition of a published quiz: no answer keys, shuffle and pool
/// already applied.
#[derive(Debug, Serialize)]
pub(crate) struct StudentQuizView {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) instructions: Option<String>,
    pub(crate) time_limit_minutes: Option<i64>,
    pub(crate) passing_score: i64,
    pub(crate) total_points: i64,
    pub(crate) questions: Vec<StudentQuestionView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentQuestionView {
    pub(crate) id: String,
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    pub(crate) points: i64,
    pub(crate) required: bool,
    pub(crate) options: Vec<String>,
}

impl StudentQuizView {
    pub(crate) fn render(quiz: &Quiz, questions: Vec<&Question>) -> Self {
        Self {
            id: quiz.id.clone(),
            course_id: quiz.course_id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            instructions: quiz.instructions.clone(),
            time_limit_minutes: quiz.settings.time_limit_minutes,
            passing_score: quiz.settings.passing_score,
            total_points: quiz.metadata.total_points,
            questions: questions
                .into_iter()
                .map(|question| StudentQuestionView {
                    id: question.id.clone(),
                    question_type: question.question_type,
                    text: question.text.clone(),
                    points: question.points,
                    required: question.required,
                    options: question.options.clone(),
                })
                .collect(),
        }
    }
}

fn default_required() -> bool {
    true
}

fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

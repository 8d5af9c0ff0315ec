use serde::Deserialize;
use validator::Validate;

use crate::db::types::AnswerValue;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StartSubmissionRequest {
    #[serde(alias = "quizId")]
    #[validate(length(min = 1, message = "quiz_id must not be empty"))]
    pub(crate) quiz_id: String,
    #[serde(alias = "studentId")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[serde(alias = "studentName")]
    #[validate(length(min = 1, message = "student_name must not be empty"))]
    pub(crate) student_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnswerInput {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    pub(crate) answer: AnswerValue,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitAnswersRequest {
    #[serde(default)]
    pub(crate) answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub(crate) struct ManualAnswerGrade {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[validate(range(min = 0, message = "points must be non-negative"))]
    pub(crate) points: i64,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: Option<bool>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ManualGradeRequest {
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Vec<ManualAnswerGrade>,
    #[serde(alias = "totalScore")]
    #[validate(range(min = 0, message = "total_score must be non-negative"))]
    pub(crate) total_score: i64,
}

pub(crate) mod analytics;
pub(crate) mod catalog;
pub(crate) mod directory;
pub(crate) mod gradebook;
pub(crate) mod grading;
pub(crate) mod ledger;

use thiserror::Error;

use crate::db::StoreError;

/// Typed failures of the assessment engine. Every public operation returns
/// either a value or one of these; nothing crosses the boundary as a panic.
#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("quiz {0} not found")]
    QuizNotFound(String),
    #[error("submission {0} not found")]
    SubmissionNotFound(String),
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(String),
    #[error("unknown question type: {0}")]
    InvalidQuestionType(String),
    #[error("{0}")]
    Validation(String),
    #[error("invalid quiz settings: {0}")]
    InvalidSettings(String),
    #[error("metadata is derived from the question list and cannot be set explicitly")]
    StaleMetadata,
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("submission was already submitted")]
    AlreadySubmitted,
    #[error("submission has not been submitted yet")]
    NotSubmitted,
    #[error("submission was already graded")]
    AlreadyGraded,
    #[error("attempt limit for this quiz is reached")]
    AttemptLimitReached,
    #[error("quiz still has submissions and cannot be deleted")]
    QuizHasSubmissions,
    #[error("record was modified concurrently, reload and retry")]
    ConcurrentModification,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { .. } => EngineError::ConcurrentModification,
            other => EngineError::Store(other),
        }
    }
}

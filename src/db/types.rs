use serde::{Deserialize, Serialize};

/// The eleven supported question kinds. Wire names are kebab-case
/// ("multiple-choice", "drag-drop", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
    Matching,
    FillBlank,
    Essay,
    Ranking,
    Matrix,
    FileUpload,
    CodeEditor,
    DragDrop,
}

/// The representation a correct answer and a submitted answer must share for
/// a given question type. The grading engine selects its comparison rule by
/// this shape; the question model only declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnswerShape {
    /// Single string, exact equality.
    Scalar,
    /// Sequence of strings, order-significant.
    Ordered,
    /// Sequence of strings, compared as a sorted multiset.
    Unordered,
    /// Not auto-gradable; an instructor supplies the verdict.
    Manual,
}

impl QuestionType {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "multiple-choice" => Some(Self::MultipleChoice),
            "short-answer" => Some(Self::ShortAnswer),
            "true-false" => Some(Self::TrueFalse),
            "matching" => Some(Self::Matching),
            "fill-blank" => Some(Self::FillBlank),
            "essay" => Some(Self::Essay),
            "ranking" => Some(Self::Ranking),
            "matrix" => Some(Self::Matrix),
            "file-upload" => Some(Self::FileUpload),
            "code-editor" => Some(Self::CodeEditor),
            "drag-drop" => Some(Self::DragDrop),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple-choice",
            Self::ShortAnswer => "short-answer",
            Self::TrueFalse => "true-false",
            Self::Matching => "matching",
            Self::FillBlank => "fill-blank",
            Self::Essay => "essay",
            Self::Ranking => "ranking",
            Self::Matrix => "matrix",
            Self::FileUpload => "file-upload",
            Self::CodeEditor => "code-editor",
            Self::DragDrop => "drag-drop",
        }
    }

    pub(crate) fn answer_shape(self) -> AnswerShape {
        match self {
            Self::MultipleChoice | Self::ShortAnswer | Self::TrueFalse | Self::FillBlank => {
                AnswerShape::Scalar
            }
            Self::Ranking | Self::Matrix | Self::DragDrop => AnswerShape::Ordered,
            Self::Matching => AnswerShape::Unordered,
            Self::Essay | Self::FileUpload | Self::CodeEditor => AnswerShape::Manual,
        }
    }

    /// Whether quizzes of this type carry an options list at all.
    pub(crate) fn uses_options(self) -> bool {
        matches!(
            self,
            Self::MultipleChoice | Self::Matching | Self::Ranking | Self::Matrix | Self::DragDrop
        )
    }

    /// Empty answer payload of the right shape for a freshly authored
    /// question of this type.
    pub(crate) fn blank_answer(self) -> Option<AnswerValue> {
        match self.answer_shape() {
            AnswerShape::Scalar => Some(AnswerValue::Text(String::new())),
            AnswerShape::Ordered | AnswerShape::Unordered => Some(AnswerValue::List(Vec::new())),
            AnswerShape::Manual => None,
        }
    }
}

/// A correct or submitted answer: a single string for scalar types, a string
/// sequence for list types. Untagged on the wire, so clients send plain JSON
/// strings or arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum AnswerValue {
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::List(_) => None,
        }
    }

    pub(crate) fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(values) => Some(values),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SubmissionStatus {
    InProgress,
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

/// How ranking questions are compared. `Lenient` sorts both sides before
/// comparing, which grades a ranking as an unordered match; the source
/// system behaved this way, so it stays available behind configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RankingGrading {
    Strict,
    Lenient,
}

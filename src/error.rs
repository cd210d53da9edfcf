//! Error types for the survey branching core

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

/// Main error type for the survey branching core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveyLogicError {
    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Question text must not be empty")]
    EmptyQuestionText,

    #[error("Condition {condition} on question {question} references {target}, which is not an earlier question")]
    InvalidReference {
        question: String,
        condition: String,
        target: String,
    },

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl From<serde_json::Error> for SurveyLogicError {
    fn from(err: serde_json::Error) -> Self {
        SurveyLogicError::DeserializationError(err.to_string())
    }
}

impl From<SurveyLogicError> for PyErr {
    fn from(err: SurveyLogicError) -> PyErr {
        match err {
            SurveyLogicError::QuestionNotFound(id) => {
                PyKeyError::new_err(format!("Question not found: {}", id))
            }
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the survey branching core
pub type Result<T> = std::result::Result<T, SurveyLogicError>;

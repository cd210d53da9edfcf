//! Recorded answer values

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A respondent's answer to one question
///
/// Text questions and the selected option of choice questions are recorded
/// as `Text`; rating questions as `Rating` (1-5). `Number` covers any other
/// numeric value a host passes in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Rating(i64),
    Number(f64),
    Text(String),
}

impl Answer {
    /// String form used by text comparisons
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Answer::Text(s) => Cow::Borrowed(s.as_str()),
            Answer::Rating(n) => Cow::Owned(n.to_string()),
            Answer::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Numeric form; `None` for text that is not a finite number
    pub fn number(&self) -> Option<f64> {
        match self {
            Answer::Rating(n) => Some(*n as f64),
            Answer::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Answer::Text(s) => parse_number(s),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Answer::Text(s) if s.is_empty())
    }
}

/// Parse a numeric operand; surrounding whitespace is ignored
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Text(s)
    }
}

impl From<i64> for Answer {
    fn from(n: i64) -> Self {
        Answer::Rating(n)
    }
}

impl From<i32> for Answer {
    fn from(n: i32) -> Self {
        Answer::Rating(n as i64)
    }
}

impl From<f64> for Answer {
    fn from(n: f64) -> Self {
        Answer::Number(n)
    }
}

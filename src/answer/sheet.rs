//! Answers collected so far during survey taking

use crate::answer::value::Answer;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Mapping from question id to the respondent's recorded answer.
/// Owned by the survey-taking host and lent to evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: AHashMap<String, Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Record an answer, replacing any previous one
    pub fn record(&mut self, question_id: impl Into<String>, answer: impl Into<Answer>) {
        self.answers.insert(question_id.into(), answer.into());
    }

    pub fn with(mut self, question_id: impl Into<String>, answer: impl Into<Answer>) -> Self {
        self.record(question_id, answer);
        self
    }

    pub fn clear(&mut self, question_id: &str) -> Option<Answer> {
        self.answers.remove(question_id)
    }

    #[inline]
    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Whether a non-empty answer is recorded
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|a| !a.is_empty())
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.answers.iter().map(|(id, a)| (id.as_str(), a))
    }
}

impl<K: Into<String>, A: Into<Answer>> FromIterator<(K, A)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (K, A)>>(iter: T) -> Self {
        let mut sheet = AnswerSheet::new();
        for (id, answer) in iter {
            sheet.record(id, answer);
        }
        sheet
    }
}

//! Question definitions

use crate::rule::ConditionalLogic;
use serde::{Deserialize, Serialize};

/// Kind of input a question collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Single line text input
    #[default]
    Text,
    /// Select one option
    Multiple,
    /// 1-5 star rating
    Rating,
    /// Select from dropdown
    Dropdown,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Text => "Short Text",
            QuestionType::Multiple => "Multiple Choice",
            QuestionType::Rating => "Rating Scale",
            QuestionType::Dropdown => "Dropdown",
        }
    }

    /// Whether answers are picked from `options`
    #[inline]
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Multiple | QuestionType::Dropdown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Multiple => "multiple",
            QuestionType::Rating => "rating",
            QuestionType::Dropdown => "dropdown",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(QuestionType::Text),
            "multiple" => Some(QuestionType::Multiple),
            "rating" => Some(QuestionType::Rating),
            "dropdown" => Some(QuestionType::Dropdown),
            _ => None,
        }
    }
}

/// A survey question together with the branching logic it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Position in the survey, starting at 1. Records without one (or with
    /// 0) are numbered by their position when the survey is loaded.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub conditional_logic: ConditionalLogic,
}

impl Question {
    pub fn new(id: impl Into<String>, kind: QuestionType, text: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            required: false,
            options: Vec::new(),
            order,
            conditional_logic: ConditionalLogic::default(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = logic;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

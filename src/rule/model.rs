//! Rule data structures attached to a survey question

use serde::{Deserialize, Serialize};

/// Comparison performed by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Answer equals the value
    #[default]
    Equals,
    /// Answer differs from the value
    NotEquals,
    /// Answer text contains the value
    Contains,
    /// Numeric answer is greater than the value
    GreaterThan,
    /// Numeric answer is less than the value
    LessThan,
    /// No answer, or an empty one
    IsEmpty,
    /// A non-empty answer
    IsNotEmpty,
}

impl ConditionType {
    pub const ALL: [ConditionType; 7] = [
        ConditionType::Equals,
        ConditionType::NotEquals,
        ConditionType::Contains,
        ConditionType::GreaterThan,
        ConditionType::LessThan,
        ConditionType::IsEmpty,
        ConditionType::IsNotEmpty,
    ];

    /// Whether the comparison reads the condition's `value`
    #[inline]
    pub fn needs_value(self) -> bool {
        !matches!(self, ConditionType::IsEmpty | ConditionType::IsNotEmpty)
    }

    /// Label shown by the authoring surface
    pub fn label(self) -> &'static str {
        match self {
            ConditionType::Equals => "equals",
            ConditionType::NotEquals => "does not equal",
            ConditionType::Contains => "contains",
            ConditionType::GreaterThan => "is greater than",
            ConditionType::LessThan => "is less than",
            ConditionType::IsEmpty => "is empty",
            ConditionType::IsNotEmpty => "is not empty",
        }
    }

    /// Wire name, as used in the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::Equals => "equals",
            ConditionType::NotEquals => "not_equals",
            ConditionType::Contains => "contains",
            ConditionType::GreaterThan => "greater_than",
            ConditionType::LessThan => "less_than",
            ConditionType::IsEmpty => "is_empty",
            ConditionType::IsNotEmpty => "is_not_empty",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Combinator joining a condition with the result of the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    #[inline]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Combinator::And => left & right,
            Combinator::Or => left | right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Combinator::And),
            "or" => Some(Combinator::Or),
            _ => None,
        }
    }
}

/// Single comparison of a prior answer against a value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    #[serde(default)]
    pub target_question: String,
    #[serde(rename = "type", default)]
    pub kind: ConditionType,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub operator: Combinator,
}

impl Condition {
    /// Condition with the defaults used when one is appended
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Whether a target question has been chosen
    #[inline]
    pub fn has_target(&self) -> bool {
        !self.target_question.is_empty()
    }
}

/// Navigation or visibility effect applied when the conditions hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    ShowQuestion,
    HideQuestion,
    JumpToQuestion,
    SkipToEnd,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::ShowQuestion,
        ActionType::HideQuestion,
        ActionType::JumpToQuestion,
        ActionType::SkipToEnd,
    ];

    /// Whether the action reads its `targetQuestion`
    #[inline]
    pub fn needs_target(self) -> bool {
        !matches!(self, ActionType::SkipToEnd)
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionType::ShowQuestion => "Show Question",
            ActionType::HideQuestion => "Hide Question",
            ActionType::JumpToQuestion => "Jump to Question",
            ActionType::SkipToEnd => "Skip to End",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::ShowQuestion => "show_question",
            ActionType::HideQuestion => "hide_question",
            ActionType::JumpToQuestion => "jump_to_question",
            ActionType::SkipToEnd => "skip_to_end",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Action attached to a question's logic
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ActionType,
    #[serde(default)]
    pub target_question: String,
}

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Resolve into a directive; `None` while a required target is unset
    pub fn directive(&self) -> Option<Directive<'_>> {
        let target = self.target_question.as_str();
        match self.kind {
            ActionType::SkipToEnd => Some(Directive::End),
            _ if target.is_empty() => None,
            ActionType::ShowQuestion => Some(Directive::Show(target)),
            ActionType::HideQuestion => Some(Directive::Hide(target)),
            ActionType::JumpToQuestion => Some(Directive::JumpTo(target)),
        }
    }
}

/// Fully-specified action, ready to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    Show(&'a str),
    Hide(&'a str),
    JumpTo(&'a str),
    End,
}

/// Conditions and actions owned by one question
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionalLogic {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ConditionalLogic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.actions.is_empty()
    }

    pub fn condition(&self, id: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }
}

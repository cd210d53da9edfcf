//! Effects produced by evaluating a question's logic

use ahash::AHashMap;
use serde::Serialize;

/// Visibility of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Ordered visibility changes, at most one per question. Setting a question
/// twice keeps its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VisibilityChanges {
    entries: Vec<(String, Visibility)>,
    #[serde(skip)]
    positions: AHashMap<String, usize>,
}

impl VisibilityChanges {
    pub fn set(&mut self, question_id: &str, visibility: Visibility) {
        match self.positions.get(question_id) {
            Some(&i) => self.entries[i].1 = visibility,
            None => {
                self.positions.insert(question_id.to_string(), self.entries.len());
                self.entries.push((question_id.to_string(), visibility));
            }
        }
    }

    #[inline]
    pub fn get(&self, question_id: &str) -> Option<Visibility> {
        self.positions.get(question_id).map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Visibility)> {
        self.entries.iter().map(|(id, v)| (id.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Navigation instruction overriding the structurally-next question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Navigation {
    JumpTo(String),
    End,
}

/// Result of evaluating one question's logic
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BranchOutcome {
    /// Whether the folded conditions held
    pub satisfied: bool,
    pub visibility: VisibilityChanges,
    pub navigation: Option<Navigation>,
}

impl BranchOutcome {
    /// Outcome of logic whose conditions did not hold
    pub fn unsatisfied() -> Self {
        Self::default()
    }

    pub fn has_effects(&self) -> bool {
        !self.visibility.is_empty() || self.navigation.is_some()
    }
}

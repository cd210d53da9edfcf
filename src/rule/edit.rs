//! Pure, id-keyed edits on a question's conditional logic
//!
//! Every operation borrows the current logic and returns a new value, so the
//! authoring surface can keep previous versions around for undo/redo.

use crate::rule::model::{Action, ActionType, Combinator, Condition, ConditionType, ConditionalLogic};
use rand::Rng;
use serde::Deserialize;
use tracing::trace;

/// Fields to replace on a condition; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionPatch {
    pub target_question: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ConditionType>,
    pub value: Option<String>,
    pub operator: Option<Combinator>,
}

impl ConditionPatch {
    fn apply_to(&self, condition: &mut Condition) {
        if let Some(target) = &self.target_question {
            condition.target_question = target.clone();
        }
        if let Some(kind) = self.kind {
            condition.kind = kind;
        }
        if let Some(value) = &self.value {
            condition.value = value.clone();
        }
        if let Some(operator) = self.operator {
            condition.operator = operator;
        }
    }
}

/// Fields to replace on an action
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPatch {
    #[serde(rename = "type")]
    pub kind: Option<ActionType>,
    pub target_question: Option<String>,
}

impl ActionPatch {
    fn apply_to(&self, action: &mut Action) {
        if let Some(kind) = self.kind {
            action.kind = kind;
        }
        if let Some(target) = &self.target_question {
            action.target_question = target.clone();
        }
    }
}

/// Draw a random id not present in `taken`
pub fn fresh_id<'a>(taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = format!("{:016x}", rng.gen::<u64>());
        if !taken.clone().any(|id| id == candidate) {
            return candidate;
        }
    }
}

impl ConditionalLogic {
    /// Append a condition: `equals`, empty value, no target, joined with `and`
    pub fn add_condition(&self) -> Self {
        let id = fresh_id(self.conditions.iter().map(|c| c.id.as_str()));
        trace!(condition = %id, "adding condition");

        let mut next = self.clone();
        next.conditions.push(Condition::new(id));
        next
    }

    /// Append a `show_question` action with no target
    pub fn add_action(&self) -> Self {
        let id = fresh_id(self.actions.iter().map(|a| a.id.as_str()));
        trace!(action = %id, "adding action");

        let mut next = self.clone();
        next.actions.push(Action::new(id));
        next
    }

    pub fn update_condition(&self, id: &str, patch: &ConditionPatch) -> Self {
        let mut next = self.clone();
        if let Some(condition) = next.conditions.iter_mut().find(|c| c.id == id) {
            patch.apply_to(condition);
        }
        next
    }

    pub fn update_action(&self, id: &str, patch: &ActionPatch) -> Self {
        let mut next = self.clone();
        if let Some(action) = next.actions.iter_mut().find(|a| a.id == id) {
            patch.apply_to(action);
        }
        next
    }

    pub fn remove_condition(&self, id: &str) -> Self {
        Self {
            conditions: self.conditions.iter().filter(|c| c.id != id).cloned().collect(),
            actions: self.actions.clone(),
        }
    }

    pub fn remove_action(&self, id: &str) -> Self {
        Self {
            conditions: self.conditions.clone(),
            actions: self.actions.iter().filter(|a| a.id != id).cloned().collect(),
        }
    }
}

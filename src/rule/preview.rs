//! Human-readable rule summaries for the authoring surface

use crate::rule::model::{Action, Condition};
use crate::survey::Question;

/// Summary such as `If Question 2 equals "Product A"`, numbering questions by
/// their position in `available`. `None` until the target is chosen and
/// available.
pub fn describe_condition(condition: &Condition, available: &[&Question]) -> Option<String> {
    if !condition.has_target() {
        return None;
    }
    let position = available.iter().position(|q| q.id == condition.target_question)? + 1;

    let mut text = format!("If Question {} {}", position, condition.kind.label());
    if condition.kind.needs_value() && !condition.value.is_empty() {
        text.push_str(&format!(" \"{}\"", condition.value));
    }
    Some(text)
}

/// Summary such as `Jump to Question 4`, numbering questions by their
/// position in `ordered`
pub fn describe_action(action: &Action, ordered: &[&Question]) -> Option<String> {
    if !action.kind.needs_target() {
        return Some(action.kind.label().to_string());
    }
    let position = ordered.iter().position(|q| q.id == action.target_question)? + 1;
    Some(format!("{} {}", action.kind.label(), position))
}

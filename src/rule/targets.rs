//! Legal condition targets and authoring-time validation

use crate::rule::model::ConditionalLogic;
use crate::survey::{Question, QuestionIndex};
use thiserror::Error;

/// Questions a condition on `owning` may read: those authored before it,
/// in ascending order
pub fn available_targets<'a>(questions: &'a [Question], owning: &Question) -> Vec<&'a Question> {
    let mut targets: Vec<&Question> = questions.iter().filter(|q| q.order < owning.order).collect();
    targets.sort_by_key(|q| q.order);
    targets
}

/// Problem found in partially-authored or stale logic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicIssue {
    #[error("condition {condition} has no target question")]
    ConditionTargetUnset { condition: String },

    #[error("condition {condition} targets unknown question {target}")]
    ConditionTargetUnknown { condition: String, target: String },

    #[error("condition {condition} targets question {target}, which is not before this question")]
    ConditionTargetNotEarlier { condition: String, target: String },

    #[error("condition {condition} needs a value")]
    MissingOperand { condition: String },

    #[error("action {action} has no target question")]
    ActionTargetUnset { action: String },

    #[error("action {action} targets unknown question {target}")]
    ActionTargetUnknown { action: String, target: String },
}

/// Report every issue in `logic` as owned by `owning`. Nothing is rejected;
/// the evaluator treats each reported problem as a non-match or a no-op.
pub fn validate_logic(logic: &ConditionalLogic, owning: &Question, index: &QuestionIndex) -> Vec<LogicIssue> {
    let mut issues = Vec::new();

    for condition in &logic.conditions {
        let id = || condition.id.clone();
        if !condition.has_target() {
            issues.push(LogicIssue::ConditionTargetUnset { condition: id() });
        } else if let Some(order) = index.order(&condition.target_question) {
            if order >= owning.order {
                issues.push(LogicIssue::ConditionTargetNotEarlier {
                    condition: id(),
                    target: condition.target_question.clone(),
                });
            }
        } else {
            issues.push(LogicIssue::ConditionTargetUnknown {
                condition: id(),
                target: condition.target_question.clone(),
            });
        }

        if condition.kind.needs_value() && condition.value.is_empty() {
            issues.push(LogicIssue::MissingOperand { condition: id() });
        }
    }

    for action in &logic.actions {
        if !action.kind.needs_target() {
            continue;
        }
        if action.target_question.is_empty() {
            issues.push(LogicIssue::ActionTargetUnset {
                action: action.id.clone(),
            });
        } else if !index.contains(&action.target_question) {
            issues.push(LogicIssue::ActionTargetUnknown {
                action: action.id.clone(),
                target: action.target_question.clone(),
            });
        }
    }

    issues
}

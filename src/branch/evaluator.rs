//! Branch evaluator
//!
//! Resolves one question's conditional logic against the answers recorded so
//! far. Conditions fold left to right with uniform precedence, so
//! `c1 and c2 or c3` reads `(c1 and c2) or c3`. Every function here is total:
//! unresolved references and missing operands evaluate to `false`, dangling
//! action targets are skipped.

use crate::answer::{parse_number, Answer, AnswerSheet};
use crate::branch::outcome::{BranchOutcome, Navigation, Visibility};
use crate::rule::{Condition, ConditionType, Directive};
use crate::survey::{Question, QuestionIndex};
use tracing::{debug, trace, warn};

/// Evaluate `question`'s logic and collect the effects of its actions
pub fn evaluate(question: &Question, index: &QuestionIndex, answers: &AnswerSheet) -> BranchOutcome {
    if !conditions_hold(question, index, answers) {
        trace!(question = %question.id, "conditions not satisfied");
        return BranchOutcome::unsatisfied();
    }

    let mut outcome = BranchOutcome {
        satisfied: true,
        ..Default::default()
    };

    for action in &question.conditional_logic.actions {
        let Some(directive) = action.directive() else {
            trace!(question = %question.id, action = %action.id, "action has no target, skipping");
            continue;
        };

        if let Directive::Show(target) | Directive::Hide(target) | Directive::JumpTo(target) = directive {
            if !index.contains(target) {
                debug!(
                    question = %question.id,
                    action = %action.id,
                    target_question = target,
                    "action target not in survey, skipping"
                );
                continue;
            }
        }

        trace!(question = %question.id, action = %action.id, ?directive, "applying action");
        match directive {
            Directive::Show(target) => outcome.visibility.set(target, Visibility::Visible),
            Directive::Hide(target) => outcome.visibility.set(target, Visibility::Hidden),
            Directive::JumpTo(target) => outcome.navigation = Some(Navigation::JumpTo(target.to_string())),
            Directive::End => outcome.navigation = Some(Navigation::End),
        }
    }

    debug!(
        question = %question.id,
        visibility = outcome.visibility.len(),
        navigation = ?outcome.navigation,
        "logic satisfied"
    );
    outcome
}

/// Fold `question`'s conditions; an empty list always holds
pub fn conditions_hold(question: &Question, index: &QuestionIndex, answers: &AnswerSheet) -> bool {
    let mut conditions = question.conditional_logic.conditions.iter();

    let Some(first) = conditions.next() else {
        return true;
    };

    let mut result = check_condition(first, question, index, answers);
    for condition in conditions {
        let value = check_condition(condition, question, index, answers);
        result = condition.operator.apply(result, value);
    }
    result
}

/// Evaluate a single condition owned by `owning`
pub fn check_condition(
    condition: &Condition,
    owning: &Question,
    index: &QuestionIndex,
    answers: &AnswerSheet,
) -> bool {
    if !condition.has_target() {
        return false;
    }
    if !index.is_available_target(owning, &condition.target_question) {
        warn!(
            question = %owning.id,
            condition = %condition.id,
            target_question = %condition.target_question,
            "condition references a question that is not earlier, treating as false"
        );
        return false;
    }

    let answer = answers.get(&condition.target_question);
    let result = compare(condition.kind, answer, &condition.value);
    trace!(
        condition = %condition.id,
        kind = condition.kind.as_str(),
        result,
        "checked condition"
    );
    result
}

/// Apply a comparator to a recorded answer (or its absence)
pub fn compare(kind: ConditionType, answer: Option<&Answer>, value: &str) -> bool {
    let Some(answer) = answer else {
        return matches!(kind, ConditionType::IsEmpty);
    };

    match kind {
        ConditionType::IsEmpty => answer.is_empty(),
        ConditionType::IsNotEmpty => !answer.is_empty(),
        // the remaining comparators need an operand
        _ if value.is_empty() => false,
        ConditionType::Equals => answers_equal(answer, value),
        ConditionType::NotEquals => !answers_equal(answer, value),
        ConditionType::Contains => answer.text().contains(value),
        ConditionType::GreaterThan => numeric(answer, value).is_some_and(|(a, v)| a > v),
        ConditionType::LessThan => numeric(answer, value).is_some_and(|(a, v)| a < v),
    }
}

fn answers_equal(answer: &Answer, value: &str) -> bool {
    match answer {
        // ratings compare by value so "4" and "4.0" both match
        Answer::Rating(_) | Answer::Number(_) => match numeric(answer, value) {
            Some((a, v)) => a == v,
            None => answer.text() == value,
        },
        Answer::Text(text) => text == value,
    }
}

#[inline]
fn numeric(answer: &Answer, value: &str) -> Option<(f64, f64)> {
    Some((answer.number()?, parse_number(value)?))
}

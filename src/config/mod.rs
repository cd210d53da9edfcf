//! Configuration loading
//!
//! This module handles deserialization of survey definitions, evaluator
//! options and answer sheets from Python objects. JSON input goes through
//! serde directly (`Survey::from_json`, `EvaluatorOptions::from_json`,
//! `AnswerSheet::from_json`).

mod options;

pub use options::*;

use crate::answer::{Answer, AnswerSheet};
use crate::error::SurveyLogicError;
use crate::rule::{Action, ActionType, Combinator, Condition, ConditionType, ConditionalLogic};
use crate::survey::{Question, QuestionType, Survey, SurveyStatus};
use pyo3::types::{PyAnyMethods, PyBool, PyDict, PyDictMethods, PyList, PyListMethods};
use pyo3::Bound;

/// Helper to get attribute from either dict or object
fn get_attr<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> pyo3::PyResult<Bound<'py, pyo3::PyAny>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        dict.get_item(name)?
            .ok_or_else(|| pyo3::exceptions::PyKeyError::new_err(name.to_string()))
    } else {
        obj.getattr(name)
    }
}

/// Helper to get optional attribute from either dict or object; `None`
/// values count as absent
fn get_attr_opt<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> Option<Bound<'py, pyo3::PyAny>> {
    let value = if let Ok(dict) = obj.downcast::<PyDict>() {
        dict.get_item(name).ok().flatten()
    } else {
        obj.getattr(name).ok()
    };
    value.filter(|v| !v.is_none())
}

/// Look up the first present spelling of a field (camelCase or snake_case)
fn get_attr_any<'py>(obj: &Bound<'py, pyo3::PyAny>, names: &[&str]) -> Option<Bound<'py, pyo3::PyAny>> {
    names.iter().find_map(|name| get_attr_opt(obj, name))
}

/// Ids may be given as strings or integers
fn extract_id(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<String> {
    if let Ok(id) = obj.extract::<String>() {
        Ok(id)
    } else {
        let id: i64 = obj.extract()?;
        Ok(id.to_string())
    }
}

fn extract_string_or_default(obj: &Bound<'_, pyo3::PyAny>, names: &[&str]) -> pyo3::PyResult<String> {
    match get_attr_any(obj, names) {
        Some(value) => extract_id(&value),
        None => Ok(String::new()),
    }
}

fn unknown(kind: &str, name: &str) -> pyo3::PyErr {
    SurveyLogicError::DeserializationError(format!("unknown {} type: {}", kind, name)).into()
}

/// Deserialize a survey from a Python dict or object
/// Expected format: {"id", "title", "description", "status", "questions": [...]}
pub fn deserialize_survey(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<Survey> {
    let id = extract_string_or_default(obj, &["id"])?;
    let title: String = get_attr_opt(obj, "title").and_then(|v| v.extract().ok()).unwrap_or_default();
    let description: String = get_attr_opt(obj, "description")
        .and_then(|v| v.extract().ok())
        .unwrap_or_default();

    let status = match get_attr_opt(obj, "status") {
        Some(value) => match value.extract::<String>()?.as_str() {
            "draft" => SurveyStatus::Draft,
            "active" => SurveyStatus::Active,
            other => return Err(unknown("status", other)),
        },
        None => SurveyStatus::Draft,
    };

    let questions_obj = get_attr(obj, "questions")
        .map_err(|_| SurveyLogicError::DeserializationError("questions not found".to_string()))?;
    let questions_list: Bound<'_, PyList> = questions_obj.extract()?;

    let mut questions = Vec::with_capacity(questions_list.len());
    for (index, item) in questions_list.iter().enumerate() {
        questions.push(extract_question(&item, index as u32 + 1)?);
    }

    Ok(Survey {
        id,
        title,
        description,
        status,
        questions,
    })
}

/// `fallback_order` is used when the record carries no `order` (or 0), the
/// same numbering `Survey::from_json` applies
fn extract_question(obj: &Bound<'_, pyo3::PyAny>, fallback_order: u32) -> pyo3::PyResult<Question> {
    let id = extract_id(&get_attr(obj, "id")?)?;
    let text: String = get_attr_opt(obj, "text").and_then(|v| v.extract().ok()).unwrap_or_default();
    let kind = match get_attr_opt(obj, "type") {
        Some(value) => {
            let name: String = value.extract()?;
            QuestionType::parse(&name).ok_or_else(|| unknown("question", &name))?
        }
        None => QuestionType::Text,
    };
    let required: bool = get_attr_opt(obj, "required").and_then(|v| v.extract().ok()).unwrap_or(false);
    let options: Vec<String> = get_attr_opt(obj, "options").and_then(|v| v.extract().ok()).unwrap_or_default();
    let order: u32 = get_attr_opt(obj, "order")
        .and_then(|v| v.extract().ok())
        .filter(|order| *order > 0)
        .unwrap_or(fallback_order);

    let conditional_logic = match get_attr_any(obj, &["conditionalLogic", "conditional_logic"]) {
        Some(logic) => extract_logic(&logic)?,
        None => ConditionalLogic::default(),
    };

    Ok(Question {
        id,
        kind,
        text,
        required,
        options,
        order,
        conditional_logic,
    })
}

/// Deserialize a question's conditional logic
/// Expected format: {"conditions": [...], "actions": [...]}
pub fn extract_logic(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<ConditionalLogic> {
    let mut logic = ConditionalLogic::default();

    if let Some(conditions) = get_attr_opt(obj, "conditions") {
        let list: Bound<'_, PyList> = conditions.extract()?;
        for item in list.iter() {
            logic.conditions.push(extract_condition(&item)?);
        }
    }

    if let Some(actions) = get_attr_opt(obj, "actions") {
        let list: Bound<'_, PyList> = actions.extract()?;
        for item in list.iter() {
            logic.actions.push(extract_action(&item)?);
        }
    }

    Ok(logic)
}

fn extract_condition(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<Condition> {
    let id = extract_id(&get_attr(obj, "id")?)?;
    let target_question = extract_string_or_default(obj, &["targetQuestion", "target_question"])?;
    let kind = match get_attr_opt(obj, "type") {
        Some(value) => {
            let name: String = value.extract()?;
            ConditionType::parse(&name).ok_or_else(|| unknown("condition", &name))?
        }
        None => ConditionType::default(),
    };
    // rating values may arrive as integers
    let value = extract_string_or_default(obj, &["value"])?;
    let operator = match get_attr_opt(obj, "operator") {
        Some(value) => {
            let name: String = value.extract()?;
            Combinator::parse(&name).ok_or_else(|| unknown("operator", &name))?
        }
        None => Combinator::default(),
    };

    Ok(Condition {
        id,
        target_question,
        kind,
        value,
        operator,
    })
}

fn extract_action(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<Action> {
    let id = extract_id(&get_attr(obj, "id")?)?;
    let kind = match get_attr_opt(obj, "type") {
        Some(value) => {
            let name: String = value.extract()?;
            ActionType::parse(&name).ok_or_else(|| unknown("action", &name))?
        }
        None => ActionType::default(),
    };
    let target_question = extract_string_or_default(obj, &["targetQuestion", "target_question"])?;

    Ok(Action {
        id,
        kind,
        target_question,
    })
}

/// Deserialize evaluator options; missing keys keep their defaults
pub fn deserialize_options(dict: &Bound<'_, PyDict>) -> pyo3::PyResult<EvaluatorOptions> {
    let mut options = EvaluatorOptions::default();
    if let Some(value) = dict.get_item("gated_show_targets_start_hidden")? {
        options.gated_show_targets_start_hidden = value.extract()?;
    }
    if let Some(value) = dict.get_item("max_path_len")? {
        options.max_path_len = value.extract()?;
    }
    options.validate()?;
    Ok(options)
}

/// Scalar answer value as read from Python
#[derive(Debug, Clone, PartialEq)]
enum RawAnswer {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn read_raw_answer(value: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<RawAnswer> {
    // bool is an int subclass in Python, so it has to be checked first
    if value.is_instance_of::<PyBool>() {
        Ok(RawAnswer::Bool(value.extract()?))
    } else if let Ok(rating) = value.extract::<i64>() {
        Ok(RawAnswer::Int(rating))
    } else if let Ok(number) = value.extract::<f64>() {
        Ok(RawAnswer::Float(number))
    } else {
        Ok(RawAnswer::Str(value.extract()?))
    }
}

/// Map a raw value onto an answer; booleans are not a survey answer type
fn answer_from_raw(question_id: &str, raw: RawAnswer) -> crate::error::Result<Answer> {
    match raw {
        RawAnswer::Bool(value) => Err(SurveyLogicError::DeserializationError(format!(
            "answer to {} must be a string or number, got bool {}",
            question_id, value
        ))),
        RawAnswer::Int(rating) => Ok(Answer::Rating(rating)),
        RawAnswer::Float(number) => Ok(Answer::Number(number)),
        RawAnswer::Str(text) => Ok(Answer::Text(text)),
    }
}

/// Deserialize answers: {question_id: str | int | float | None}. `None`
/// entries are treated as unanswered; booleans raise `ValueError`.
pub fn deserialize_answers(dict: &Bound<'_, PyDict>) -> pyo3::PyResult<AnswerSheet> {
    let mut sheet = AnswerSheet::new();

    for (key, value) in dict.iter() {
        if value.is_none() {
            continue;
        }
        let id = extract_id(&key)?;
        let answer = answer_from_raw(&id, read_raw_answer(&value)?)?;
        sheet.record(id, answer);
    }

    Ok(sheet)
}

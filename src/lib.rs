//! Survey Branch Core - conditional branching engine for survey questions
//!
//! This crate models per-question branching rules (conditions combined with
//! and/or, plus show/hide/jump/end actions), evaluates them against a
//! respondent's answers and computes the route through a survey. Python
//! bindings are provided via PyO3.

use pyo3::prelude::*;

pub mod answer;
pub mod branch;
pub mod config;
pub mod error;
pub mod rule;
pub mod runtime;
pub mod survey;

use crate::runtime::{outcome_to_dict, EvaluationSession, NextStep, SurveyEngine};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::types::PyDict;
use std::sync::Arc;

// ============================================================================
// Cached Engine
// ============================================================================

/// Global cached survey engine
static CACHED_ENGINE: OnceCell<Arc<RwLock<SurveyEngine>>> = OnceCell::new();

fn cached_engine() -> PyResult<Arc<RwLock<SurveyEngine>>> {
    CACHED_ENGINE
        .get()
        .cloned()
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
                "Survey not initialized. Call init_survey() first.",
            )
        })
}

// ============================================================================
// Python Functions
// ============================================================================

/// Initialize the survey (call again whenever the survey definition changes)
///
/// This caches the survey in Rust memory so answers can be evaluated without
/// re-reading the definition on every call.
///
/// # Arguments
/// * `survey` - Survey definition: {"id", "title", "questions": [...]}
/// * `options` - Optional evaluator options
///   (default: {"gated_show_targets_start_hidden": True, "max_path_len": 1000})
#[pyfunction]
#[pyo3(signature = (survey, options=None))]
fn init_survey(survey: &Bound<'_, PyAny>, options: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
    let survey = config::deserialize_survey(survey)?;
    let options = match options {
        Some(dict) => config::deserialize_options(dict)?,
        None => config::EvaluatorOptions::default(),
    };

    install_engine(SurveyEngine::new(survey, options));
    Ok(())
}

/// Replace the cached engine, creating the cell on first use
fn install_engine(engine: SurveyEngine) {
    let cached = CACHED_ENGINE.get_or_init(|| Arc::new(RwLock::new(SurveyEngine::default())));
    *cached.write() = engine;
}

/// Check if a survey is initialized
#[pyfunction]
fn is_survey_initialized() -> bool {
    CACHED_ENGINE.get().is_some()
}

/// Evaluate one question's conditional logic
///
/// # Returns
/// {"satisfied": bool, "visibility": {id: bool}, "navigation": None | {"type", "target"}}
///
/// # Raises
/// KeyError if the question does not exist
#[pyfunction]
fn evaluate_question<'py>(
    py: Python<'py>,
    question_id: &str,
    answers: &Bound<'py, PyDict>,
) -> PyResult<Bound<'py, PyDict>> {
    let answers = config::deserialize_answers(answers)?;
    let engine_arc = cached_engine()?;
    let engine = engine_arc.read();

    let outcome = engine.evaluate_question(question_id, &answers)?;
    outcome_to_dict(py, &outcome)
}

/// Evaluate the whole survey against the answers
///
/// # Returns
/// An EvaluationSession with visibility, path and the next question
#[pyfunction]
fn evaluate(answers: &Bound<'_, PyDict>) -> PyResult<EvaluationSession> {
    let answers = config::deserialize_answers(answers)?;
    let engine_arc = cached_engine()?;
    let engine = engine_arc.read();

    Ok(EvaluationSession::new(engine.traverse(&answers)))
}

/// Question to present after `current_id`, or None at the end of the survey
#[pyfunction]
fn next_question(current_id: &str, answers: &Bound<'_, PyDict>) -> PyResult<Option<String>> {
    let answers = config::deserialize_answers(answers)?;
    let engine_arc = cached_engine()?;
    let engine = engine_arc.read();

    match engine.next_question(current_id, &answers)? {
        NextStep::Question(id) => Ok(Some(id)),
        NextStep::End => Ok(None),
    }
}

/// Ids of the questions a condition on `question_id` may reference
#[pyfunction]
fn available_targets(question_id: &str) -> PyResult<Vec<String>> {
    let engine_arc = cached_engine()?;
    let engine = engine_arc.read();

    let targets = engine.available_targets(question_id)?;
    Ok(targets.into_iter().map(|q| q.id.clone()).collect())
}

/// Problems in a question's logic, one message each
#[pyfunction]
fn validate_logic(question_id: &str) -> PyResult<Vec<String>> {
    let engine_arc = cached_engine()?;
    let engine = engine_arc.read();

    let issues = engine.validate(question_id)?;
    Ok(issues.iter().map(ToString::to_string).collect())
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn survey_branch_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_survey, m)?)?;
    m.add_function(wrap_pyfunction!(is_survey_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_question, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    m.add_function(wrap_pyfunction!(next_question, m)?)?;
    m.add_function(wrap_pyfunction!(available_targets, m)?)?;
    m.add_function(wrap_pyfunction!(validate_logic, m)?)?;
    m.add_class::<EvaluationSession>()?;
    Ok(())
}

//! EvaluationSession - evaluation result handed across the Python boundary
//!
//! Holds a traversal in Rust memory; Python reads the parts it needs through
//! getters instead of receiving the whole structure up front.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::branch::{BranchOutcome, Navigation, Visibility};
use crate::error::SurveyLogicError;

use super::{HaltReason, Traversal};

// ============================================================================
// Helper Functions
// ============================================================================

/// Wire name of a navigation override
#[inline]
pub fn navigation_kind(navigation: &Navigation) -> &'static str {
    match navigation {
        Navigation::JumpTo(_) => "jump_to",
        Navigation::End => "end",
    }
}

fn navigation_target(navigation: &Navigation) -> Option<&str> {
    match navigation {
        Navigation::JumpTo(target) => Some(target.as_str()),
        Navigation::End => None,
    }
}

/// Convert a single question's outcome into a Python dict
pub fn outcome_to_dict<'py>(py: Python<'py>, outcome: &BranchOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("satisfied", outcome.satisfied)?;

    let visibility = PyDict::new(py);
    for (id, v) in outcome.visibility.iter() {
        visibility.set_item(id, v.is_visible())?;
    }
    dict.set_item("visibility", visibility)?;

    match &outcome.navigation {
        Some(navigation) => {
            let nav = PyDict::new(py);
            nav.set_item("type", navigation_kind(navigation))?;
            nav.set_item("target", navigation_target(navigation))?;
            dict.set_item("navigation", nav)?;
        }
        None => dict.set_item("navigation", py.None())?,
    }

    Ok(dict)
}

// ============================================================================
// EvaluationSession PyClass
// ============================================================================

/// Result of evaluating a survey against one answer sheet
#[pyclass]
pub struct EvaluationSession {
    traversal: Traversal,
}

impl EvaluationSession {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }
}

#[pymethods]
impl EvaluationSession {
    /// Question ids currently visible, in survey order
    #[getter]
    fn visible_questions(&self) -> Vec<String> {
        self.ids_with(Visibility::Visible)
    }

    /// Question ids currently hidden, in survey order
    #[getter]
    fn hidden_questions(&self) -> Vec<String> {
        self.ids_with(Visibility::Hidden)
    }

    /// Questions the respondent has been routed through
    #[getter]
    fn path(&self) -> Vec<String> {
        self.traversal.path.clone()
    }

    /// Question to present next, or None when the survey is done
    #[getter]
    fn current_question(&self) -> Option<String> {
        self.traversal.current.clone()
    }

    /// True only when the respondent reached the end of the survey
    #[getter]
    fn is_complete(&self) -> bool {
        self.traversal.is_complete()
    }

    /// "cycle" or "path_limit" when the walk was cut short, else None
    #[getter]
    fn halted(&self) -> Option<&'static str> {
        self.traversal.halted.map(HaltReason::as_str)
    }

    fn is_visible(&self, question_id: &str) -> bool {
        self.traversal.state.is_visible(question_id)
    }

    /// Navigation overrides as a list of {"question", "type", "target"} dicts
    fn navigation(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let list = PyList::empty(py);
        for (question, navigation) in self.traversal.state.navigation() {
            let dict = PyDict::new(py);
            dict.set_item("question", question)?;
            dict.set_item("type", navigation_kind(navigation))?;
            dict.set_item("target", navigation_target(navigation))?;
            list.append(dict)?;
        }
        Ok(list.into())
    }

    /// Whole result as a JSON string
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.traversal).map_err(|e| SurveyLogicError::from(e).into())
    }

    fn __repr__(&self) -> String {
        format!(
            "EvaluationSession(path={:?}, current={:?}, halted={:?}, hidden={})",
            self.traversal.path,
            self.traversal.current,
            self.traversal.halted,
            self.traversal.state.hidden_questions().len()
        )
    }
}

impl EvaluationSession {
    fn ids_with(&self, wanted: Visibility) -> Vec<String> {
        self.traversal
            .state
            .visibility
            .iter()
            .filter(|(_, v)| *v == wanted)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

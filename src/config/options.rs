//! Evaluator options

use crate::error::{Result, SurveyLogicError};
use serde::Deserialize;

/// Tunables for survey-wide evaluation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    /// Questions targeted by some `show_question` action start hidden and
    /// appear only once that action fires
    pub gated_show_targets_start_hidden: bool,
    /// Upper bound on the number of questions in a respondent path
    pub max_path_len: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            gated_show_targets_start_hidden: true,
            max_path_len: default_max_path_len(),
        }
    }
}

fn default_max_path_len() -> usize {
    1000
}

impl EvaluatorOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_path_len == 0 {
            return Err(SurveyLogicError::InvalidOptions(
                "max_path_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

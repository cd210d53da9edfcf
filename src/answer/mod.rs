//! Respondent answers supplied by the survey-taking host

mod sheet;
mod value;

pub use sheet::*;
pub use value::*;

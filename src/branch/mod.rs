//! Branch evaluation
//!
//! This module resolves a question's conditional logic against the answers
//! collected so far into visibility changes and a navigation override.

mod evaluator;
mod outcome;


pub use evaluator::*;
pub use outcome::*;

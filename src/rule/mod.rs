//! Conditional logic rule model
//!
//! This module holds the data a question's branching logic is made of
//! (conditions, combinators, actions) and the pure edits the authoring
//! surface performs on it. It has no evaluation behavior; see `branch`.

mod edit;
mod model;
mod preview;
mod targets;


pub use edit::*;
pub use model::*;
pub use preview::*;
pub use targets::*;

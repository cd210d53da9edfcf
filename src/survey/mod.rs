//! Survey and question definitions
//!
//! A survey owns an ordered list of questions; each question owns its
//! conditional logic.

mod definition;
mod index;
mod question;

pub use definition::*;
pub use index::*;
pub use question::*;

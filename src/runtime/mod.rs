//! Survey-taking runtime module

mod engine;
mod session;


pub use engine::*;
pub use session::*;

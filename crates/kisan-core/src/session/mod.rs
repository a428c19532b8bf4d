//! Session state module.
//!
//! - `context`: location, last image and history for the running session
//! - `state`: the submission lifecycle

mod context;
mod state;

pub use context::QueryContext;
pub use state::SubmissionState;

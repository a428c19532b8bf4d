//! Submission lifecycle state.

use serde::{Deserialize, Serialize};

/// Where the front-end is in the query lifecycle.
///
/// `Idle → Submitting → Displaying`, and back to `Submitting` on the next
/// submit. There is no `Submitting → Submitting` transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Nothing submitted yet in this session.
    #[default]
    Idle,
    /// A fetch is in flight; submission is disabled.
    Submitting,
    /// An answer is being (or has been) shown.
    Displaying,
}

impl SubmissionState {
    /// Whether a new submission may start from this state.
    pub fn accepts_submit(self) -> bool {
        !matches!(self, Self::Submitting)
    }

    pub fn is_loading(self) -> bool {
        matches!(self, Self::Submitting)
    }
}

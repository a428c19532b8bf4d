//! Fetcher response payload.

use serde::{Deserialize, Serialize};

/// Apology shown when the backend cannot be reached or returns garbage.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I could not get an answer right now. Please try again in a little while.";

/// The answer produced by a [`ResponseFetcher`](super::ResponseFetcher).
///
/// `error == true` marks a degraded answer: it is shown to the user like any
/// other answer but never written to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub error: bool,
}

impl FetchResponse {
    /// A successful answer. Confidence is clamped into `[0, 1]`.
    pub fn success(answer: impl Into<String>, confidence: f32) -> Self {
        Self {
            answer: answer.into(),
            confidence: Some(confidence.clamp(0.0, 1.0)),
            sources: Vec::new(),
            error: false,
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// A degraded answer carrying the standard apology.
    pub fn apology() -> Self {
        Self::degraded(APOLOGY_MESSAGE)
    }

    /// A degraded answer with a custom user-safe message.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            confidence: None,
            sources: Vec::new(),
            error: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

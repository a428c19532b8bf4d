//! History record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One past query and the answer it received.
///
/// Records are created only for non-error answers and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Query text; empty for image-only queries
    pub query: String,
    /// Language code the query was asked in
    pub language: String,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Answer returned by the fetcher
    pub answer: String,
}

impl HistoryRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        query: impl Into<String>,
        language: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self::at(query, language, answer, Utc::now())
    }

    /// Creates a record with an explicit timestamp.
    pub fn at(
        query: impl Into<String>,
        language: impl Into<String>,
        answer: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            timestamp,
            answer: answer.into(),
        }
    }

    pub fn is_image_only(&self) -> bool {
        self.query.trim().is_empty()
    }
}

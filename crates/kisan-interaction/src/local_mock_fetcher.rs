//! LocalMockFetcher - keyword answers behind an artificial network delay.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::config::DEFAULT_MOCK_LATENCY_MS;
use kisan_core::query::{FetchResponse, QueryRequest, ResponseFetcher};

use crate::keyword_rules;

/// Answers from the built-in keyword rules after a fixed delay.
#[derive(Debug, Clone)]
pub struct LocalMockFetcher {
    latency: Duration,
}

impl Default for LocalMockFetcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MOCK_LATENCY_MS))
    }
}

impl LocalMockFetcher {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// The answer without the delay.
    pub fn answer(request: &QueryRequest) -> FetchResponse {
        keyword_rules::answer_for(
            request.query(),
            request.has_image(),
            request.location().is_some(),
        )
    }
}

#[async_trait]
impl ResponseFetcher for LocalMockFetcher {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, request: &QueryRequest) -> FetchResponse {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = Self::answer(request);
        tracing::debug!(
            "[LocalMockFetcher] Answered {:?} (confidence {:?})",
            request.query(),
            response.confidence
        );
        response
    }
}

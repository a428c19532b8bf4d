//! RemoteFetcher - multipart POST to the assistant backend.
//!
//! Request fields: `query`, `lang`, `context` (JSON `{"location": ...}`) and an
//! optional `image` file part. Expected reply:
//! `{"answer": "...", "confidence": 0.8, "sources": ["..."]}`.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::config::FallbackPolicy;
use kisan_core::query::{FetchResponse, QueryRequest, ResponseFetcher};
use kisan_core::{KisanError, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::local_mock_fetcher::LocalMockFetcher;

/// Fetcher backed by an HTTP endpoint.
#[derive(Clone)]
pub struct RemoteFetcher {
    client: Client,
    endpoint: String,
    fallback: FallbackPolicy,
}

#[derive(Deserialize)]
struct RemoteAnswer {
    answer: String,
    confidence: Option<f32>,
    #[serde(default)]
    sources: Vec<String>,
}

impl RemoteFetcher {
    /// Creates a fetcher posting to `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KisanError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            fallback: FallbackPolicy::Apology,
        })
    }

    /// Sets what to answer when the backend fails.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: &QueryRequest) -> Result<Form> {
        let context = serde_json::to_string(request.context())?;

        let mut form = Form::new()
            .text("query", request.query().to_string())
            .text("lang", request.language().to_string())
            .text("context", context);

        if let Some(image) = request.image() {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| KisanError::validation(format!("Invalid image type: {e}")))?;
            form = form.part("image", part);
        }

        Ok(form)
    }

    async fn send_request(&self, request: &QueryRequest) -> Result<FetchResponse> {
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| KisanError::fetch(format!("Backend request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KisanError::fetch(format!(
                "Backend returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: RemoteAnswer = response
            .json()
            .await
            .map_err(|e| KisanError::fetch(format!("Failed to parse backend response: {e}")))?;

        if parsed.answer.trim().is_empty() {
            return Err(KisanError::fetch("Backend returned an empty answer"));
        }

        Ok(FetchResponse {
            answer: parsed.answer,
            confidence: parsed.confidence.map(|c| c.clamp(0.0, 1.0)),
            sources: parsed.sources,
            error: false,
        })
    }

    fn degrade(&self, request: &QueryRequest) -> FetchResponse {
        match self.fallback {
            FallbackPolicy::Apology => FetchResponse::apology(),
            FallbackPolicy::Local => FetchResponse {
                error: true,
                ..LocalMockFetcher::answer(request)
            },
        }
    }
}

#[async_trait]
impl ResponseFetcher for RemoteFetcher {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(&self, request: &QueryRequest) -> FetchResponse {
        match self.send_request(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("[RemoteFetcher] {} - degrading ({:?})", err, self.fallback);
                self.degrade(request)
            }
        }
    }
}

//! Response fetcher trait.

use async_trait::async_trait;

use super::model::QueryRequest;
use super::response::FetchResponse;

/// Resolves a user query to an answer payload.
///
/// Implementations never fail: backend or network problems are converted into
/// a [`FetchResponse`] with `error = true` and a user-safe message.
#[async_trait]
pub trait ResponseFetcher: Send + Sync {
    /// Short name used in logs (e.g. "local", "remote").
    fn name(&self) -> &str;

    /// Fetches the answer for a validated request.
    async fn fetch(&self, request: &QueryRequest) -> FetchResponse;
}

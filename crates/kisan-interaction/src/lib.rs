//! Outbound collaborators: response fetchers and device capabilities.

pub mod command_voice;
pub mod external_command;
pub mod geolocation;
pub mod keyword_rules;
pub mod local_mock_fetcher;
pub mod mailto_escalation;
pub mod remote_fetcher;

use std::sync::Arc;
use std::time::Duration;

use kisan_core::capability::{Capabilities, EscalationHandler, VoiceInput, VoiceOutput};
use kisan_core::config::{AppConfig, FetcherConfig, FetcherMode};
use kisan_core::query::ResponseFetcher;
use kisan_core::{KisanError, Result};

pub use command_voice::{CommandVoiceInput, CommandVoiceOutput};
pub use local_mock_fetcher::LocalMockFetcher;
pub use mailto_escalation::MailtoEscalation;
pub use remote_fetcher::RemoteFetcher;

/// Builds the fetcher selected by `fetcher.mode`.
///
/// # Errors
///
/// Returns `KisanError::Config` when remote mode has no endpoint.
pub fn build_fetcher(config: &FetcherConfig) -> Result<Arc<dyn ResponseFetcher>> {
    match config.mode {
        FetcherMode::Local => {
            tracing::info!(
                "[Fetcher] Using local answers ({} ms latency)",
                config.mock_latency_ms
            );
            Ok(Arc::new(LocalMockFetcher::new(Duration::from_millis(
                config.mock_latency_ms,
            ))))
        }
        FetcherMode::Remote => {
            let endpoint = config
                .endpoint
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| KisanError::config("fetcher.endpoint is required in remote mode"))?;

            tracing::info!("[Fetcher] Using remote backend at {}", endpoint);
            let fetcher = RemoteFetcher::new(endpoint, Duration::from_secs(config.timeout_secs))?
                .with_fallback(config.fallback);
            Ok(Arc::new(fetcher))
        }
    }
}

/// Detects which optional collaborators are usable on this machine.
pub fn detect_capabilities(config: &AppConfig) -> Capabilities {
    let voice_input = config
        .voice
        .input_command
        .as_deref()
        .and_then(CommandVoiceInput::detect)
        .map(|v| Arc::new(v) as Arc<dyn VoiceInput>);

    let voice_output = config
        .voice
        .output_command
        .as_deref()
        .and_then(CommandVoiceOutput::detect)
        .map(|v| Arc::new(v) as Arc<dyn VoiceOutput>);

    let escalation = if config.escalation.address.is_some() {
        MailtoEscalation::detect().map(|e| Arc::new(e) as Arc<dyn EscalationHandler>)
    } else {
        None
    };

    let capabilities = Capabilities {
        voice_input,
        voice_output,
        geolocator: geolocation::detect(&config.location),
        escalation,
    };
    tracing::info!("[Capabilities] {:?}", capabilities);
    capabilities
}

//! Query controller.
//!
//! Owns the session's `AppState` and drives the submit lifecycle:
//! `Idle|Displaying → Submitting → Displaying`. Submission is split in two
//! halves (`begin_submit` / `finish_submit`) so a front-end can run the fetch
//! on its own task and keep handling input; `submit` does both in one call.

use std::sync::Arc;
use std::time::Duration;

use kisan_core::capability::{Capabilities, EscalationMessage, Geolocator};
use kisan_core::config::{AppConfig, EscalationConfig};
use kisan_core::history::{HistoryRecord, HistoryRepository};
use kisan_core::query::{FetchResponse, GeoLocation, ImageAttachment, QueryRequest, ResponseFetcher};
use kisan_core::session::{QueryContext, SubmissionState};
use kisan_core::{KisanError, Result};

use crate::events::{AppEvent, EventSink};
use crate::history_cache::HistoryCache;
use crate::render::render_history_html;
use crate::reveal::{RevealEffect, RevealHandle, RevealOutcome};

/// Controller tunables, normally derived from `AppConfig`.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub language: String,
    pub reveal_interval: Duration,
    pub location_timeout: Duration,
    pub escalation: EscalationConfig,
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            language: config.language.default.clone(),
            reveal_interval: Duration::from_millis(config.reveal.interval_ms),
            location_timeout: Duration::from_secs(config.location.timeout_secs),
            escalation: config.escalation.clone(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// The last question and the answer shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
}

/// Everything the session knows, owned by the controller.
#[derive(Debug, Default)]
pub struct AppState {
    pub context: QueryContext,
    pub submission: SubmissionState,
    pub language: String,
    /// Text accumulated from dictation, submitted with the next query.
    pub draft: String,
    pending_image: Option<ImageAttachment>,
    last_exchange: Option<Exchange>,
}

impl AppState {
    /// Image that will be attached to the next submission.
    pub fn pending_image(&self) -> Option<&ImageAttachment> {
        self.pending_image.as_ref()
    }

    pub fn last_exchange(&self) -> Option<&Exchange> {
        self.last_exchange.as_ref()
    }
}

/// A validated request waiting to be fetched.
pub struct PendingQuery {
    request: QueryRequest,
    fetcher: Arc<dyn ResponseFetcher>,
}

impl PendingQuery {
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Invokes the fetcher. Never fails; failures arrive as `error = true`.
    pub async fn run(self) -> CompletedQuery {
        tracing::debug!("[Query] Fetching via {}", self.fetcher.name());
        let response = self.fetcher.fetch(&self.request).await;
        CompletedQuery {
            request: self.request,
            response,
        }
    }
}

/// A request together with the response it produced.
#[derive(Debug, Clone)]
pub struct CompletedQuery {
    pub request: QueryRequest,
    pub response: FetchResponse,
}

/// Result of a finished submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub response: FetchResponse,
    /// Whether the exchange was appended to history.
    pub recorded: bool,
}

/// Location lookup detached from the controller, bounded by a timeout.
#[derive(Clone)]
pub struct LocationRequest {
    geolocator: Arc<dyn Geolocator>,
    timeout: Duration,
}

impl LocationRequest {
    /// Returns `None` on failure or timeout.
    pub async fn run(self) -> Option<GeoLocation> {
        match tokio::time::timeout(self.timeout, self.geolocator.locate()).await {
            Ok(Ok(location)) => Some(location),
            Ok(Err(e)) => {
                tracing::info!("[Location] Lookup failed: {}", e);
                None
            }
            Err(_) => {
                tracing::info!("[Location] Lookup timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

pub struct QueryController {
    state: AppState,
    fetcher: Arc<dyn ResponseFetcher>,
    history: HistoryCache,
    capabilities: Capabilities,
    settings: ControllerSettings,
    reveal: RevealEffect,
    current_reveal: Option<RevealHandle>,
    events: EventSink,
}

impl QueryController {
    /// Creates the controller and loads persisted history.
    pub async fn new(
        fetcher: Arc<dyn ResponseFetcher>,
        repository: Arc<dyn HistoryRepository>,
        capabilities: Capabilities,
        settings: ControllerSettings,
        events: EventSink,
    ) -> Self {
        let history = HistoryCache::new(repository, events.clone());
        let log = history.load().await;
        tracing::info!(
            "[Query] Controller ready: fetcher={}, {} history record(s), capabilities={:?}",
            fetcher.name(),
            log.len(),
            capabilities
        );

        let state = AppState {
            context: QueryContext::new(log),
            language: settings.language.clone(),
            ..AppState::default()
        };

        Self {
            state,
            fetcher,
            history,
            capabilities,
            reveal: RevealEffect::new(settings.reveal_interval),
            settings,
            current_reveal: None,
            events,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        self.state.context.history().newest_first().cloned().collect()
    }

    // ============================================================================
    // Submission
    // ============================================================================

    /// Validates the query and enters `Submitting`.
    ///
    /// The draft (if any) is prepended to `query`, and the pending image is
    /// attached. On a validation failure the user is notified and nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// - `KisanError::Busy` while a previous submission is in flight
    /// - `KisanError::Validation` when both text and image are absent
    pub fn begin_submit(&mut self, query: &str) -> Result<PendingQuery> {
        if !self.state.submission.accepts_submit() {
            self.events.notice("Please wait for the current answer.");
            return Err(KisanError::Busy);
        }

        let text = join_draft(&self.state.draft, query);
        let request = QueryRequest::new(
            text,
            self.state.language.clone(),
            self.state.pending_image.clone(),
            self.state.context.snapshot(),
        )
        .inspect_err(|e| self.events.notice(e.to_string()))?;

        self.state.pending_image = None;
        self.state.draft.clear();
        self.cancel_reveal();
        self.transition(SubmissionState::Submitting);

        tracing::info!(
            "[Query] Submitting: lang={}, chars={}, image={}, located={}",
            request.language(),
            request.query().chars().count(),
            request.has_image(),
            request.location().is_some()
        );

        Ok(PendingQuery {
            request,
            fetcher: self.fetcher.clone(),
        })
    }

    /// Leaves `Submitting`: starts the reveal and records successful answers.
    pub async fn finish_submit(&mut self, completed: CompletedQuery) -> SubmitOutcome {
        let CompletedQuery { request, response } = completed;

        self.transition(SubmissionState::Displaying);
        self.current_reveal = Some(self.reveal.start(response.answer.clone(), self.events.clone()));
        self.state.last_exchange = Some(Exchange {
            query: request.query().to_string(),
            answer: response.answer.clone(),
        });

        if response.is_error() {
            tracing::warn!("[Query] Degraded answer shown, not recorded");
            return SubmitOutcome {
                response,
                recorded: false,
            };
        }

        let record = HistoryRecord::new(request.query(), request.language(), response.answer.clone());
        if let Err(e) = self
            .history
            .record(self.state.context.history_mut(), record)
            .await
        {
            tracing::warn!("[History] Failed to persist history: {}", e);
        }

        SubmitOutcome {
            response,
            recorded: true,
        }
    }

    /// Validates, fetches exactly once and displays the answer.
    pub async fn submit(&mut self, query: &str) -> Result<SubmitOutcome> {
        let pending = self.begin_submit(query)?;
        let completed = pending.run().await;
        Ok(self.finish_submit(completed).await)
    }

    /// Waits for the running reveal, if any.
    pub async fn wait_for_reveal(&mut self) -> Option<RevealOutcome> {
        match self.current_reveal.take() {
            Some(handle) => Some(handle.wait().await),
            None => None,
        }
    }

    pub fn cancel_reveal(&mut self) {
        if let Some(handle) = self.current_reveal.take() {
            handle.cancel();
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::debug!("[Query] {:?} -> {:?}", self.state.submission, next);
        self.state.submission = next;
        self.events.emit(AppEvent::StateChanged(next));
    }

    // ============================================================================
    // Session context
    // ============================================================================

    /// Attaches `image` to the next submission and remembers it as the last image.
    pub fn select_image(&mut self, image: ImageAttachment) {
        tracing::info!(
            "[Query] Image selected: {} ({}, {} bytes)",
            image.file_name,
            image.mime_type,
            image.len()
        );
        self.state.context.select_image(image.clone());
        self.state.pending_image = Some(image);
    }

    /// Drops the image queued for the next submission. The last image is kept.
    pub fn discard_pending_image(&mut self) -> bool {
        self.state.pending_image.take().is_some()
    }

    /// Sets the language code sent with subsequent queries.
    pub fn set_language(&mut self, code: &str) -> Result<()> {
        let code = code.trim();
        let valid = !code.is_empty()
            && code.len() <= 16
            && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(KisanError::validation(format!("Invalid language code: '{code}'")));
        }
        self.state.language = code.to_string();
        Ok(())
    }

    /// A detached location lookup, or `None` when no geolocator is available
    /// or the location is already known.
    pub fn location_request(&self) -> Option<LocationRequest> {
        if self.state.context.location().is_some() {
            return None;
        }
        self.capabilities
            .geolocator
            .clone()
            .map(|geolocator| LocationRequest {
                geolocator,
                timeout: self.settings.location_timeout,
            })
    }

    /// Stores the session location. Only the first location sticks.
    pub fn apply_location(&mut self, location: GeoLocation) -> bool {
        let stored = self.state.context.set_location(location);
        if stored {
            tracing::info!(
                "[Location] Session location set to ({:.4}, {:.4})",
                location.latitude,
                location.longitude
            );
        }
        stored
    }

    /// Looks up and stores the location, failing soft.
    ///
    /// Returns `None` without a lookup when the location is already known or
    /// no geolocator is available; use `state().context.location()` for the
    /// current value.
    pub async fn acquire_location(&mut self) -> Option<GeoLocation> {
        let request = self.location_request()?;
        if let Some(location) = request.run().await {
            self.apply_location(location);
        }
        self.state.context.location()
    }

    // ============================================================================
    // Optional capabilities
    // ============================================================================

    /// Listens once and appends the transcript to the draft.
    ///
    /// Failures are logged and leave the draft unchanged.
    pub async fn dictate(&mut self) -> &str {
        let Some(voice_input) = self.capabilities.voice_input.clone() else {
            self.events.notice("Voice input is not available.");
            return &self.state.draft;
        };

        match voice_input.listen(&self.state.language).await {
            Ok(transcript) => {
                let transcript = transcript.trim();
                if !transcript.is_empty() {
                    self.state.draft = join_draft(&self.state.draft, transcript);
                }
            }
            Err(e) => tracing::warn!("[Voice] Dictation failed: {}", e),
        }
        &self.state.draft
    }

    /// Discards dictated text.
    pub fn clear_draft(&mut self) {
        self.state.draft.clear();
    }

    /// Speaks the last answer in the current language.
    pub async fn speak_last_answer(&self) -> Result<()> {
        let voice_output = self
            .capabilities
            .voice_output
            .as_ref()
            .ok_or_else(|| KisanError::capability("voice output", "not available"))?;
        let exchange = self
            .state
            .last_exchange
            .as_ref()
            .ok_or_else(|| KisanError::validation("There is no answer to read yet"))?;

        voice_output.speak(&exchange.answer, &self.state.language).await
    }

    /// Stops any speech in progress.
    pub async fn stop_speaking(&self) {
        if let Some(voice_output) = &self.capabilities.voice_output {
            voice_output.cancel().await;
        }
    }

    /// Hands a message about the last exchange to the escalation handler.
    pub async fn escalate(&self) -> Result<EscalationMessage> {
        let handler = self
            .capabilities
            .escalation
            .as_ref()
            .ok_or_else(|| KisanError::capability("escalation", "not available"))?;
        let recipient = self
            .settings
            .escalation
            .address
            .as_deref()
            .ok_or_else(|| KisanError::capability("escalation", "no expert address configured"))?;
        let exchange = self
            .state
            .last_exchange
            .as_ref()
            .ok_or_else(|| KisanError::validation("Ask a question before contacting an expert"))?;

        let message = EscalationMessage::compose(
            recipient,
            self.settings.escalation.subject.clone(),
            &exchange.query,
            &exchange.answer,
        );
        handler.hand_off(&message).await?;
        tracing::info!("[Escalation] Handed off message to {}", message.recipient);
        Ok(message)
    }

    // ============================================================================
    // History
    // ============================================================================

    pub async fn clear_history(&mut self) -> Result<()> {
        self.history.clear(self.state.context.history_mut()).await
    }

    /// HTML rendering of the history, most recent first.
    pub fn history_html(&self) -> String {
        render_history_html(self.state.context.history().newest_first())
    }
}

fn join_draft(draft: &str, text: &str) -> String {
    let (draft, text) = (draft.trim(), text.trim());
    match (draft.is_empty(), text.is_empty()) {
        (true, _) => text.to_string(),
        (false, true) => draft.to_string(),
        (false, false) => format!("{draft} {text}"),
    }
}

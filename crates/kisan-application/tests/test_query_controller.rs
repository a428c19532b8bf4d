//! Integration tests for the query controller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kisan_application::{
    AppEvent, ControllerSettings, EventSink, QueryController, RevealOutcome,
};
use kisan_core::capability::{
    Capabilities, EscalationHandler, EscalationMessage, Geolocator, VoiceInput,
};
use kisan_core::history::{HistoryRecord, HistoryRepository};
use kisan_core::query::{FetchResponse, GeoLocation, ImageAttachment, QueryRequest, ResponseFetcher};
use kisan_core::session::SubmissionState;
use kisan_core::{KisanError, Result};
use kisan_infrastructure::JsonHistoryRepository;
use kisan_interaction::geolocation::FixedLocator;
use kisan_interaction::keyword_rules::LOCATION_DISCLAIMER;
use kisan_interaction::local_mock_fetcher::LocalMockFetcher;
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// ============================================================================
// Mock collaborators
// ============================================================================

/// Echoes the query back and counts calls.
#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<QueryRequest>>,
    fail: bool,
}

impl CountingFetcher {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseFetcher for CountingFetcher {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch(&self, request: &QueryRequest) -> FetchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            FetchResponse::apology()
        } else {
            FetchResponse::success(format!("answer to {}", request.query()), 0.9)
        }
    }
}

#[derive(Default)]
struct MemoryRepository {
    stored: Mutex<Vec<HistoryRecord>>,
}

#[async_trait]
impl HistoryRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        *self.stored.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

struct ScriptedVoice(Result<String>);

#[async_trait]
impl VoiceInput for ScriptedVoice {
    async fn listen(&self, _language: &str) -> Result<String> {
        self.0.clone()
    }
}

struct NeverLocator;

#[async_trait]
impl Geolocator for NeverLocator {
    async fn locate(&self) -> Result<GeoLocation> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(GeoLocation::new(0.0, 0.0))
    }
}

#[derive(Default)]
struct RecordingEscalation {
    sent: Mutex<Vec<EscalationMessage>>,
}

#[async_trait]
impl EscalationHandler for RecordingEscalation {
    async fn hand_off(&self, message: &EscalationMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn fast_settings() -> ControllerSettings {
    ControllerSettings {
        reveal_interval: Duration::from_millis(1),
        ..ControllerSettings::default()
    }
}

async fn controller_with(
    fetcher: Arc<dyn ResponseFetcher>,
    repository: Arc<dyn HistoryRepository>,
    capabilities: Capabilities,
) -> (QueryController, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = QueryController::new(
        fetcher,
        repository,
        capabilities,
        fast_settings(),
        EventSink::new(tx),
    )
    .await;
    (controller, rx)
}

fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn image() -> ImageAttachment {
    ImageAttachment::new("leaf.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
}

// ============================================================================
// Submission lifecycle
// ============================================================================

#[tokio::test]
async fn test_empty_query_does_not_fetch() {
    let fetcher = Arc::new(CountingFetcher::default());
    let repository = Arc::new(MemoryRepository::default());
    let (mut controller, mut rx) =
        controller_with(fetcher.clone(), repository.clone(), Capabilities::default()).await;
    drain(&mut rx);

    let err = controller.submit("   ").await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(fetcher.calls(), 0);
    assert!(controller.history().is_empty());
    assert!(repository.stored.lock().unwrap().is_empty());
    assert_eq!(controller.state().submission, SubmissionState::Idle);

    let events = drain(&mut rx);
    assert!(matches!(events.as_slice(), [AppEvent::Notice(_)]));
}

#[tokio::test]
async fn test_image_only_query_is_accepted() {
    let fetcher = Arc::new(CountingFetcher::default());
    let (mut controller, _rx) = controller_with(
        fetcher.clone(),
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
    )
    .await;

    controller.select_image(image());
    let outcome = controller.submit("").await.unwrap();

    assert!(outcome.recorded);
    assert_eq!(fetcher.calls(), 1);
    let sent = fetcher.requests.lock().unwrap()[0].clone();
    assert!(sent.has_image());
    assert_eq!(sent.query(), "");

    // Attached once; still remembered as the last image.
    assert!(controller.state().pending_image().is_none());
    assert_eq!(controller.state().context.last_image().unwrap().file_name, "leaf.jpg");
}

#[tokio::test]
async fn test_submit_fetches_once_and_records() {
    let fetcher = Arc::new(CountingFetcher::default());
    let repository = Arc::new(MemoryRepository::default());
    let (mut controller, mut rx) =
        controller_with(fetcher.clone(), repository.clone(), Capabilities::default()).await;
    drain(&mut rx);

    let outcome = controller.submit("leaf spot on tomato").await.unwrap();
    assert_eq!(controller.wait_for_reveal().await, Some(RevealOutcome::Completed));

    assert!(outcome.recorded);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(controller.state().submission, SubmissionState::Displaying);

    let stored = repository.stored.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].query, "leaf spot on tomato");
    assert_eq!(stored[0].answer, "answer to leaf spot on tomato");
    assert_eq!(stored[0].language, "en");

    let events = drain(&mut rx);
    assert_eq!(events[0], AppEvent::StateChanged(SubmissionState::Submitting));
    assert_eq!(events[1], AppEvent::StateChanged(SubmissionState::Displaying));
    assert!(events.contains(&AppEvent::RevealFrame {
        text: "answer to leaf spot on tomato".to_string(),
        done: true,
    }));
    assert!(events.iter().any(|e| matches!(e, AppEvent::HistoryChanged(r) if r.len() == 1)));
}

#[tokio::test]
async fn test_resubmit_while_submitting_is_rejected() {
    let fetcher = Arc::new(CountingFetcher::default());
    let (mut controller, _rx) = controller_with(
        fetcher.clone(),
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
    )
    .await;

    let pending = controller.begin_submit("market price").unwrap();
    assert!(controller.state().submission.is_loading());

    let err = controller.begin_submit("another one").err().unwrap();
    assert!(err.is_busy());

    let completed = pending.run().await;
    controller.finish_submit(completed).await;

    assert_eq!(fetcher.calls(), 1);
    assert!(controller.state().submission.accepts_submit());
    assert!(controller.begin_submit("another one").is_ok());
}

#[tokio::test]
async fn test_error_responses_are_not_recorded() {
    let fetcher = Arc::new(CountingFetcher::failing());
    let repository = Arc::new(MemoryRepository::default());
    let (mut controller, _rx) =
        controller_with(fetcher.clone(), repository.clone(), Capabilities::default()).await;

    let outcome = controller.submit("rain tomorrow").await.unwrap();

    assert!(outcome.response.is_error());
    assert!(!outcome.recorded);
    assert!(controller.history().is_empty());
    assert!(repository.stored.lock().unwrap().is_empty());
    // The degraded answer is still shown.
    assert_eq!(
        controller.state().last_exchange().unwrap().answer,
        FetchResponse::apology().answer
    );
}

#[tokio::test]
async fn test_eleven_queries_keep_newest_ten() {
    let fetcher = Arc::new(CountingFetcher::default());
    let repository = Arc::new(MemoryRepository::default());
    let (mut controller, _rx) =
        controller_with(fetcher, repository.clone(), Capabilities::default()).await;

    for n in 1..=11 {
        controller.submit(&format!("question {n}")).await.unwrap();
    }

    let history = controller.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history.first().unwrap().query, "question 11");
    assert_eq!(history.last().unwrap().query, "question 2");
    assert!(history.iter().all(|r| r.query != "question 1"));

    let stored = repository.stored.lock().unwrap().clone();
    assert_eq!(stored.len(), 10);
    assert_eq!(stored[0].query, "question 2");
}

#[tokio::test(start_paused = true)]
async fn test_new_submission_cancels_running_reveal() {
    let fetcher = Arc::new(CountingFetcher::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let settings = ControllerSettings {
        reveal_interval: Duration::from_millis(5),
        ..ControllerSettings::default()
    };
    let mut controller = QueryController::new(
        fetcher,
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
        settings,
        EventSink::new(tx),
    )
    .await;

    controller
        .submit("a question whose answer takes a long time to reveal")
        .await
        .unwrap();
    // Let the first answer get part of the way through its reveal.
    tokio::time::sleep(Duration::from_millis(40)).await;
    let mut finals = Vec::new();
    let mut partial_first = 0;
    for event in drain(&mut rx) {
        if let AppEvent::RevealFrame { text, done } = event {
            if done {
                finals.push(text);
            } else {
                partial_first += 1;
            }
        }
    }
    assert!(partial_first > 0, "first answer never started revealing");

    controller.submit("short").await.unwrap();
    assert_eq!(controller.wait_for_reveal().await, Some(RevealOutcome::Completed));
    // Well past the time the first answer would need to finish.
    tokio::time::sleep(Duration::from_secs(1)).await;

    for event in drain(&mut rx) {
        if let AppEvent::RevealFrame { text, done: true } = event {
            finals.push(text);
        }
    }
    assert_eq!(finals, vec!["answer to short".to_string()]);
}

// ============================================================================
// Session context
// ============================================================================

#[tokio::test]
async fn test_location_prefix_only_when_located() {
    let fetcher: Arc<dyn ResponseFetcher> = Arc::new(LocalMockFetcher::new(Duration::ZERO));

    let (mut unlocated, _rx) = controller_with(
        fetcher.clone(),
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
    )
    .await;
    assert_eq!(unlocated.acquire_location().await, None);
    let outcome = unlocated.submit("rain tomorrow").await.unwrap();
    assert!(!outcome.response.answer.starts_with(LOCATION_DISCLAIMER));

    let capabilities = Capabilities {
        geolocator: Some(Arc::new(FixedLocator::new(GeoLocation::new(21.1, 79.0)))),
        ..Capabilities::default()
    };
    let (mut located, _rx) =
        controller_with(fetcher, Arc::new(MemoryRepository::default()), capabilities).await;
    assert_eq!(
        located.acquire_location().await,
        Some(GeoLocation::new(21.1, 79.0))
    );
    let outcome = located.submit("rain tomorrow").await.unwrap();
    assert!(outcome.response.answer.starts_with(LOCATION_DISCLAIMER));
}

#[tokio::test]
async fn test_location_is_set_once() {
    let capabilities = Capabilities {
        geolocator: Some(Arc::new(FixedLocator::new(GeoLocation::new(1.0, 2.0)))),
        ..Capabilities::default()
    };
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        Arc::new(MemoryRepository::default()),
        capabilities,
    )
    .await;

    controller.acquire_location().await;
    assert!(controller.location_request().is_none());
    assert!(!controller.apply_location(GeoLocation::new(9.0, 9.0)));
    assert_eq!(
        controller.state().context.location(),
        Some(GeoLocation::new(1.0, 2.0))
    );
}

#[tokio::test(start_paused = true)]
async fn test_location_lookup_times_out() {
    let capabilities = Capabilities {
        geolocator: Some(Arc::new(NeverLocator)),
        ..Capabilities::default()
    };
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        Arc::new(MemoryRepository::default()),
        capabilities,
    )
    .await;

    let started = tokio::time::Instant::now();
    assert_eq!(controller.acquire_location().await, None);
    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(controller.state().context.location().is_none());
}

#[tokio::test]
async fn test_set_language_is_sent_with_query() {
    let fetcher = Arc::new(CountingFetcher::default());
    let (mut controller, _rx) = controller_with(
        fetcher.clone(),
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
    )
    .await;

    assert!(controller.set_language("not a code!").is_err());
    controller.set_language("hi").unwrap();
    controller.submit("mausam").await.unwrap();

    assert_eq!(fetcher.requests.lock().unwrap()[0].language(), "hi");
    assert_eq!(controller.history()[0].language, "hi");
}

// ============================================================================
// Optional capabilities
// ============================================================================

#[tokio::test]
async fn test_dictation_fills_draft() {
    let fetcher = Arc::new(CountingFetcher::default());
    let capabilities = Capabilities {
        voice_input: Some(Arc::new(ScriptedVoice(Ok("rain tomorrow".to_string())))),
        ..Capabilities::default()
    };
    let (mut controller, _rx) = controller_with(
        fetcher.clone(),
        Arc::new(MemoryRepository::default()),
        capabilities,
    )
    .await;

    assert_eq!(controller.dictate().await, "rain tomorrow");
    controller.submit("").await.unwrap();

    assert_eq!(fetcher.requests.lock().unwrap()[0].query(), "rain tomorrow");
    assert!(controller.state().draft.is_empty());
}

#[tokio::test]
async fn test_dictation_failure_is_silent() {
    let capabilities = Capabilities {
        voice_input: Some(Arc::new(ScriptedVoice(Err(KisanError::capability(
            "voice input",
            "microphone busy",
        ))))),
        ..Capabilities::default()
    };
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        Arc::new(MemoryRepository::default()),
        capabilities,
    )
    .await;

    assert_eq!(controller.dictate().await, "");
}

#[tokio::test]
async fn test_speak_without_voice_output_is_capability_error() {
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        Arc::new(MemoryRepository::default()),
        Capabilities::default(),
    )
    .await;
    controller.submit("weather").await.unwrap();

    assert!(controller.speak_last_answer().await.unwrap_err().is_capability());
}

#[tokio::test]
async fn test_escalation_uses_last_exchange() {
    let escalation = Arc::new(RecordingEscalation::default());
    let capabilities = Capabilities {
        escalation: Some(escalation.clone()),
        ..Capabilities::default()
    };
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut settings = fast_settings();
    settings.escalation.address = Some("expert@example.org".to_string());
    let mut controller = QueryController::new(
        Arc::new(CountingFetcher::default()),
        Arc::new(MemoryRepository::default()),
        capabilities,
        settings,
        EventSink::new(tx),
    )
    .await;

    assert!(controller.escalate().await.unwrap_err().is_validation());

    controller.submit("yellow leaves on wheat").await.unwrap();
    let message = controller.escalate().await.unwrap();

    assert_eq!(message.recipient, "expert@example.org");
    assert!(message.body.contains("yellow leaves on wheat"));
    assert!(message.body.contains("answer to yellow leaves on wheat"));
    assert_eq!(escalation.sent.lock().unwrap().len(), 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_history_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");

    {
        let repository = Arc::new(JsonHistoryRepository::with_path(path.clone()));
        let (mut controller, _rx) = controller_with(
            Arc::new(CountingFetcher::default()),
            repository,
            Capabilities::default(),
        )
        .await;
        controller.submit("first").await.unwrap();
        controller.submit("second").await.unwrap();
    }

    let repository = Arc::new(JsonHistoryRepository::with_path(path));
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        repository,
        Capabilities::default(),
    )
    .await;

    let queries: Vec<_> = controller.history().into_iter().map(|r| r.query).collect();
    assert_eq!(queries, vec!["second", "first"]);

    let html = controller.history_html();
    assert!(html.find("second").unwrap() < html.find("first").unwrap());

    controller.clear_history().await.unwrap();
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn test_corrupt_history_file_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    std::fs::write(&path, "{ not json").unwrap();

    let repository = Arc::new(JsonHistoryRepository::with_path(path));
    let (mut controller, _rx) = controller_with(
        Arc::new(CountingFetcher::default()),
        repository,
        Capabilities::default(),
    )
    .await;

    assert!(controller.history().is_empty());
    controller.submit("price of onion").await.unwrap();
    assert_eq!(controller.history().len(), 1);
}

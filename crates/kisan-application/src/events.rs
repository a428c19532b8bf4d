//! Events emitted by the controller for the front-end to draw.

use kisan_core::history::HistoryRecord;
use kisan_core::session::SubmissionState;
use tokio::sync::mpsc::UnboundedSender;

/// Everything the view needs to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Submission state changed (drives the loading indicator and submit control).
    StateChanged(SubmissionState),
    /// One frame of the reveal effect. `done` marks the final frame (no cursor).
    RevealFrame { text: String, done: bool },
    /// History changed; records are in display order (most recent first).
    HistoryChanged(Vec<HistoryRecord>),
    /// Short user-facing notice (validation failure, capability unavailable, ...).
    Notice(String),
}

/// Sending half used by the controller. Send errors mean the view is gone and are ignored.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<UnboundedSender<AppEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops every event.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: AppEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn notice(&self, message: impl Into<String>) {
        self.emit(AppEvent::Notice(message.into()));
    }
}

//! History cache service.
//!
//! Keeps the in-memory `HistoryLog` and its persisted copy in step, and asks
//! the view to redraw after every mutation.

use std::sync::Arc;

use kisan_core::Result;
use kisan_core::history::{HistoryLog, HistoryRecord, HistoryRepository};

use crate::events::{AppEvent, EventSink};

pub struct HistoryCache {
    repository: Arc<dyn HistoryRepository>,
    events: EventSink,
}

impl HistoryCache {
    pub fn new(repository: Arc<dyn HistoryRepository>, events: EventSink) -> Self {
        Self { repository, events }
    }

    /// Reads the persisted history. Missing or unreadable storage yields an empty log.
    pub async fn load(&self) -> HistoryLog {
        let log = match self.repository.load().await {
            Ok(records) => HistoryLog::from_records(records),
            Err(e) => {
                tracing::warn!("[History] Ignoring unreadable history: {}", e);
                HistoryLog::new()
            }
        };
        self.redraw(&log);
        log
    }

    /// Appends `entry`, evicts the oldest records past capacity, persists the
    /// whole sequence and triggers a redraw.
    ///
    /// The in-memory log is updated and redrawn even if persisting fails.
    pub async fn record(&self, log: &mut HistoryLog, entry: HistoryRecord) -> Result<()> {
        let evicted = log.push(entry);
        if !evicted.is_empty() {
            tracing::debug!("[History] Evicted {} oldest record(s)", evicted.len());
        }

        let persisted = self.repository.save(&log.to_vec()).await;
        self.redraw(log);
        persisted
    }

    /// Removes every record and persists the empty sequence.
    pub async fn clear(&self, log: &mut HistoryLog) -> Result<()> {
        log.clear();
        let persisted = self.repository.save(&[]).await;
        self.redraw(log);
        persisted
    }

    fn redraw(&self, log: &HistoryLog) {
        self.events
            .emit(AppEvent::HistoryChanged(log.newest_first().cloned().collect()));
    }
}

//! JSON-file implementation of `HistoryRepository`.
//!
//! The whole history lives under one file (`history.json`) as a JSON array of
//! records, oldest first. Every save overwrites the file.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kisan_core::history::{HistoryRecord, HistoryRepository};
use kisan_core::{KisanError, Result};

use crate::paths::KisanPaths;
use crate::storage::AtomicFile;

/// History persisted as a JSON array in a single file.
pub struct JsonHistoryRepository {
    file: Arc<AtomicFile<Vec<HistoryRecord>>>,
}

impl JsonHistoryRepository {
    /// Uses the default `history.json` location.
    pub fn new(paths: &KisanPaths) -> Result<Self> {
        Ok(Self::with_path(paths.history_file()?))
    }

    /// Uses an explicit file path (tests, custom data dirs).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicFile::json(path)),
        }
    }
}

#[async_trait]
impl HistoryRepository for JsonHistoryRepository {
    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        let file = Arc::clone(&self.file);
        let loaded = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| KisanError::internal(format!("History load task failed: {e}")))??;

        let records = loaded.unwrap_or_default();
        tracing::debug!("[History] Loaded {} records from disk", records.len());
        Ok(records)
    }

    async fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let file = Arc::clone(&self.file);
        let records = records.to_vec();
        let count = records.len();

        tokio::task::spawn_blocking(move || file.save(&records))
            .await
            .map_err(|e| KisanError::internal(format!("History save task failed: {e}")))??;

        tracing::debug!("[History] Persisted {} records", count);
        Ok(())
    }
}

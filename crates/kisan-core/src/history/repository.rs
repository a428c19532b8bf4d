//! History repository trait.
//!
//! Defines the interface for history persistence.

use async_trait::async_trait;

use super::model::HistoryRecord;
use crate::error::Result;

/// An abstract store holding the whole history sequence under one key.
///
/// Writes are whole-sequence overwrites; there are no incremental updates.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the persisted sequence in insertion order.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<HistoryRecord>)`: stored records (empty if nothing was stored)
    /// - `Err(_)`: storage exists but could not be read or parsed
    async fn load(&self) -> Result<Vec<HistoryRecord>>;

    /// Replaces the persisted sequence.
    async fn save(&self, records: &[HistoryRecord]) -> Result<()>;
}

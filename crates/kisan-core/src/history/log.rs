//! Bounded, insertion-ordered history log.

use std::collections::VecDeque;

use super::model::HistoryRecord;

/// Maximum number of records kept in history.
pub const HISTORY_CAPACITY: usize = 10;

/// An append-only log that evicts its oldest records once over capacity.
///
/// Order is insertion order (oldest first). Use [`HistoryLog::newest_first`]
/// for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    /// Creates an empty log with the standard capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Creates an empty log with a custom capacity (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Builds a log from persisted records, keeping only the newest `capacity`.
    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let mut log = Self::new();
        for record in records {
            log.push(record);
        }
        log
    }

    /// Appends a record and returns the records evicted from the front.
    pub fn push(&mut self, record: HistoryRecord) -> Vec<HistoryRecord> {
        self.records.push_back(record);

        let mut evicted = Vec::new();
        while self.records.len() > self.capacity {
            if let Some(oldest) = self.records.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently recorded entry.
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.back()
    }

    /// Records in insertion order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    /// Records in display order (most recent first).
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().rev()
    }

    /// Snapshot of all records in insertion order, as persisted.
    pub fn to_vec(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> HistoryRecord {
        HistoryRecord::new(format!("query {n}"), "en", format!("answer {n}"))
    }

    #[test]
    fn test_push_under_capacity_keeps_order() {
        let mut log = HistoryLog::new();
        assert!(log.push(record(1)).is_empty());
        assert!(log.push(record(2)).is_empty());

        let queries: Vec<_> = log.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["query 1", "query 2"]);
        assert_eq!(log.latest().unwrap().query, "query 2");
    }

    #[test]
    fn test_eleventh_record_evicts_first() {
        let mut log = HistoryLog::new();
        for n in 1..=10 {
            log.push(record(n));
        }
        let evicted = log.push(record(11));

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].query, "query 1");
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert!(log.iter().all(|r| r.query != "query 1"));
        assert_eq!(log.iter().next().unwrap().query, "query 2");
        assert_eq!(log.latest().unwrap().query, "query 11");
    }

    #[test]
    fn test_newest_first_reverses() {
        let mut log = HistoryLog::new();
        for n in 1..=3 {
            log.push(record(n));
        }
        let queries: Vec<_> = log.newest_first().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["query 3", "query 2", "query 1"]);
    }

    #[test]
    fn test_from_records_keeps_newest() {
        let records: Vec<_> = (1..=14).map(record).collect();
        let log = HistoryLog::from_records(records);
        assert_eq!(log.len(), 10);
        assert_eq!(log.iter().next().unwrap().query, "query 5");
        assert_eq!(log.latest().unwrap().query, "query 14");
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut log = HistoryLog::with_capacity(3);
        for n in 0..50 {
            log.push(record(n));
            assert!(log.len() <= 3);
        }
    }
}

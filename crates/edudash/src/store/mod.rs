//! Storage layer for edudash.
//!
//! The whole record set lives in one JSON document. Every mutation is a full
//! read-modify-write: load the sequence, change it in memory, save it back.
//! There is no locking between concurrent writers; the last save wins.

mod json_file;

use async_trait::async_trait;

use crate::error::Result;
use crate::student::StudentRecord;

pub use json_file::JsonFileStore;

/// Load/save access to the persisted record sequence.
///
/// Implementations own their backing document exclusively. Conflict and
/// atomicity policy stays inside the implementation; callers only ever load
/// the full sequence and save the full sequence.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Load every record, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageRead`] if the document cannot be read or
    /// parsed.
    async fn load_all(&self) -> Result<Vec<StudentRecord>>;

    /// Replace the persisted sequence with `records`.
    ///
    /// Either the new sequence is fully persisted or the previous one is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageWrite`] if the document cannot be written.
    async fn save_all(&self, records: &[StudentRecord]) -> Result<()>;

    /// Summary numbers about the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Find a record by id.
#[must_use]
pub fn find_by_id<'a>(records: &'a [StudentRecord], id: &str) -> Option<&'a StudentRecord> {
    records.iter().find(|record| record.id == id)
}

/// Position of a record by id.
#[must_use]
pub fn position_by_id(records: &[StudentRecord], id: &str) -> Option<usize> {
    records.iter().position(|record| record.id == id)
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of records in the document.
    pub total_records: usize,
    /// Size of the document in bytes.
    pub document_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentDraft;
    use chrono::Utc;

    fn records() -> Vec<StudentRecord> {
        let now = Utc::now();
        (0..3)
            .map(|i| {
                StudentRecord::from_draft(
                    StudentDraft {
                        first_name: Some(format!("Student{i}")),
                        ..StudentDraft::default()
                    },
                    now,
                )
            })
            .collect()
    }

    #[test]
    fn test_find_by_id() {
        let records = records();
        let wanted = records[1].id.clone();

        let found = find_by_id(&records, &wanted).unwrap();
        assert_eq!(found.first_name, "Student1");
    }

    #[test]
    fn test_find_by_id_missing() {
        let records = records();
        assert!(find_by_id(&records, "no-such-id").is_none());
        assert!(find_by_id(&[], "no-such-id").is_none());
    }

    #[test]
    fn test_position_by_id() {
        let records = records();
        assert_eq!(position_by_id(&records, &records[2].id), Some(2));
        assert_eq!(position_by_id(&records, "no-such-id"), None);
    }

    #[test]
    fn test_store_stats_clone() {
        let stats = StoreStats {
            total_records: 5,
            document_size_bytes: 512,
        };
        let cloned = stats.clone();
        assert_eq!(stats, cloned);
    }
}

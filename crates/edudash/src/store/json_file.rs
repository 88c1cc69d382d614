//! JSON document store.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{RecordStore, StoreStats};
use crate::error::{Error, Result};
use crate::student::{seed_records, StudentRecord};

/// Fallback file name used when building temporary paths.
const DEFAULT_FILE_NAME: &str = "students.json";

/// Record store backed by a single pretty-printed JSON array on disk.
///
/// Saves go to a uniquely named temporary file in the same directory, are
/// flushed, and are then renamed over the document, so a crash mid-write
/// leaves the previous document in place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Path to the document.
    path: PathBuf,
    /// Write the sample records when the document is missing.
    seed_on_missing: bool,
}

impl JsonFileStore {
    /// Create a store for the document at `path` without touching the disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, seed_on_missing: bool) -> Self {
        Self {
            path: path.into(),
            seed_on_missing,
        }
    }

    /// Create a store and make sure the document's directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>, seed_on_missing: bool) -> Result<Self> {
        let store = Self::new(path, seed_on_missing);

        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        debug!("Opened student document at {}", store.path.display());
        Ok(store)
    }

    /// Get the path to the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove temporary files left by saves that never reached the rename,
    /// then write the initial document if none exists yet.
    ///
    /// Call before the store is shared; a save in flight elsewhere would lose
    /// its temporary file. Returns `true` if a document was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the document's presence cannot be checked or the
    /// initial document cannot be written.
    pub async fn initialize(&self) -> Result<bool> {
        self.remove_stale_temp_files().await;

        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(false),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.create_initial().await?;
                Ok(true)
            }
            Err(err) => Err(Error::storage_read(&self.path, err)),
        }
    }

    async fn create_initial(&self) -> Result<Vec<StudentRecord>> {
        let records = if self.seed_on_missing {
            seed_records(Utc::now())
        } else {
            Vec::new()
        };
        self.save_all(&records).await?;

        if self.seed_on_missing {
            info!(
                "Sample data created at {} ({} records)",
                self.path.display(),
                records.len()
            );
        } else {
            info!("Empty student document created at {}", self.path.display());
        }
        Ok(records)
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_FILE_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!(".{}-{}.tmp", self.file_name(), Uuid::new_v4()))
    }

    /// Best effort; failures are logged and otherwise ignored.
    async fn remove_stale_temp_files(&self) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let prefix = format!(".{}-", self.file_name());

        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !(name.starts_with(&prefix) && name.ends_with(".tmp")) {
                continue;
            }
            let stale = entry.path();
            match tokio::fs::remove_file(&stale).await {
                Ok(()) => info!("Removed stale temporary file {}", stale.display()),
                Err(err) => warn!(
                    "Failed to remove stale temporary file {}: {}",
                    stale.display(),
                    err
                ),
            }
        }
    }

    async fn write_replace(&self, contents: &[u8]) -> std::io::Result<()> {
        let tmp_path = self.temp_path();

        let written = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(contents).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if written.is_err() {
            if let Err(err) = tokio::fs::remove_file(&tmp_path).await {
                if err.kind() != ErrorKind::NotFound {
                    warn!(
                        "Failed to remove temporary file {}: {}",
                        tmp_path.display(),
                        err
                    );
                }
            }
        }
        written
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<StudentRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return self.create_initial().await;
            }
            Err(err) => return Err(Error::storage_read(&self.path, err)),
        };

        let records: Vec<StudentRecord> =
            serde_json::from_slice(&bytes).map_err(|err| Error::storage_read(&self.path, err))?;

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                warn!("Duplicate student id {} in {}", record.id, self.path.display());
            }
        }

        debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    async fn save_all(&self, records: &[StudentRecord]) -> Result<()> {
        let contents =
            serde_json::to_vec_pretty(records).map_err(|err| Error::storage_write(&self.path, err))?;

        self.write_replace(&contents)
            .await
            .map_err(|err| Error::storage_write(&self.path, err))?;

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let document_size_bytes = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(StoreStats {
                    total_records: 0,
                    document_size_bytes: 0,
                });
            }
            Err(err) => return Err(Error::storage_read(&self.path, err)),
        };

        let total_records = self.load_all().await?.len();
        Ok(StoreStats {
            total_records,
            document_size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentDraft;
    use tempfile::TempDir;

    fn create_test_store(seed: bool) -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("students.json"), seed);
        (dir, store)
    }

    fn create_test_record(first_name: &str) -> StudentRecord {
        StudentRecord::from_draft(
            StudentDraft {
                first_name: Some(first_name.to_string()),
                last_name: Some("Tester".to_string()),
                email: Some(format!("{}@school.test", first_name.to_lowercase())),
                class: Some("Class 5".to_string()),
                ..StudentDraft::default()
            },
            Utc::now(),
        )
    }

    fn temp_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_load_missing_document_seeds() {
        let (_dir, store) = create_test_store(true);

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(store.path().exists());

        // A second load reads the same seeded document back.
        let again = store.load_all().await.unwrap();
        assert_eq!(records, again);
    }

    #[tokio::test]
    async fn test_load_missing_document_without_seed_is_empty() {
        let (_dir, store) = create_test_store(false);

        let records = store.load_all().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_order() {
        let (_dir, store) = create_test_store(false);
        let records = vec![
            create_test_record("Zed"),
            create_test_record("Amy"),
            create_test_record("Moe"),
        ];

        store.save_all(&records).await.unwrap();
        let loaded = store.load_all().await.unwrap();

        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_document_is_pretty_printed_array() {
        let (_dir, store) = create_test_store(false);
        store.save_all(&[create_test_record("Amy")]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with('['));
        assert!(text.contains("\n  {"));
        assert!(text.contains("\"firstName\": \"Amy\""));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_read_error() {
        let (_dir, store) = create_test_store(true);
        std::fs::write(store.path(), "[{\"id\": \"half-writ").unwrap();

        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, Error::StorageRead { .. }));

        // The corrupt document is reported, not repaired or reseeded.
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "[{\"id\": \"half-writ");
    }

    #[tokio::test]
    async fn test_interrupted_write_leaves_prior_document() {
        let (dir, store) = create_test_store(false);
        let records = vec![create_test_record("Amy")];
        store.save_all(&records).await.unwrap();

        // What a crash halfway through a save leaves behind.
        let stray = dir.path().join(".students.json-crashed.tmp");
        std::fs::write(&stray, "[{\"id\": \"trunc").unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_initialize_removes_stale_temp_files() {
        let (dir, store) = create_test_store(false);
        let records = vec![create_test_record("Amy")];
        store.save_all(&records).await.unwrap();

        let stray = dir.path().join(".students.json-crashed.tmp");
        std::fs::write(&stray, "[{\"id\": \"trunc").unwrap();
        let unrelated = dir.path().join(".other.json-crashed.tmp");
        std::fs::write(&unrelated, "keep").unwrap();

        assert!(!store.initialize().await.unwrap());
        assert!(!stray.exists());
        assert!(unrelated.exists());
        assert_eq!(store.load_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_prior_document() {
        let dir = tempfile::tempdir().unwrap();

        // Save a real document under a short name, then move it to a name
        // whose temporary sibling exceeds the 255-byte file name limit.
        let short = JsonFileStore::new(dir.path().join("students.json"), false);
        let records = vec![create_test_record("Amy"), create_test_record("Bob")];
        short.save_all(&records).await.unwrap();
        let long_path = dir.path().join(format!("{}.json", "s".repeat(225)));
        std::fs::rename(short.path(), &long_path).unwrap();

        let store = JsonFileStore::new(&long_path, false);
        let before = std::fs::read(&long_path).unwrap();

        let mut changed = records.clone();
        changed.push(create_test_record("Cal"));
        let err = store.save_all(&changed).await.unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));

        assert_eq!(std::fs::read(&long_path).unwrap(), before);
        assert_eq!(store.load_all().await.unwrap(), records);
        assert!(temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let (dir, store) = create_test_store(false);
        store.save_all(&[create_test_record("Amy")]).await.unwrap();
        store.save_all(&[create_test_record("Bob")]).await.unwrap();

        assert!(temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_is_write_error_and_cleans_up() {
        let (dir, store) = create_test_store(false);
        // A non-empty directory where the document should be makes the
        // final rename fail.
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "x").unwrap();

        let err = store
            .save_all(&[create_test_record("Amy")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert!(temp_files(dir.path()).is_empty());
        assert!(store.path().join("keep").exists());
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let store = JsonFileStore::new(blocker.join("students.json"), false);

        let err = store.save_all(&[]).await.unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "plain file");
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data/nested/students.json");

        let store = JsonFileStore::open(&nested, true).await.unwrap();
        assert!(nested.parent().unwrap().is_dir());
        assert_eq!(store.path(), nested);
    }

    #[tokio::test]
    async fn test_initialize_only_creates_once() {
        let (_dir, store) = create_test_store(true);

        assert!(store.initialize().await.unwrap());
        let first = store.load_all().await.unwrap();

        assert!(!store.initialize().await.unwrap());
        let second = store.load_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stats() {
        let (_dir, store) = create_test_store(false);

        let empty = store.stats().await.unwrap();
        assert_eq!(empty.total_records, 0);
        assert_eq!(empty.document_size_bytes, 0);
        // Stats never creates the document.
        assert!(!store.path().exists());

        store
            .save_all(&[create_test_record("Amy"), create_test_record("Bob")])
            .await
            .unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_records, 2);
        assert!(stats.document_size_bytes > 0);
    }

    #[tokio::test]
    async fn test_last_save_wins() {
        let (_dir, store) = create_test_store(false);
        let base = store.load_all().await.unwrap();

        let mut first = base.clone();
        first.push(create_test_record("Amy"));
        let mut second = base;
        second.push(create_test_record("Bob"));

        store.save_all(&first).await.unwrap();
        store.save_all(&second).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].first_name, "Bob");
    }
}

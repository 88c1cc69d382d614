//! Collection service for student records.
//!
//! Maps list/get/create/update/remove onto a [`RecordStore`]. Each call is one
//! independent load → mutate → save cycle; nothing is cached between calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{find_by_id, position_by_id, RecordStore};
use crate::student::{StudentDraft, StudentRecord};
use crate::validation::validate_record;

/// CRUD operations over the persisted student collection.
#[derive(Debug, Clone)]
pub struct StudentService {
    store: Arc<dyn RecordStore>,
    enforce_validation: bool,
}

impl StudentService {
    /// Create a service over `store`. Field validation is off.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            enforce_validation: false,
        }
    }

    /// Turn field validation of created and updated records on or off.
    #[must_use]
    pub fn with_validation(mut self, enforce: bool) -> Self {
        self.enforce_validation = enforce;
        self
    }

    /// All records, in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    pub async fn list(&self) -> Result<Vec<StudentRecord>> {
        self.store.load_all().await
    }

    /// A single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id, or a storage error.
    pub async fn get(&self, id: &str) -> Result<StudentRecord> {
        let records = self.store.load_all().await?;
        find_by_id(&records, id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Append a new record built from `draft` and persist it.
    ///
    /// Every call produces a new record, even for identical drafts.
    ///
    /// # Errors
    ///
    /// Returns a validation error (when enforced) or a storage error.
    pub async fn create(&self, draft: StudentDraft) -> Result<StudentRecord> {
        let mut records = self.store.load_all().await?;

        let mut record = StudentRecord::from_draft(draft, Utc::now());
        while find_by_id(&records, &record.id).is_some() {
            debug!("Regenerating colliding student id {}", record.id);
            record.id = uuid::Uuid::new_v4().to_string();
        }
        self.check(&record)?;

        records.push(record.clone());
        self.store.save_all(&records).await?;

        info!("Created student {} ({})", record.id, record.full_name());
        Ok(record)
    }

    /// Apply `draft` to the record with `id` and persist it.
    ///
    /// `id`, `createdAt` and `enrollmentDate` are kept from the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id, a validation error
    /// (when enforced), or a storage error.
    pub async fn update(&self, id: &str, draft: StudentDraft) -> Result<StudentRecord> {
        let mut records = self.store.load_all().await?;
        let index = position_by_id(&records, id).ok_or_else(|| Error::not_found(id))?;

        let mut updated = records[index].clone();
        updated.apply(draft, Utc::now());
        self.check(&updated)?;

        records[index] = updated.clone();
        self.store.save_all(&records).await?;

        info!("Updated student {}", updated.id);
        Ok(updated)
    }

    /// Remove the record with `id` and persist the rest.
    ///
    /// Returns the record as it was before removal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id, or a storage error.
    pub async fn remove(&self, id: &str) -> Result<StudentRecord> {
        let mut records = self.store.load_all().await?;
        let index = position_by_id(&records, id).ok_or_else(|| Error::not_found(id))?;

        let removed = records.remove(index);
        self.store.save_all(&records).await?;

        info!("Deleted student {}", removed.id);
        Ok(removed)
    }

    fn check(&self, record: &StudentRecord) -> Result<()> {
        if self.enforce_validation {
            validate_record(record)?;
        }
        Ok(())
    }
}

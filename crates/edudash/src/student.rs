//! Student record types.
//!
//! This module defines the stored [`StudentRecord`] and the partial
//! [`StudentDraft`] accepted by create and update requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Class names a student may be enrolled in.
pub const CLASS_OPTIONS: [&str; 10] = [
    "Class 1", "Class 2", "Class 3", "Class 4", "Class 5", "Class 6", "Class 7", "Class 8",
    "Class 9", "Class 10",
];

/// A single student record as persisted in the document.
///
/// `id`, `enrollment_date` and `created_at` are assigned once when the record
/// is created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Opaque unique identifier.
    pub id: String,

    /// Given name.
    #[serde(default)]
    pub first_name: String,

    /// Family name.
    #[serde(default)]
    pub last_name: String,

    /// Contact email address.
    #[serde(default)]
    pub email: String,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// The class the student is enrolled in, e.g. `Class 3`.
    #[serde(default)]
    pub class: String,

    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Parent or guardian name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    /// Parent or guardian phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,

    /// Calendar date the record was created.
    pub enrollment_date: NaiveDate,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or updating a record.
///
/// Fields left as `None` were not supplied. The optional contact fields use a
/// nested `Option` so that an explicit `null` (`Some(None)`) clears the stored
/// value while a missing key (`None`) keeps it. Server-assigned fields (`id`,
/// `enrollmentDate`, `createdAt`, `updatedAt`) have no slot here, so any
/// values a caller sends for them are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDraft {
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Contact email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    /// Class name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Postal address.
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
    /// Parent or guardian name.
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_name: Option<Option<String>>,
    /// Parent or guardian phone number.
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_phone: Option<Option<String>>,
}

/// Only called when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl StudentRecord {
    /// Build a new record from a draft, generating the id and stamping
    /// enrollment date and timestamps from `now`.
    #[must_use]
    pub fn from_draft(draft: StudentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: draft.first_name.unwrap_or_default(),
            last_name: draft.last_name.unwrap_or_default(),
            email: draft.email.unwrap_or_default(),
            phone: draft.phone.flatten(),
            class: draft.class.unwrap_or_default(),
            address: draft.address.flatten(),
            parent_name: draft.parent_name.flatten(),
            parent_phone: draft.parent_phone.flatten(),
            enrollment_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field the draft supplies and refresh `updated_at`.
    ///
    /// A supplied `null` clears an optional field. `id`, `enrollment_date` and
    /// `created_at` are left untouched.
    pub fn apply(&mut self, draft: StudentDraft, now: DateTime<Utc>) {
        if let Some(first_name) = draft.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = draft.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = draft.email {
            self.email = email;
        }
        if let Some(class) = draft.class {
            self.class = class;
        }
        if let Some(phone) = draft.phone {
            self.phone = phone;
        }
        if let Some(address) = draft.address {
            self.address = address;
        }
        if let Some(parent_name) = draft.parent_name {
            self.parent_name = parent_name;
        }
        if let Some(parent_phone) = draft.parent_phone {
            self.parent_phone = parent_phone;
        }
        // Clock skew must not break createdAt <= updatedAt.
        self.updated_at = now.max(self.created_at);
    }

    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The two sample records written when a document is first created.
#[must_use]
pub fn seed_records(now: DateTime<Utc>) -> Vec<StudentRecord> {
    let rows = [
        (
            "John",
            "Doe",
            "john.doe@email.com",
            "+1-234-567-8901",
            "Class 10",
            "123 Main St, City, State",
            "Jane Doe",
            "+1-234-567-8902",
        ),
        (
            "Alice",
            "Smith",
            "alice.smith@email.com",
            "+1-234-567-8903",
            "Class 9",
            "456 Oak Ave, City, State",
            "Bob Smith",
            "+1-234-567-8904",
        ),
    ];

    rows.into_iter()
        .map(
            |(first, last, email, phone, class, address, parent, parent_phone)| {
                let draft = StudentDraft {
                    first_name: Some(first.to_string()),
                    last_name: Some(last.to_string()),
                    email: Some(email.to_string()),
                    phone: Some(Some(phone.to_string())),
                    class: Some(class.to_string()),
                    address: Some(Some(address.to_string())),
                    parent_name: Some(Some(parent.to_string())),
                    parent_phone: Some(Some(parent_phone.to_string())),
                };
                StudentRecord::from_draft(draft, now)
            },
        )
        .collect()
}

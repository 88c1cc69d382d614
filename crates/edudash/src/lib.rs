//! `edudash` - School record manager
//!
//! This library provides the JSON-document record store, the student
//! collection service built on it, and the REST API the dashboard consumes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod service;
pub mod store;
pub mod student;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use http::{build_router, AppState};
pub use logging::init_logging;
pub use service::StudentService;
pub use store::{JsonFileStore, RecordStore, StoreStats};
pub use student::{StudentDraft, StudentRecord};

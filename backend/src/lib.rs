//! # EduRegister - Student registration records
//!
//! Validates student registration forms, keeps the records in a local
//! durable store, and serves search, edit, delete and CSV export on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Form     │────▶│  Validator  │────▶│ Reconciler  │────▶│    Store    │
//! │  (typed)    │     │ (per field) │     │ (uniqueness)│     │ (JSON file) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                          ┌─────────────┐           │
//!                                          │ Query / CSV │◀──────────┘
//!                                          └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eduregister::{RecordStore, Registrar, StudentForm};
//!
//! let mut registrar = Registrar::new(RecordStore::in_memory());
//! let saved = registrar.submit(form, None)?;
//! println!("Registered {}", saved.record.id);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Student record and form payload
//! - [`validation`] - Per-field rules
//! - [`store`] - Durable record store and storage backends
//! - [`reconcile`] - Create vs update, uniqueness, provenance timestamps
//! - [`query`] - Search
//! - [`export`] - CSV serialization
//! - [`registrar`] - User actions
//! - [`notice`] - User-facing notices
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Rules and persistence
pub mod validation;
pub mod store;
pub mod reconcile;

// Views
pub mod query;
pub mod export;

// Actions
pub mod registrar;
pub mod notice;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    Rejection,
    RegistrarError,
    RegistrarResult,
    ServerError,
    StoreError,
    StoreResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{StudentForm, StudentRecord};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    validate_field,
    validate_form,
    Field,
    FieldError,
    FieldOptions,
    FormReport,
    ValidationResult,
    Validator,
};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{FileStorage, MemoryStorage, RecordStore, StorageBackend, DB_KEY};

// =============================================================================
// Re-exports - Reconciler
// =============================================================================

pub use reconcile::{
    Clock,
    FixedClock,
    IdGenerator,
    Reconciled,
    Reconciler,
    SequentialIds,
    SystemClock,
    TimestampIds,
    WriteKind,
};

// =============================================================================
// Re-exports - Query and Export
// =============================================================================

pub use query::{filter, filter_owned};
pub use export::{export_file_name, to_csv, to_csv_uniform, CsvQuoting, CSV_MIME, HEADERS};

// =============================================================================
// Re-exports - Actions
// =============================================================================

pub use registrar::{CsvExport, Registrar};
pub use notice::{Notice, NoticeBoard, NoticeLevel, NOTICES};
pub use config::Config;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}

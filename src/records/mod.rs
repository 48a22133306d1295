//! Journal and health metric records
//!
//! This module is the adapter between whatever persists the user's data and
//! the analysis engine:
//!
//! - **types**: `JournalEntry`, `HealthMetricRecord`, `MetricKind`, `DateRange`
//! - **store**: in-memory `RecordStore` and the `RecordSource` query trait
//! - **csv_import**: CSV readers for journal and metric exports
//! - **error**: Error types
//!
//! Loading is forgiving: a malformed row is reported and skipped, never fatal.

pub mod csv_import;
pub mod error;
pub mod store;
pub mod types;

pub use csv_import::{CsvImporter, ImportResult};
pub use error::{RecordError, RecordResult};
pub use store::{load_journal_file, load_metrics_file, RecordSource, RecordStore};
pub use types::{parse_day, DateRange, HealthMetricRecord, JournalEntry, MetricKind, Symptom};

//! # Symptom Lens
//!
//! Symptom/lifestyle correlation analysis for personal health journals.
//! Given journal entries (mood, energy, symptoms, tags) and passive health
//! metrics (sleep, steps, heart rate), it compares days on which a symptom
//! was reported against symptom-free days and ranks the factors that differ
//! the most.
//!
//! ## Modules
//!
//! - [`records`]: Record types, CSV/JSON loading, the `RecordSource` seam
//! - [`analysis`]: Day partitioning, aggregation, ranking, insights, summaries,
//!   doctor-visit preparation
//! - [`narrative`]: Narrative generation capability and its HTTP client
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symptom_lens::analysis::CorrelationAnalyzer;
//! use symptom_lens::records::{DateRange, RecordStore};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RecordStore::load(Path::new("journal.json"), Some(Path::new("metrics.csv")))?;
//!     let range = store.journal_span().ok_or("empty journal")?;
//!
//!     let result = CorrelationAnalyzer::default().build_from(&store, "headache", range)?;
//!
//!     for comparison in &result.comparisons {
//!         println!("{}: {:+.1}", comparison.label, comparison.difference);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The engine is synchronous and never touches the clock or the network;
//! range defaults are the caller's business.

pub mod analysis;
pub mod api;
pub mod config;
pub mod logging;
pub mod narrative;
pub mod records;

// Re-export top-level types for convenience
pub use records::{
    DateRange, HealthMetricRecord, JournalEntry, MetricKind, RecordError, RecordSource,
    RecordStore, Symptom,
};

pub use analysis::{
    analyze, prepare_doctor_visit, summarize, AnalysisError, AnalysisOptions, AnalysisResult,
    Comparison, CorrelationAnalyzer, DayPolicy, DoctorVisitSummary, Factor, HealthSummary,
    NarrativeInput, PatternInsight, Strength,
};

pub use narrative::{HttpNarrator, Narrative, NarrativeError, NarrativeGenerator};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    AnalysisConfig, ApiConfig, Config, ConfigError, LoggingConfig, NarrativeConfig,
};

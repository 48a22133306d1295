//! Symptom Correlation Engine
//!
//! Compares days on which a symptom was reported against days on which it
//! was not:
//!
//! - **partition**: split journal days into symptom and symptom-free day-sets
//! - **aggregate**: average a factor over a day-set
//! - **tags**: tag frequencies and percentage differences
//! - **ranking**: comparisons, strength buckets and ordering
//! - **insights**: rule-based written observations
//! - **builder**: the full pipeline, producing an `AnalysisResult`
//! - **narrative_input**: prompt input for an external text generator
//! - **summary**: whole-period averages and symptom statistics
//! - **doctor_visit**: key symptoms, patterns and questions for an appointment
//!
//! Everything here is synchronous and pure. Inputs are borrowed and never
//! modified, so one set of records can feed concurrent analyses.
//!
//! # Example
//!
//! ```rust,ignore
//! use symptom_lens::analysis::{analyze, Factor};
//! use symptom_lens::records::DateRange;
//!
//! let result = analyze("Headache", range, &entries, &records)?;
//! let sleep = result.comparison(Factor::SleepDuration);
//! ```

pub mod aggregate;
pub mod builder;
pub mod doctor_visit;
pub mod error;
pub mod factor;
pub mod insights;
pub mod narrative_input;
pub mod partition;
pub mod ranking;
pub mod summary;
pub mod tags;

pub use aggregate::{aggregate_for_days, average_for_days, round_half_up, DayAverage};
pub use builder::{analyze, AnalysisOptions, AnalysisResult, CorrelationAnalyzer};
pub use doctor_visit::{prepare_doctor_visit, DoctorVisitSummary};
pub use error::AnalysisError;
pub use factor::Factor;
pub use insights::{build_insights, PatternInsight};
pub use narrative_input::{FactorSummary, NarrativeInput, TagSummary, DEFAULT_TOP_TAGS};
pub use partition::{partition, DayPolicy, DaySet, Partition};
pub use ranking::{rank, Comparison, Strength, Subject};
pub use summary::{available_symptoms, summarize, HealthSummary, SymptomStats};
pub use tags::{percentage_for, tag_comparisons, tag_frequency};

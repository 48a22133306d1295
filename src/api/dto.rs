//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Records arrive as raw JSON rows so that one malformed row is skipped and
//! reported instead of failing the whole request.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, DayPolicy, DoctorVisitSummary, HealthSummary};
use crate::narrative::Narrative;
use crate::records::ImportResult;

// ============================================
// ANALYSIS DTOs
// ============================================

/// Symptom correlation request
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// Symptom to analyze (case-insensitive). Missing or empty matches no entries.
    #[serde(default)]
    pub symptom: String,
    /// First day, ISO 8601 (defaults to `end - window_days`)
    #[serde(default)]
    pub start: Option<String>,
    /// Last day, ISO 8601 (defaults to the latest journal day)
    #[serde(default)]
    pub end: Option<String>,
    /// Journal entries
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    /// Health metric records
    #[serde(default)]
    pub metrics: Vec<serde_json::Value>,
    /// Overrides the configured same-day policy
    #[serde(default)]
    pub day_policy: Option<DayPolicy>,
    /// Overrides the configured number of prompt tags
    #[serde(default)]
    pub top_tags: Option<usize>,
    /// Also produce narrative text
    #[serde(default)]
    pub narrate: bool,
}

/// Symptom correlation response
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisResult,
    /// Prompt for an external narrative generator
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
    pub skipped: SkippedRecords,
}

// ============================================
// SUMMARY DTOs
// ============================================

/// Period summary request
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    #[serde(default)]
    pub metrics: Vec<serde_json::Value>,
    #[serde(default)]
    pub narrate: bool,
}

/// Period summary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: HealthSummary,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
    pub skipped: SkippedRecords,
}

// ============================================
// DOCTOR VISIT DTOs
// ============================================

/// Doctor-visit preparation request
#[derive(Debug, Deserialize)]
pub struct DoctorVisitRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    #[serde(default)]
    pub metrics: Vec<serde_json::Value>,
    /// Own questions, appended after the generated ones
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Doctor-visit preparation response
#[derive(Debug, Serialize)]
pub struct DoctorVisitResponse {
    pub visit: DoctorVisitSummary,
    /// Printable version of `visit`
    pub text: String,
    pub skipped: SkippedRecords,
}

// ============================================
// SYMPTOM DTOs
// ============================================

/// Available symptoms request
#[derive(Debug, Deserialize)]
pub struct SymptomsRequest {
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
}

/// Available symptoms response
#[derive(Debug, Serialize)]
pub struct SymptomsResponse {
    /// Distinct names in first-seen order
    pub symptoms: Vec<String>,
    pub count: usize,
    pub skipped: SkippedRecords,
}

// ============================================
// SHARED DTOs
// ============================================

/// Rows that could not be decoded
#[derive(Debug, Default, Serialize)]
pub struct SkippedRecords {
    pub entries: usize,
    pub metrics: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SkippedRecords {
    pub fn from_imports<A, B>(entries: &ImportResult<A>, metrics: &ImportResult<B>) -> Self {
        let errors = entries
            .errors
            .iter()
            .map(|e| format!("entries: {}", e))
            .chain(metrics.errors.iter().map(|e| format!("metrics: {}", e)))
            .collect();

        Self {
            entries: entries.rows_failed,
            metrics: metrics.rows_failed,
            errors,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy"
    pub status: String,
    /// "enabled" or "disabled"
    pub narrative: String,
    pub uptime_seconds: u64,
    pub version: String,
}

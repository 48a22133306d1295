//! Analysis Routes
//!
//! Endpoints that run the correlation engine over records supplied in the
//! request body. Decoding and analysis are CPU-bound and run on the
//! blocking pool.
//!
//! - POST /api/v1/analysis - Symptom correlation analysis
//! - POST /api/v1/summary - Period health summary
//! - POST /api/v1/doctor-visit - Doctor-visit preparation
//! - POST /api/v1/symptoms - Symptoms present in the journal

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::analysis::{available_symptoms, prepare_doctor_visit, summarize, NarrativeInput};
use crate::api::dto::{
    AnalysisRequest, AnalysisResponse, DoctorVisitRequest, DoctorVisitResponse, SkippedRecords,
    SummaryRequest, SummaryResponse, SymptomsRequest, SymptomsResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::narrative::{fallback_narrative, generate_or, narrate_or_fallback, Narrative};
use crate::records::store::decode_json_rows;
use crate::records::{parse_day, DateRange, HealthMetricRecord, ImportResult, JournalEntry};

/// POST /api/v1/analysis
///
/// Compare symptom days against symptom-free days.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let symptom = req.symptom.trim().to_string();
    let window_days = state.config.analysis.window_days;
    let analyzer = match req.day_policy {
        Some(policy) => state.analyzer.clone().day_policy(policy),
        None => state.analyzer.clone(),
    };
    let (start, end) = (req.start, req.end);
    let (entry_rows, metric_rows) = (req.entries, req.metrics);

    let (result, skipped) = blocking(move || {
        let (entries, metrics) = decode_rows(entry_rows, metric_rows);
        let skipped = SkippedRecords::from_imports(&entries, &metrics);
        let range = resolve_range(start.as_deref(), end.as_deref(), &entries.records, window_days)?;
        let result = analyzer.build(&symptom, range, &entries.records, &metrics.records)?;
        Ok((result, skipped))
    })
    .await?;

    let input = NarrativeInput::from_result(
        &result,
        req.top_tags.unwrap_or(state.config.analysis.top_tags),
    );
    let prompt = input.to_prompt();

    let narrative = if req.narrate {
        Some(match &state.narrator {
            Some(narrator) => narrate_or_fallback(narrator.as_ref(), &input, &result).await,
            None => Narrative {
                text: fallback_narrative(&result),
                generated: false,
            },
        })
    } else {
        None
    };

    tracing::info!(
        symptom = %result.symptom,
        range = %result.range,
        symptom_days = result.symptom_days_count,
        symptom_free_days = result.symptom_free_days_count,
        skipped_entries = skipped.entries,
        skipped_metrics = skipped.metrics,
        "Analysis complete"
    );

    Ok(Json(AnalysisResponse {
        analysis: result,
        prompt,
        narrative,
        skipped,
    }))
}

/// POST /api/v1/summary
///
/// Whole-period averages and symptom statistics.
pub async fn run_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummaryRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let window_days = state.config.analysis.window_days;
    let (start, end) = (req.start, req.end);
    let (entry_rows, metric_rows) = (req.entries, req.metrics);

    let (summary, skipped) = blocking(move || {
        let (entries, metrics) = decode_rows(entry_rows, metric_rows);
        let skipped = SkippedRecords::from_imports(&entries, &metrics);
        let range = resolve_range(start.as_deref(), end.as_deref(), &entries.records, window_days)?;
        let summary = summarize(range, &entries.records, &metrics.records)?;
        Ok((summary, skipped))
    })
    .await?;

    let prompt = summary.to_prompt();

    let narrative = if req.narrate {
        let fallback = || {
            format!(
                "You logged {} entries between {} and {}, \
                 with an average mood of {:.1}/5 and energy of {:.1}/5.",
                summary.entries,
                summary.range.start,
                summary.range.end,
                summary.mood_average,
                summary.energy_average
            )
        };
        Some(match &state.narrator {
            Some(narrator) => generate_or(narrator.as_ref(), &prompt, fallback).await,
            None => Narrative {
                text: fallback(),
                generated: false,
            },
        })
    } else {
        None
    };

    Ok(Json(SummaryResponse {
        summary,
        prompt,
        narrative,
        skipped,
    }))
}

/// POST /api/v1/doctor-visit
///
/// Key symptoms, patterns and questions for an appointment.
pub async fn run_doctor_visit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DoctorVisitRequest>,
) -> ApiResult<Json<DoctorVisitResponse>> {
    let window_days = state.config.analysis.window_days;
    let analyzer = state.analyzer.clone();
    let (start, end) = (req.start, req.end);
    let (entry_rows, metric_rows) = (req.entries, req.metrics);
    let extra_questions = req.questions;

    let (mut visit, skipped) = blocking(move || {
        let (entries, metrics) = decode_rows(entry_rows, metric_rows);
        let skipped = SkippedRecords::from_imports(&entries, &metrics);
        let range = resolve_range(start.as_deref(), end.as_deref(), &entries.records, window_days)?;
        let visit = prepare_doctor_visit(&analyzer, range, &entries.records, &metrics.records)?;
        Ok((visit, skipped))
    })
    .await?;

    for question in &extra_questions {
        visit.add_question(question);
    }

    tracing::info!(
        range = %visit.range,
        symptoms = visit.key_symptoms.len(),
        patterns = visit.overall_patterns.len(),
        "Doctor visit summary prepared"
    );

    Ok(Json(DoctorVisitResponse {
        text: visit.to_shareable_text(),
        visit,
        skipped,
    }))
}

/// POST /api/v1/symptoms
///
/// Distinct symptom names, in the order they first appear.
pub async fn list_symptoms(Json(req): Json<SymptomsRequest>) -> ApiResult<Json<SymptomsResponse>> {
    let entries = decode_json_rows::<JournalEntry>(req.entries);
    let symptoms = available_symptoms(&entries.records);

    Ok(Json(SymptomsResponse {
        count: symptoms.len(),
        symptoms,
        skipped: SkippedRecords {
            entries: entries.rows_failed,
            metrics: 0,
            errors: entries.errors,
        },
    }))
}

/// Run CPU-bound request work on the blocking pool
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {}", e)))?
}

fn decode_rows(
    entry_rows: Vec<serde_json::Value>,
    metric_rows: Vec<serde_json::Value>,
) -> (ImportResult<JournalEntry>, ImportResult<HealthMetricRecord>) {
    (decode_json_rows(entry_rows), decode_json_rows(metric_rows))
}

/// Work out the analysis range from optional bounds
///
/// A missing end defaults to the latest journal day; a missing start to
/// `window_days` before the end. Inverted ranges are left for the engine to
/// reject.
fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    entries: &[JournalEntry],
    window_days: i64,
) -> ApiResult<DateRange> {
    let parse = |field: &str, raw: &str| {
        parse_day(raw)
            .ok_or_else(|| ApiError::Validation(format!("{} is not a valid date: {}", field, raw)))
    };

    let end = match end {
        Some(raw) => parse("end", raw)?,
        None => entries
            .iter()
            .map(|e| e.date)
            .max()
            .ok_or_else(|| {
                ApiError::Validation("end is required when no entries are given".to_string())
            })?,
    };

    match start {
        Some(raw) => Ok(DateRange::new(parse("start", raw)?, end)),
        None => Ok(DateRange::ending_on(end, window_days)),
    }
}

//! Record Store
//!
//! A read-only, caller-owned view over journal entries and metric records.
//! The analysis engine never reaches into global state; whoever fetched the
//! records hands them over through a [`RecordSource`].

use super::csv_import::{CsvImporter, ImportResult};
use super::error::{RecordError, RecordResult};
use super::types::{DateRange, HealthMetricRecord, JournalEntry};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Anything that can answer date-range queries for journal and metric records
pub trait RecordSource {
    /// Journal entries whose day falls inside `range`
    fn journal_entries(&self, range: &DateRange) -> Vec<JournalEntry>;

    /// Metric records whose day falls inside `range`. Records without a
    /// usable day are never returned.
    fn metric_records(&self, range: &DateRange) -> Vec<HealthMetricRecord>;
}

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entries: Vec<JournalEntry>,
    metrics: Vec<HealthMetricRecord>,
}

impl RecordStore {
    pub fn new(entries: Vec<JournalEntry>, metrics: Vec<HealthMetricRecord>) -> Self {
        Self { entries, metrics }
    }

    /// Load a store from a journal file and an optional metrics file
    ///
    /// Malformed rows are skipped and logged; only unreadable files fail.
    pub fn load(journal: &Path, metrics: Option<&Path>) -> RecordResult<Self> {
        let entries = load_journal_file(journal)?;
        let records = match metrics {
            Some(path) => load_metrics_file(path)?.records,
            None => Vec::new(),
        };

        tracing::info!(
            entries = entries.records.len(),
            metrics = records.len(),
            "Loaded records"
        );

        Ok(Self::new(entries.records, records))
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn metrics(&self) -> &[HealthMetricRecord] {
        &self.metrics
    }

    pub fn add_entry(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn add_metric(&mut self, record: HealthMetricRecord) {
        self.metrics.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.metrics.is_empty()
    }

    /// Smallest range covering every journal entry, if any
    pub fn journal_span(&self) -> Option<DateRange> {
        let start = self.entries.iter().map(|e| e.date).min()?;
        let end = self.entries.iter().map(|e| e.date).max()?;
        Some(DateRange::new(start, end))
    }
}

impl RecordSource for RecordStore {
    fn journal_entries(&self, range: &DateRange) -> Vec<JournalEntry> {
        self.entries
            .iter()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect()
    }

    fn metric_records(&self, range: &DateRange) -> Vec<HealthMetricRecord> {
        self.metrics
            .iter()
            .filter(|r| r.date.map(|d| range.contains(d)).unwrap_or(false))
            .cloned()
            .collect()
    }
}

/// Load journal entries from a `.json` array or a `.csv` file
pub fn load_journal_file(path: &Path) -> RecordResult<ImportResult<JournalEntry>> {
    match extension(path).as_deref() {
        Some("json") => load_json_rows(path),
        Some("csv") => CsvImporter::new().import_journal(File::open(path)?),
        _ => Err(RecordError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load metric records from a `.json` array or a `.csv` file
pub fn load_metrics_file(path: &Path) -> RecordResult<ImportResult<HealthMetricRecord>> {
    match extension(path).as_deref() {
        Some("json") => load_json_rows(path),
        Some("csv") => CsvImporter::new().import_metrics(File::open(path)?),
        _ => Err(RecordError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn load_json_rows<T: DeserializeOwned>(path: &Path) -> RecordResult<ImportResult<T>> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    Ok(decode_json_rows(rows))
}

/// Decode each JSON row independently so one bad row does not sink the file
pub(crate) fn decode_json_rows<T: DeserializeOwned>(
    rows: Vec<serde_json::Value>,
) -> ImportResult<T> {
    let mut result = ImportResult::default();

    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(row) {
            Ok(record) => {
                result.records.push(record);
                result.rows_processed += 1;
            }
            // Report JSON rows by 1-based array position
            Err(e) => result.push_error(index + 1, e),
        }
    }

    result.truncate_errors();

    if result.rows_failed > 0 {
        tracing::warn!(
            rows_processed = result.rows_processed,
            rows_failed = result.rows_failed,
            "Skipped malformed JSON records"
        );
    }

    result
}

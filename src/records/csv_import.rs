//! CSV Import
//!
//! Reads journal entries and metric records from CSV files exported by the
//! journaling apps or wearables. Columns are located by header name, so column
//! order does not matter. Rows that cannot be parsed are reported and skipped;
//! they never abort the import.
//!
//! Journal layout (`symptoms` and `tags` are optional list columns):
//!
//! ```text
//! date,mood,energy,symptoms,tags,notes
//! 2025-03-25,3,2,Headache:6;Fatigue:4,stress;poor_sleep,Slept poorly
//! ```
//!
//! Metric layout:
//!
//! ```text
//! date,kind,value,source
//! 2025-03-25,sleep_duration_hours,5.5,apple_health
//! ```

use super::error::{RecordError, RecordResult};
use super::types::{parse_day, HealthMetricRecord, JournalEntry, MetricKind, Symptom};
use csv::StringRecord;
use std::collections::BTreeSet;
use std::io::Read;

const MAX_REPORTED_ERRORS: usize = 100;

/// CSV importer with configurable list separators
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Separator between items in the `symptoms` and `tags` columns
    list_separator: char,
    /// Separator between a symptom name and its severity
    severity_separator: char,
}

/// Result of an import operation
#[derive(Debug)]
pub struct ImportResult<T> {
    pub records: Vec<T>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl<T> Default for ImportResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rows_processed: 0,
            rows_failed: 0,
            errors: Vec::new(),
        }
    }
}

impl<T> ImportResult<T> {
    pub(crate) fn push_error(&mut self, line: usize, error: impl std::fmt::Display) {
        self.rows_failed += 1;
        self.errors.push(format!("Line {}: {}", line, error));
    }

    pub(crate) fn truncate_errors(&mut self) {
        if self.errors.len() > MAX_REPORTED_ERRORS {
            let total = self.errors.len();
            self.errors.truncate(MAX_REPORTED_ERRORS);
            self.errors
                .push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

struct JournalColumns {
    id: Option<usize>,
    date: usize,
    mood: usize,
    energy: usize,
    symptoms: Option<usize>,
    tags: Option<usize>,
    notes: Option<usize>,
}

struct MetricColumns {
    id: Option<usize>,
    date: usize,
    kind: usize,
    value: usize,
    source: Option<usize>,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self {
            list_separator: ';',
            severity_separator: ':',
        }
    }

    /// Set the separator used inside list columns
    pub fn with_list_separator(mut self, separator: char) -> Self {
        self.list_separator = separator;
        self
    }

    /// Set the separator between symptom name and severity
    pub fn with_severity_separator(mut self, separator: char) -> Self {
        self.severity_separator = separator;
        self
    }

    /// Import journal entries from any reader
    pub fn import_journal<R: Read>(&self, reader: R) -> RecordResult<ImportResult<JournalEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns = JournalColumns {
            id: column(&headers, &["id"]),
            date: required_column(&headers, &["date", "timestamp", "day"])?,
            mood: required_column(&headers, &["mood"])?,
            energy: required_column(&headers, &["energy"])?,
            symptoms: column(&headers, &["symptoms", "symptom"]),
            tags: column(&headers, &["tags", "tag"]),
            notes: column(&headers, &["notes", "note"]),
        };

        Ok(collect_rows(reader.records(), |record| {
            self.parse_journal_row(record, &columns)
        }))
    }

    /// Import journal entries from a CSV string
    pub fn import_journal_str(&self, data: &str) -> RecordResult<ImportResult<JournalEntry>> {
        self.import_journal(data.as_bytes())
    }

    /// Import metric records from any reader
    pub fn import_metrics<R: Read>(
        &self,
        reader: R,
    ) -> RecordResult<ImportResult<HealthMetricRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns = MetricColumns {
            id: column(&headers, &["id"]),
            date: required_column(&headers, &["date", "timestamp", "day"])?,
            kind: required_column(&headers, &["kind", "metric", "type"])?,
            value: required_column(&headers, &["value"])?,
            source: column(&headers, &["source"]),
        };

        Ok(collect_rows(reader.records(), |record| {
            parse_metric_row(record, &columns)
        }))
    }

    /// Import metric records from a CSV string
    pub fn import_metrics_str(
        &self,
        data: &str,
    ) -> RecordResult<ImportResult<HealthMetricRecord>> {
        self.import_metrics(data.as_bytes())
    }

    fn parse_journal_row(
        &self,
        record: &StringRecord,
        columns: &JournalColumns,
    ) -> Result<JournalEntry, String> {
        let raw_date = field(record, Some(columns.date));
        let date = parse_day(raw_date).ok_or_else(|| format!("invalid date: {:?}", raw_date))?;

        let mood = parse_rating(field(record, Some(columns.mood)), "mood")?;
        let energy = parse_rating(field(record, Some(columns.energy)), "energy")?;

        let symptoms = self
            .split_list(field(record, columns.symptoms))
            .map(|item| self.parse_symptom(item))
            .collect::<Result<Vec<_>, _>>()?;

        let tags: BTreeSet<String> = self
            .split_list(field(record, columns.tags))
            .map(str::to_string)
            .collect();

        Ok(JournalEntry {
            id: field(record, columns.id).to_string(),
            date,
            mood,
            energy,
            symptoms,
            tags,
            notes: field(record, columns.notes).to_string(),
        })
    }

    fn split_list<'a>(&self, raw: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        raw.split(self.list_separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse_symptom(&self, item: &str) -> Result<Symptom, String> {
        match item.rsplit_once(self.severity_separator) {
            Some((name, severity)) => {
                let severity: u8 = severity
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid severity in {:?}", item))?;
                if !(1..=10).contains(&severity) {
                    return Err(format!("severity out of range 1-10 in {:?}", item));
                }
                Ok(Symptom::new(name.trim(), severity))
            }
            None => Ok(Symptom::new(item, 5)),
        }
    }
}

fn parse_metric_row(
    record: &StringRecord,
    columns: &MetricColumns,
) -> Result<HealthMetricRecord, String> {
    let raw_date = field(record, Some(columns.date));
    let date = parse_day(raw_date).ok_or_else(|| format!("invalid date: {:?}", raw_date))?;

    let kind: MetricKind = field(record, Some(columns.kind)).parse()?;

    let raw_value = field(record, Some(columns.value));
    let value: f64 = raw_value
        .parse()
        .map_err(|_| format!("non-numeric value: {:?}", raw_value))?;
    if !value.is_finite() {
        return Err(format!("non-finite value: {:?}", raw_value));
    }

    Ok(HealthMetricRecord {
        id: field(record, columns.id).to_string(),
        date: Some(date),
        kind,
        value: Some(value),
        source: field(record, columns.source).to_string(),
    })
}

fn parse_rating(raw: &str, name: &str) -> Result<u8, String> {
    let rating: u8 = raw
        .parse()
        .map_err(|_| format!("invalid {} rating: {:?}", name, raw))?;
    if !(1..=5).contains(&rating) {
        return Err(format!("{} rating out of range 1-5: {}", name, rating));
    }
    Ok(rating)
}

fn collect_rows<T, I, F>(rows: I, mut parse: F) -> ImportResult<T>
where
    I: Iterator<Item = Result<StringRecord, csv::Error>>,
    F: FnMut(&StringRecord) -> Result<T, String>,
{
    let mut result = ImportResult::default();

    for (index, row) in rows.enumerate() {
        // +1 for the header row, +1 for 1-based line numbers
        let line = index + 2;

        let record = match row {
            Ok(r) => r,
            Err(e) => {
                result.push_error(line, e);
                continue;
            }
        };

        match parse(&record) {
            Ok(parsed) => {
                result.records.push(parsed);
                result.rows_processed += 1;
            }
            Err(e) => result.push_error(line, e),
        }
    }

    result.truncate_errors();

    if result.rows_failed > 0 {
        tracing::warn!(
            rows_processed = result.rows_processed,
            rows_failed = result.rows_failed,
            "Skipped malformed CSV rows"
        );
    }

    result
}

fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn required_column(headers: &StringRecord, names: &[&str]) -> RecordResult<usize> {
    column(headers, names)
        .ok_or_else(|| RecordError::Parse(format!("missing column: {}", names[0])))
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_journal_csv_import() {
        let csv_data = "date,mood,energy,symptoms,tags,notes
2025-03-25,3,2,Headache:6,stress;poor_sleep,Slept poorly
2025-03-26,3,3,,,Feeling better
2025-03-29,2,2,Headache:7;Fatigue:6,skipped_meals;headache,";

        let result = CsvImporter::new().import_journal_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_failed, 0);

        let first = &result.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 25).unwrap());
        assert_eq!(first.symptoms, vec![Symptom::new("Headache", 6)]);
        assert!(first.tags.contains("poor_sleep"));
        assert_eq!(first.notes, "Slept poorly");

        assert!(result.records[1].symptoms.is_empty());
        assert_eq!(result.records[2].symptoms.len(), 2);
    }

    #[test]
    fn test_journal_csv_column_order_and_default_severity() {
        let csv_data = "Mood,Date,Energy,Symptoms
4,2025-03-27,4,Nausea";

        let result = CsvImporter::new().import_journal_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 1);
        assert_eq!(result.records[0].symptoms[0].severity, 5);
    }

    #[test]
    fn test_journal_csv_skips_bad_rows() {
        let csv_data = "date,mood,energy,symptoms
2025-03-25,3,2,Headache:6
not-a-date,3,3,
2025-03-27,9,3,
2025-03-28,3,3,Headache:11
2025-03-29,2,2,";

        let result = CsvImporter::new().import_journal_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.rows_failed, 3);
        assert!(result.errors[0].starts_with("Line 3:"));
        assert!(result.errors[1].contains("mood"));
        assert!(result.errors[2].contains("severity"));
    }

    #[test]
    fn test_journal_csv_missing_required_column() {
        let csv_data = "date,energy\n2025-03-25,3";
        let err = CsvImporter::new().import_journal_str(csv_data).unwrap_err();
        assert!(matches!(err, RecordError::Parse(msg) if msg.contains("mood")));
    }

    #[test]
    fn test_custom_separators() {
        let csv_data = "date,mood,energy,symptoms,tags
2025-03-25,3,2,Headache=6|Fatigue=2,a|b";

        let result = CsvImporter::new()
            .with_list_separator('|')
            .with_severity_separator('=')
            .import_journal_str(csv_data)
            .unwrap();

        let entry = &result.records[0];
        assert_eq!(entry.symptoms[1], Symptom::new("Fatigue", 2));
        assert_eq!(entry.tags.len(), 2);
    }

    #[test]
    fn test_metrics_csv_import() {
        let csv_data = "date,kind,value,source
2025-03-25,sleep,5.5,apple_health
2025-03-25T00:00:00Z,steps,4200,fitbit
2025-03-26,heart_rate,abc,fitbit
2025-03-26,weight,70,manual
2025-03-27,sleep_duration_hours,,manual";

        let result = CsvImporter::new().import_metrics_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.rows_failed, 3);
        assert_eq!(result.records[0].kind, MetricKind::SleepDurationHours);
        assert_eq!(result.records[1].value, Some(4200.0));
        assert_eq!(result.records[1].source, "fitbit");
    }

    #[test]
    fn test_error_list_is_truncated() {
        let mut csv_data = String::from("date,kind,value\n");
        for _ in 0..150 {
            csv_data.push_str("bad,sleep,1\n");
        }

        let result = CsvImporter::new().import_metrics_str(&csv_data).unwrap();

        assert_eq!(result.rows_failed, 150);
        assert_eq!(result.errors.len(), MAX_REPORTED_ERRORS + 1);
        assert!(result.errors.last().unwrap().contains("50 more errors"));
    }
}

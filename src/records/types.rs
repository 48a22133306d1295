//! Core record types consumed by the analysis engine
//!
//! - `JournalEntry`: one self-reported journal entry (mood, energy, symptoms, tags)
//! - `HealthMetricRecord`: one passive metric reading (sleep, steps, heart rate)
//! - `MetricKind`: the fixed vocabulary of passive metrics
//! - `DateRange`: an inclusive calendar-day interval
//!
//! Records arrive from an external persistence layer, so deserialization is
//! lenient where the engine can degrade gracefully: a metric record with an
//! unreadable date or value is kept and simply skipped during aggregation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A symptom reported in a journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symptom {
    /// Free-text name (matched case-insensitively)
    pub name: String,
    /// Severity on a 1-10 scale
    #[serde(default = "default_severity", deserialize_with = "severity_scale")]
    pub severity: u8,
}

fn default_severity() -> u8 {
    5
}

impl Symptom {
    pub fn new(name: impl Into<String>, severity: u8) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }

    /// Case-insensitive exact name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: String,
    /// Calendar day of the entry. Timestamps are truncated to their UTC day.
    #[serde(deserialize_with = "required_day", alias = "timestamp")]
    pub date: NaiveDate,
    /// Mood rating, 1-5
    #[serde(deserialize_with = "rating_scale")]
    pub mood: u8,
    /// Energy rating, 1-5
    #[serde(deserialize_with = "rating_scale")]
    pub energy: u8,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    /// Case-sensitive, deduplicated tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub notes: String,
}

impl JournalEntry {
    pub fn new(date: NaiveDate, mood: u8, energy: u8) -> Self {
        Self {
            id: String::new(),
            date,
            mood,
            energy,
            symptoms: Vec::new(),
            tags: BTreeSet::new(),
            notes: String::new(),
        }
    }

    /// Builder: set identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: add a symptom
    pub fn symptom(mut self, name: impl Into<String>, severity: u8) -> Self {
        self.symptoms.push(Symptom::new(name, severity));
        self
    }

    /// Builder: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Builder: set notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether any symptom on this entry matches `name` (case-insensitive, exact)
    pub fn has_symptom(&self, name: &str) -> bool {
        !name.is_empty() && self.symptoms.iter().any(|s| s.is_named(name))
    }
}

/// Passive health metrics the engine knows how to compare
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Hours slept
    #[serde(alias = "sleep", alias = "sleep_duration")]
    SleepDurationHours,
    /// Steps walked
    #[serde(alias = "steps", alias = "activity")]
    StepCount,
    /// Resting heart rate in bpm
    #[serde(alias = "heart_rate", alias = "heartRate")]
    RestingHeartRate,
    /// Active energy burned in kcal
    #[serde(alias = "activeCalories")]
    ActiveCalories,
}

impl MetricKind {
    pub fn all() -> &'static [MetricKind] {
        &[
            MetricKind::SleepDurationHours,
            MetricKind::StepCount,
            MetricKind::RestingHeartRate,
            MetricKind::ActiveCalories,
        ]
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::SleepDurationHours => "hours",
            MetricKind::StepCount => "steps",
            MetricKind::RestingHeartRate => "bpm",
            MetricKind::ActiveCalories => "kcal",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::SleepDurationHours => write!(f, "sleep_duration_hours"),
            MetricKind::StepCount => write!(f, "step_count"),
            MetricKind::RestingHeartRate => write!(f, "resting_heart_rate"),
            MetricKind::ActiveCalories => write!(f, "active_calories"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sleep_duration_hours" | "sleep_duration" | "sleep" => {
                Ok(MetricKind::SleepDurationHours)
            }
            "step_count" | "steps" | "activity" => Ok(MetricKind::StepCount),
            "resting_heart_rate" | "heart_rate" | "heartrate" => Ok(MetricKind::RestingHeartRate),
            "active_calories" | "activecalories" => Ok(MetricKind::ActiveCalories),
            other => Err(format!("unknown metric kind: {}", other)),
        }
    }
}

/// A passive health metric reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthMetricRecord {
    #[serde(default)]
    pub id: String,
    /// Calendar day, `None` when missing or unparseable
    #[serde(default, deserialize_with = "optional_day", alias = "timestamp")]
    pub date: Option<NaiveDate>,
    pub kind: MetricKind,
    /// Reading, `None` when missing, non-numeric or non-finite
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    /// Provenance (e.g. "apple_health"), opaque to the engine
    #[serde(default)]
    pub source: String,
}

impl HealthMetricRecord {
    pub fn new(date: NaiveDate, kind: MetricKind, value: f64) -> Self {
        Self {
            id: String::new(),
            date: Some(date),
            kind,
            value: Some(value).filter(|v| v.is_finite()),
            source: String::new(),
        }
    }

    /// Builder: set provenance
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// A record contributes to aggregation only with both a day and a value
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && self.value.is_some()
    }
}

/// Inclusive calendar-day interval: `[start, end]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range. Bounds are not checked here; see [`DateRange::is_valid`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From `days` days before `end` through `end`, so `days + 1` calendar days
    ///
    /// A window reaching past the earliest representable date starts there.
    pub fn ending_on(end: NaiveDate, days: i64) -> Self {
        let start = Duration::try_days(days.max(0))
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Number of calendar days covered (0 for an inverted range)
    pub fn day_count(&self) -> i64 {
        if self.is_valid() {
            (self.end - self.start).num_days() + 1
        } else {
            0
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parse a calendar day from a date or timestamp string
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, naive datetimes and
/// RFC 3339 timestamps (reduced to their UTC day).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    None
}

fn required_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

fn rating_scale<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    bounded(deserializer, 1, 5, "rating")
}

fn severity_scale<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    bounded(deserializer, 1, 10, "severity")
}

fn bounded<'de, D>(deserializer: D, min: u8, max: u8, what: &str) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u8::deserialize(deserializer)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "{} out of range {}-{}: {}",
            what, min, max, value
        )))
    }
}

fn optional_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_day))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite()))
}

//! Lifestyle factors compared between symptom and symptom-free days

use crate::records::{HealthMetricRecord, JournalEntry, MetricKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric factor that can be averaged over a day-set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Hours slept (metric records)
    SleepDuration,
    /// Step count (metric records)
    Activity,
    /// Resting heart rate (metric records)
    RestingHeartRate,
    /// Active calories (metric records)
    ActiveCalories,
    /// Self-reported mood, 1-5 (journal entries)
    Mood,
    /// Self-reported energy, 1-5 (journal entries)
    Energy,
}

impl Factor {
    /// Default factors, in comparison construction order
    pub fn defaults() -> Vec<Factor> {
        vec![
            Factor::SleepDuration,
            Factor::Activity,
            Factor::RestingHeartRate,
            Factor::ActiveCalories,
            Factor::Mood,
            Factor::Energy,
        ]
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            Factor::SleepDuration => "Sleep Duration",
            Factor::Activity => "Physical Activity",
            Factor::RestingHeartRate => "Resting Heart Rate",
            Factor::ActiveCalories => "Active Calories",
            Factor::Mood => "Mood",
            Factor::Energy => "Energy",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self.metric_kind() {
            Some(kind) => kind.unit(),
            None => "/5",
        }
    }

    /// Metric kind backing this factor; `None` for journal-derived factors
    pub fn metric_kind(&self) -> Option<MetricKind> {
        match self {
            Factor::SleepDuration => Some(MetricKind::SleepDurationHours),
            Factor::Activity => Some(MetricKind::StepCount),
            Factor::RestingHeartRate => Some(MetricKind::RestingHeartRate),
            Factor::ActiveCalories => Some(MetricKind::ActiveCalories),
            Factor::Mood | Factor::Energy => None,
        }
    }

    /// Sleep, activity and the journal scores are always compared. Heart rate
    /// and calories only when the input carries at least one such record.
    pub fn always_reported(&self) -> bool {
        !matches!(self, Factor::RestingHeartRate | Factor::ActiveCalories)
    }

    /// Read this factor off a journal entry
    pub fn journal_value(&self, entry: &JournalEntry) -> Option<f64> {
        match self {
            Factor::Mood => Some(f64::from(entry.mood)),
            Factor::Energy => Some(f64::from(entry.energy)),
            _ => None,
        }
    }

    /// Read this factor off a metric record
    pub fn metric_value(&self, record: &HealthMetricRecord) -> Option<f64> {
        match self.metric_kind() {
            Some(kind) if record.kind == kind => record.value,
            _ => None,
        }
    }

    /// Day of a metric record, used together with [`Factor::metric_value`]
    pub fn metric_day(record: &HealthMetricRecord) -> Option<NaiveDate> {
        record.date
    }

    /// Format a value with this factor's unit
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Factor::Activity | Factor::ActiveCalories => format!("{:.0} {}", value, self.unit()),
            Factor::Mood | Factor::Energy => format!("{:.1}{}", value, self.unit()),
            _ => format!("{:.1} {}", value, self.unit()),
        }
    }

    /// Factors a reader would associate with this comparison
    pub fn related_factors(&self) -> Vec<String> {
        let related: &[&str] = match self {
            Factor::SleepDuration => &["Sleep"],
            Factor::Activity => &["Physical activity", "Sedentary behavior"],
            Factor::RestingHeartRate => &["Heart rate", "Stress"],
            Factor::ActiveCalories => &["Physical activity"],
            Factor::Mood => &["Mood"],
            Factor::Energy => &["Energy", "Fatigue"],
        };
        related.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "sleep" | "sleep_duration" => Ok(Factor::SleepDuration),
            "activity" | "steps" | "physical_activity" => Ok(Factor::Activity),
            "resting_heart_rate" | "heart_rate" => Ok(Factor::RestingHeartRate),
            "active_calories" | "calories" => Ok(Factor::ActiveCalories),
            "mood" => Ok(Factor::Mood),
            "energy" => Ok(Factor::Energy),
            other => Err(format!("unknown factor: {}", other)),
        }
    }
}

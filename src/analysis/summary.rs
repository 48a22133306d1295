//! Period health summary
//!
//! Whole-period averages and symptom statistics, used for weekly summaries
//! and doctor-visit preparation.

use super::aggregate::{mean, round_half_up};
use super::error::AnalysisError;
use super::tags::tag_frequency;
use crate::records::{DateRange, HealthMetricRecord, JournalEntry, MetricKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How often a symptom was reported and how bad it was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomStats {
    pub name: String,
    pub occurrences: usize,
    /// Mean severity, one decimal
    pub average_severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub range: DateRange,
    pub entries: usize,
    pub mood_average: f64,
    pub energy_average: f64,
    /// Most frequent first
    pub symptoms: Vec<SymptomStats>,
    pub sleep_average: f64,
    pub steps_average: f64,
    pub resting_heart_rate_average: f64,
    pub tag_frequency: BTreeMap<String, usize>,
}

/// Summarize entries and records inside `range`
pub fn summarize(
    range: DateRange,
    entries: &[JournalEntry],
    records: &[HealthMetricRecord],
) -> Result<HealthSummary, AnalysisError> {
    if !range.is_valid() {
        return Err(AnalysisError::inverted_range(range.start, range.end));
    }

    let entries: Vec<&JournalEntry> = entries.iter().filter(|e| range.contains(e.date)).collect();
    let records: Vec<&HealthMetricRecord> = records
        .iter()
        .filter(|r| r.date.map(|d| range.contains(d)).unwrap_or(false))
        .collect();

    let metric_average = |kind: MetricKind| {
        let values: Vec<f64> = records
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.value)
            .collect();
        rounded_mean(&values)
    };

    let moods: Vec<f64> = entries.iter().map(|e| f64::from(e.mood)).collect();
    let energies: Vec<f64> = entries.iter().map(|e| f64::from(e.energy)).collect();

    Ok(HealthSummary {
        range,
        entries: entries.len(),
        mood_average: rounded_mean(&moods),
        energy_average: rounded_mean(&energies),
        symptoms: symptom_stats(entries.iter().copied()),
        sleep_average: metric_average(MetricKind::SleepDurationHours),
        steps_average: metric_average(MetricKind::StepCount),
        resting_heart_rate_average: metric_average(MetricKind::RestingHeartRate),
        tag_frequency: tag_frequency(entries.iter().copied()),
    })
}

/// Occurrences and mean severity per symptom name
///
/// Sorted by occurrences descending, then name.
pub fn symptom_stats<'a, I>(entries: I) -> Vec<SymptomStats>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let mut totals: HashMap<&str, (usize, u32)> = HashMap::new();
    for entry in entries {
        for symptom in &entry.symptoms {
            let slot = totals.entry(symptom.name.as_str()).or_insert((0, 0));
            slot.0 += 1;
            slot.1 += u32::from(symptom.severity);
        }
    }

    let mut stats: Vec<SymptomStats> = totals
        .into_iter()
        .map(|(name, (occurrences, severity))| SymptomStats {
            name: name.to_string(),
            occurrences,
            average_severity: round_half_up(f64::from(severity) / occurrences as f64, 1),
        })
        .collect();

    stats.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then_with(|| a.name.cmp(&b.name)));
    stats
}

/// Distinct symptom names in the order they first appear
pub fn available_symptoms(entries: &[JournalEntry]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for symptom in entries.iter().flat_map(|e| &e.symptoms) {
        if !names.iter().any(|n| n == &symptom.name) {
            names.push(symptom.name.clone());
        }
    }
    names
}

fn rounded_mean(values: &[f64]) -> f64 {
    mean(values).map(|m| round_half_up(m, 1)).unwrap_or(0.0)
}

impl HealthSummary {
    /// Tags by count descending, then name
    pub fn top_tags(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut tags: Vec<(&str, usize)> = self
            .tag_frequency
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.truncate(limit);
        tags
    }

    /// Deterministic prompt for a period narrative
    pub fn to_prompt(&self) -> String {
        let mut lines = vec![
            format!("Summarize the following health journal period from {}.", self.range),
            String::new(),
            format!("Entries: {}", self.entries),
            format!("Average mood: {:.1}/5", self.mood_average),
            format!("Average energy: {:.1}/5", self.energy_average),
            format!("Average sleep: {:.1} hours", self.sleep_average),
            format!("Average steps: {:.0}", self.steps_average),
            format!("Average resting heart rate: {:.1} bpm", self.resting_heart_rate_average),
            String::new(),
            "Symptoms reported:".to_string(),
        ];

        if self.symptoms.is_empty() {
            lines.push("- none".to_string());
        }
        for s in &self.symptoms {
            lines.push(format!(
                "- {}: {} occurrences (avg. severity {:.1}/10)",
                s.name, s.occurrences, s.average_severity
            ));
        }

        let tags: Vec<String> = self
            .top_tags(5)
            .into_iter()
            .map(|(tag, count)| format!("{} ({})", tag, count))
            .collect();
        lines.push(String::new());
        lines.push(format!(
            "Most frequent tags: {}",
            if tags.is_empty() { "none".to_string() } else { tags.join(", ") }
        ));

        lines.push(String::new());
        lines.push(
            "Based on this data, provide a concise summary of patterns observed and any notable \
             trends. Describe correlations only, not causes. Use simple, non-clinical language."
                .to_string(),
        );

        lines.join("\n")
    }
}

//! Doctor-visit preparation
//!
//! Turns a period of journal data into something to bring to an
//! appointment: the symptoms reported, the patterns worth mentioning and a
//! list of questions. Patterns come from period averages and from the
//! correlation analysis of the most frequent symptom.

use super::builder::{AnalysisResult, CorrelationAnalyzer};
use super::error::AnalysisError;
use super::insights::OVERALL_PATTERNS;
use super::ranking::Strength;
use super::summary::{summarize, HealthSummary, SymptomStats};
use crate::records::{DateRange, HealthMetricRecord, JournalEntry};
use serde::{Deserialize, Serialize};

/// Pattern used when nothing stands out
pub const NO_CLEAR_PATTERNS: &str =
    "No clear patterns have emerged from the current data. Continue tracking for better insights.";

/// Average nightly sleep below this is called out
pub const SHORT_SLEEP_HOURS: f64 = 7.0;

/// Average daily steps below this are called out as low activity
pub const LOW_ACTIVITY_STEPS: f64 = 5000.0;

/// Average daily steps at or above this are called out as high activity
pub const HIGH_ACTIVITY_STEPS: f64 = 7000.0;

/// Correlation insights carried over from the top symptom's analysis
const MAX_SYMPTOM_PATTERNS: usize = 3;

/// Questions asked for every visit, before the symptom-specific one
const STANDARD_QUESTIONS: [&str; 3] = [
    "Could my symptoms be related to my sleep patterns?",
    "Are there specific lifestyle changes you'd recommend based on these patterns?",
    "Should I be concerned about the frequency of these symptoms?",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorVisitSummary {
    pub range: DateRange,
    /// Most frequent first
    pub key_symptoms: Vec<SymptomStats>,
    pub overall_patterns: Vec<String>,
    pub questions: Vec<String>,
}

impl DoctorVisitSummary {
    /// Build from a period summary and, optionally, the analysis of its most
    /// frequent symptom
    pub fn from_summary(summary: &HealthSummary, top_symptom: Option<&AnalysisResult>) -> Self {
        let mut overall_patterns = Vec::new();

        // Period observations only matter once something was reported
        if let Some(top) = summary.symptoms.first() {
            if let Some(result) = top_symptom {
                overall_patterns.extend(
                    result
                        .insights
                        .iter()
                        .filter(|i| i.factor != OVERALL_PATTERNS && i.strength != Strength::Weak)
                        .take(MAX_SYMPTOM_PATTERNS)
                        .map(|i| i.description.clone()),
                );
            }
            overall_patterns.extend(period_patterns(summary, &top.name));
        }

        if overall_patterns.is_empty() {
            overall_patterns.push(NO_CLEAR_PATTERNS.to_string());
        }

        let mut questions: Vec<String> = STANDARD_QUESTIONS.iter().map(|q| q.to_string()).collect();
        if let Some(top) = summary.symptoms.first() {
            questions.push(format!(
                "What might be causing my {} and how can I manage it better?",
                top.name.to_lowercase()
            ));
        }

        Self {
            range: summary.range,
            key_symptoms: summary.symptoms.clone(),
            overall_patterns,
            questions,
        }
    }

    /// Append a question; blank and repeated questions are ignored
    pub fn add_question(&mut self, question: &str) -> bool {
        let question = question.trim();
        if question.is_empty() || self.questions.iter().any(|q| q == question) {
            return false;
        }
        self.questions.push(question.to_string());
        true
    }

    /// Plain-text version for printing or sharing
    pub fn to_shareable_text(&self) -> String {
        let mut text = format!("Health Summary: {} - {}\n\n", self.range.start, self.range.end);

        text.push_str("Key Symptoms Reported:\n");
        if self.key_symptoms.is_empty() {
            text.push_str("- none\n");
        }
        for s in &self.key_symptoms {
            text.push_str(&format!(
                "- {}: {} occurrences (avg. severity {:.1}/10)\n",
                s.name, s.occurrences, s.average_severity
            ));
        }

        text.push_str("\nOverall Patterns:\n");
        for pattern in &self.overall_patterns {
            text.push_str(&format!("- {}\n", pattern));
        }

        text.push_str("\nQuestions for Doctor:\n");
        for question in &self.questions {
            text.push_str(&format!("- {}\n", question));
        }

        text
    }
}

/// Summarize `range` and analyze its most frequent symptom
pub fn prepare_doctor_visit(
    analyzer: &CorrelationAnalyzer,
    range: DateRange,
    entries: &[JournalEntry],
    records: &[HealthMetricRecord],
) -> Result<DoctorVisitSummary, AnalysisError> {
    let summary = summarize(range, entries, records)?;

    let top_symptom = match summary.symptoms.first() {
        Some(top) => Some(analyzer.build(&top.name, range, entries, records)?),
        None => None,
    };

    tracing::debug!(
        range = %range,
        symptoms = summary.symptoms.len(),
        top_symptom = top_symptom.as_ref().map(|r| r.symptom.as_str()).unwrap_or("none"),
        "Prepared doctor visit summary"
    );

    Ok(DoctorVisitSummary::from_summary(&summary, top_symptom.as_ref()))
}

// Period averages of 0 mean no records and are never called out
fn period_patterns(summary: &HealthSummary, top_symptom: &str) -> Vec<String> {
    let mut patterns = Vec::new();

    if summary.sleep_average > 0.0 && summary.sleep_average < SHORT_SLEEP_HOURS {
        patterns.push(format!(
            "{} was reported in a period averaging {:.1} hours of sleep, under {:.0} hours.",
            top_symptom, summary.sleep_average, SHORT_SLEEP_HOURS
        ));
    }

    if summary.steps_average > 0.0 {
        if summary.steps_average < LOW_ACTIVITY_STEPS {
            patterns.push(format!(
                "Activity was low, averaging {:.0} steps a day (under {:.0}).",
                summary.steps_average, LOW_ACTIVITY_STEPS
            ));
        } else if summary.steps_average >= HIGH_ACTIVITY_STEPS {
            patterns.push(format!(
                "Activity was high, averaging {:.0} steps a day.",
                summary.steps_average
            ));
        }
    }

    if let Some((tag, count)) = summary.top_tags(1).into_iter().next() {
        patterns.push(format!(
            "The tag #{} appears in {} of {} entries.",
            tag, count, summary.entries
        ));
    }

    patterns
}

//! Narrative-Input Formatter
//!
//! Reduces an [`AnalysisResult`] to the plain facts a text generator needs,
//! and renders them as a deterministic prompt. Nothing here calls a
//! generator.

use super::builder::AnalysisResult;
use super::factor::Factor;
use super::ranking::{Strength, Subject};
use crate::records::DateRange;
use serde::{Deserialize, Serialize};

/// Default number of tags carried into the prompt
pub const DEFAULT_TOP_TAGS: usize = 5;

/// Per-factor averages on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    pub factor: Factor,
    pub with_symptom: f64,
    pub without_symptom: f64,
    pub difference: f64,
    pub strength: Strength,
}

/// Share of entries carrying a tag on both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: String,
    pub symptom_day_percent: u32,
    pub symptom_free_day_percent: u32,
}

/// Input contract for an external narrative generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeInput {
    pub symptom: String,
    pub period: DateRange,
    pub symptom_days: usize,
    pub symptom_free_days: usize,
    pub occurrence_percentage: u32,
    /// Factors in ranked order
    pub factors: Vec<FactorSummary>,
    /// Tags with the largest difference between sides
    pub top_tags: Vec<TagSummary>,
}

impl NarrativeInput {
    pub fn from_result(result: &AnalysisResult, top_tags: usize) -> Self {
        let mut factors = Vec::new();
        let mut tags = Vec::new();

        for comparison in &result.comparisons {
            match &comparison.subject {
                Subject::Metric { factor } => factors.push(FactorSummary {
                    factor: *factor,
                    with_symptom: comparison.with_symptom,
                    without_symptom: comparison.without_symptom,
                    difference: comparison.difference,
                    strength: comparison.strength,
                }),
                Subject::Tag { tag } if tags.len() < top_tags => tags.push(TagSummary {
                    tag: tag.clone(),
                    symptom_day_percent: comparison.with_symptom as u32,
                    symptom_free_day_percent: comparison.without_symptom as u32,
                }),
                Subject::Tag { .. } => {}
            }
        }

        Self {
            symptom: result.symptom.clone(),
            period: result.range,
            symptom_days: result.symptom_days_count,
            symptom_free_days: result.symptom_free_days_count,
            occurrence_percentage: result.occurrence_percentage,
            factors,
            top_tags: tags,
        }
    }

    /// Render the prompt text. Same input, same text.
    pub fn to_prompt(&self) -> String {
        let symptom = &self.symptom;
        let mut lines = vec![
            format!(
                "Analyze the following comparison of days with and without '{}' from {}.",
                symptom, self.period
            ),
            String::new(),
            format!(
                "Days with {}: {} ({}% of journaled days)",
                symptom, self.symptom_days, self.occurrence_percentage
            ),
            format!("Days without {}: {}", symptom, self.symptom_free_days),
        ];

        if self.symptom_days == 0 {
            lines.push(format!("No days with {} were recorded in this period.", symptom));
        }

        lines.push(String::new());
        lines.push(format!(
            "Averages (with {} / without {} / difference):",
            symptom, symptom
        ));
        for f in &self.factors {
            lines.push(format!(
                "- {}: {} / {} / {:+.1} ({})",
                f.factor.label(),
                f.factor.format_value(f.with_symptom),
                f.factor.format_value(f.without_symptom),
                f.difference,
                f.strength
            ));
        }

        lines.push(String::new());
        lines.push("Tags (share of entries with / without):".to_string());
        if self.top_tags.is_empty() {
            lines.push("- none".to_string());
        }
        for t in &self.top_tags {
            lines.push(format!(
                "- #{}: {}% / {}%",
                t.tag, t.symptom_day_percent, t.symptom_free_day_percent
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Based on this data, identify up to 3 patterns related to '{}'. For each pattern, \
             describe the correlation, estimate its strength, and list related factors. \
             These are correlations, not causes. Use simple, non-clinical language.",
            symptom
        ));

        lines.join("\n")
    }
}

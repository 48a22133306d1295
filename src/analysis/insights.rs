//! Written pattern insights
//!
//! Rule-based sentences derived from ranked comparisons. These describe
//! correlations only and never claim a cause.

use super::factor::Factor;
use super::ranking::{Comparison, Strength, Subject};
use serde::{Deserialize, Serialize};

/// Factor name used when no comparison produced an insight
pub const OVERALL_PATTERNS: &str = "Overall Patterns";

/// A single human-readable observation about a symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInsight {
    /// Factor or tag label the insight is about
    pub factor: String,
    pub description: String,
    /// [0,1] magnitude of the underlying comparison
    pub correlation_strength: f64,
    pub strength: Strength,
    pub related_factors: Vec<String>,
}

/// One insight per comparison with a non-zero difference, in ranked order
///
/// Comparisons where one side had no data never produce an insight. When
/// nothing differs, a single "Overall Patterns" insight explains that no
/// pattern has emerged yet.
pub fn build_insights(symptom: &str, ranked: &[Comparison]) -> Vec<PatternInsight> {
    let mut insights: Vec<PatternInsight> = ranked
        .iter()
        .filter(|c| c.both_sides_observed && c.difference != 0.0)
        .map(|c| describe(symptom, c))
        .collect();

    if insights.is_empty() {
        insights.push(PatternInsight {
            factor: OVERALL_PATTERNS.to_string(),
            description: format!(
                "Based on the available data, no strong patterns have emerged yet \
                 relating to your {}. Continue tracking to gather more data for better insights.",
                display_symptom(symptom)
            ),
            correlation_strength: 0.0,
            strength: Strength::Weak,
            related_factors: Vec::new(),
        });
    }

    insights
}

fn describe(symptom: &str, comparison: &Comparison) -> PatternInsight {
    let (description, related_factors) = match &comparison.subject {
        Subject::Metric { factor } => (
            describe_metric(symptom, *factor, comparison.difference),
            factor.related_factors(),
        ),
        Subject::Tag { tag } => (
            format!(
                "The tag #{} appears on {:.0}% of {} days vs {:.0}% of symptom-free days.",
                tag, comparison.with_symptom, symptom, comparison.without_symptom
            ),
            vec![tag.clone()],
        ),
    };

    PatternInsight {
        factor: comparison.label.clone(),
        description,
        correlation_strength: comparison.score,
        strength: comparison.strength,
        related_factors,
    }
}

// `difference` is `without - with`: positive means symptom days had less
fn describe_metric(symptom: &str, factor: Factor, difference: f64) -> String {
    let less = difference > 0.0;
    let amount = difference.abs();

    match factor {
        Factor::SleepDuration => format!(
            "On days with {}, you slept {:.1} hours {} on average than on symptom-free days. \
             This suggests a possible connection between your sleep and {} frequency.",
            symptom,
            amount,
            if less { "less" } else { "more" },
            display_symptom(symptom)
        ),
        Factor::Activity => format!(
            "Your step count was {:.0} steps {} on days with {} compared to symptom-free days. \
             This might point to a relationship between your activity level and {}.",
            amount,
            if less { "fewer" } else { "more" },
            symptom,
            display_symptom(symptom)
        ),
        Factor::RestingHeartRate => format!(
            "Your resting heart rate was {:.1} bpm {} on days with {} than on symptom-free days.",
            amount,
            if less { "lower" } else { "higher" },
            symptom
        ),
        Factor::ActiveCalories => format!(
            "You burned {:.0} {} active calories on days with {} than on symptom-free days.",
            amount,
            if less { "fewer" } else { "more" },
            symptom
        ),
        Factor::Mood | Factor::Energy => format!(
            "Your {} averaged {:.1} points {} on days with {} than on symptom-free days.",
            factor.label().to_lowercase(),
            amount,
            if less { "lower" } else { "higher" },
            symptom
        ),
    }
}

fn display_symptom(symptom: &str) -> String {
    if symptom.is_empty() {
        "symptoms".to_string()
    } else {
        symptom.to_lowercase()
    }
}

//! Correlation Ranker
//!
//! A [`Comparison`] is one factor or tag measured on symptom days and on
//! symptom-free days. Ranking orders comparisons by the magnitude of their
//! difference; the separate [0,1] score drives the strength label.

use super::aggregate::round_half_up;
use super::factor::Factor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Correlation strength bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    /// Bucket a [0,1] magnitude: `[0, 0.3)` weak, `[0.3, 0.7)` moderate,
    /// `[0.7, 1]` strong
    pub fn classify(magnitude: f64) -> Self {
        if magnitude >= 0.7 {
            Strength::Strong
        } else if magnitude >= 0.3 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Weak => write!(f, "weak"),
            Strength::Moderate => write!(f, "moderate"),
            Strength::Strong => write!(f, "strong"),
        }
    }
}

/// What a comparison measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    /// A numeric factor averaged per day-set
    Metric { factor: Factor },
    /// A tag's share of entries per day-set, in percent
    Tag { tag: String },
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub subject: Subject,
    /// Display name, e.g. "Sleep Duration" or "#stress"
    pub label: String,
    pub unit: String,
    /// Value on symptom days
    pub with_symptom: f64,
    /// Value on symptom-free days
    pub without_symptom: f64,
    /// Signed difference. Metrics: `without - with`; tags: `with - without`.
    pub difference: f64,
    /// Magnitude scaled to [0,1]
    pub score: f64,
    pub strength: Strength,
    /// False when one side had no data and its value is the 0 placeholder
    #[serde(default = "observed")]
    pub both_sides_observed: bool,
}

fn observed() -> bool {
    true
}

impl Comparison {
    /// Compare a factor's averages; positive difference means symptom-free
    /// days had more of it
    pub fn metric(factor: Factor, with_symptom: f64, without_symptom: f64) -> Self {
        let difference = round_half_up(without_symptom - with_symptom, 1);
        let largest = with_symptom.abs().max(without_symptom.abs());
        let score = if largest == 0.0 {
            0.0
        } else {
            (with_symptom - without_symptom).abs() / largest
        };

        Self::assemble(
            Subject::Metric { factor },
            factor.label().to_string(),
            factor.unit().to_string(),
            with_symptom,
            without_symptom,
            difference,
            score,
        )
    }

    /// Compare a tag's percentages; positive difference means the tag is
    /// more common on symptom days
    pub fn tag(tag: impl Into<String>, with_percent: u32, without_percent: u32) -> Self {
        let tag = tag.into();
        let difference = f64::from(with_percent) - f64::from(without_percent);

        Self::assemble(
            Subject::Tag { tag: tag.clone() },
            format!("#{}", tag),
            "%".to_string(),
            f64::from(with_percent),
            f64::from(without_percent),
            difference,
            difference.abs() / 100.0,
        )
    }

    fn assemble(
        subject: Subject,
        label: String,
        unit: String,
        with_symptom: f64,
        without_symptom: f64,
        difference: f64,
        score: f64,
    ) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            subject,
            label,
            unit,
            with_symptom,
            without_symptom,
            difference,
            score,
            strength: Strength::classify(score),
            both_sides_observed: true,
        }
    }

    /// Mark that one side had nothing to average
    ///
    /// The values and difference are kept for display, but the comparison
    /// carries no strength and never becomes an insight.
    pub fn one_sided(mut self) -> Self {
        self.both_sides_observed = false;
        self.score = 0.0;
        self.strength = Strength::Weak;
        self
    }

    pub fn factor(&self) -> Option<Factor> {
        match &self.subject {
            Subject::Metric { factor } => Some(*factor),
            Subject::Tag { .. } => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match &self.subject {
            Subject::Tag { tag } => Some(tag),
            Subject::Metric { .. } => None,
        }
    }
}

/// Order by `|difference|`, largest first
///
/// The sort is stable: equal magnitudes keep construction order. Nothing is
/// filtered out, zero differences included.
pub fn rank(mut comparisons: Vec<Comparison>) -> Vec<Comparison> {
    comparisons.sort_by(|a, b| by_magnitude(b.difference, a.difference));
    comparisons
}

pub(crate) fn by_magnitude(a: f64, b: f64) -> Ordering {
    a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(Strength::classify(0.0), Strength::Weak);
        assert_eq!(Strength::classify(0.29), Strength::Weak);
        assert_eq!(Strength::classify(0.3), Strength::Moderate);
        assert_eq!(Strength::classify(0.69), Strength::Moderate);
        assert_eq!(Strength::classify(0.7), Strength::Strong);
        assert_eq!(Strength::classify(1.0), Strength::Strong);
    }

    #[test]
    fn test_rank_by_magnitude() {
        let comparisons = vec![
            Comparison::metric(Factor::SleepDuration, 5.0, 6.2),
            Comparison::metric(Factor::Mood, 3.3, 3.0),
            Comparison::metric(Factor::Energy, 5.0, 1.0),
        ];

        let ranked = rank(comparisons);
        let magnitudes: Vec<f64> = ranked.iter().map(|c| c.difference.abs()).collect();
        assert_eq!(magnitudes, vec![4.0, 1.2, 0.3]);
    }

    #[test]
    fn test_rank_is_stable() {
        let comparisons = vec![
            Comparison::tag("a", 50, 0),
            Comparison::metric(Factor::Mood, 3.0, 3.0),
            Comparison::tag("b", 0, 50),
            Comparison::metric(Factor::Energy, 3.0, 3.0),
        ];

        let ranked = rank(comparisons);
        let labels: Vec<&str> = ranked.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["#a", "#b", "Mood", "Energy"]);
    }

    #[test]
    fn test_metric_comparison() {
        let c = Comparison::metric(Factor::SleepDuration, 5.8, 6.8);
        assert_eq!(c.difference, 1.0);
        assert_eq!(c.factor(), Some(Factor::SleepDuration));
        assert!(c.score > 0.14 && c.score < 0.15);
        assert_eq!(c.strength, Strength::Weak);

        let zero = Comparison::metric(Factor::RestingHeartRate, 0.0, 0.0);
        assert_eq!(zero.score, 0.0);
        assert_eq!(zero.difference, 0.0);

        let measured = Comparison::metric(Factor::Activity, 0.0, 7600.0);
        assert_eq!(measured.score, 1.0);
        assert_eq!(measured.strength, Strength::Strong);
        assert!(measured.both_sides_observed);
    }

    #[test]
    fn test_one_sided_comparison_has_no_strength() {
        let c = Comparison::metric(Factor::Activity, 0.0, 7600.0).one_sided();
        assert_eq!(c.difference, 7600.0);
        assert_eq!(c.score, 0.0);
        assert_eq!(c.strength, Strength::Weak);
        assert!(!c.both_sides_observed);

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["both_sides_observed"], false);
    }

    #[test]
    fn test_tag_comparison() {
        let c = Comparison::tag("stress", 50, 0);
        assert_eq!(c.difference, 50.0);
        assert_eq!(c.score, 0.5);
        assert_eq!(c.strength, Strength::Moderate);
        assert_eq!(c.tag_name(), Some("stress"));
        assert_eq!(c.label, "#stress");

        let c = Comparison::tag("exercise", 0, 75);
        assert_eq!(c.difference, -75.0);
        assert_eq!(c.strength, Strength::Strong);
    }

    #[test]
    fn test_subject_serialization() {
        let c = Comparison::tag("stress", 40, 20);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["subject"]["kind"], "tag");
        assert_eq!(json["subject"]["tag"], "stress");
        assert_eq!(json["strength"], "weak");

        let c = Comparison::metric(Factor::Activity, 4000.0, 7600.0);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["subject"]["kind"], "metric");
        assert_eq!(json["subject"]["factor"], "activity");
    }
}

//! Analysis Result Builder
//!
//! Runs the whole pipeline for one symptom over one date range:
//! partition, aggregate every factor on both sides, compare tag
//! frequencies, rank, and attach written insights.

use super::aggregate::aggregate_for_days;
use super::error::AnalysisError;
use super::factor::Factor;
use super::insights::{build_insights, PatternInsight};
use super::partition::{partition, DayPolicy, DaySet};
use super::ranking::{rank, Comparison, Subject};
use super::tags::{percentage, tag_comparisons, tag_frequency};
use crate::records::{DateRange, HealthMetricRecord, JournalEntry, RecordSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Knobs for a [`CorrelationAnalyzer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub day_policy: DayPolicy,
    /// Factors to compare, in construction order
    #[serde(default = "Factor::defaults")]
    pub factors: Vec<Factor>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            day_policy: DayPolicy::default(),
            factors: Factor::defaults(),
        }
    }
}

/// Everything computed for one symptom over one range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symptom: String,
    pub range: DateRange,
    pub day_policy: DayPolicy,
    pub symptom_days_count: usize,
    pub symptom_free_days_count: usize,
    /// Share of classified days that are symptom days, in percent
    pub occurrence_percentage: u32,
    pub symptom_days: DaySet,
    pub symptom_free_days: DaySet,
    /// Journal entries inside the range
    pub entry_count: usize,
    /// Metric records inside the range
    pub metric_record_count: usize,
    /// Ranked comparisons, largest `|difference|` first
    pub comparisons: Vec<Comparison>,
    /// Tag counts over symptom-day entries
    pub symptom_day_tags: BTreeMap<String, usize>,
    /// Tag counts over symptom-free-day entries
    pub symptom_free_day_tags: BTreeMap<String, usize>,
    pub insights: Vec<PatternInsight>,
}

impl AnalysisResult {
    /// Comparison for a numeric factor, if it was computed
    pub fn comparison(&self, factor: Factor) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.factor() == Some(factor))
    }

    /// Comparison for a tag, if the tag was seen
    pub fn tag_comparison(&self, tag: &str) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.tag_name() == Some(tag))
    }

    pub fn metric_comparisons(&self) -> impl Iterator<Item = &Comparison> {
        self.comparisons
            .iter()
            .filter(|c| matches!(c.subject, Subject::Metric { .. }))
    }

    /// False when the symptom never occurred in the range
    pub fn has_symptom_days(&self) -> bool {
        self.symptom_days_count > 0
    }
}

/// Builds [`AnalysisResult`]s
///
/// Stateless apart from its options; one analyzer can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct CorrelationAnalyzer {
    options: AnalysisOptions,
}

impl CorrelationAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Builder: set the same-day classification policy
    pub fn day_policy(mut self, policy: DayPolicy) -> Self {
        self.options.day_policy = policy;
        self
    }

    /// Builder: replace the compared factors
    pub fn factors(mut self, factors: Vec<Factor>) -> Self {
        self.options.factors = factors;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze `symptom` over `range`
    ///
    /// Entries and records outside the range are ignored. An inverted range is
    /// the only error; an unknown symptom or empty input yields a result with
    /// zero counts and zero averages.
    pub fn build(
        &self,
        symptom: &str,
        range: DateRange,
        entries: &[JournalEntry],
        records: &[HealthMetricRecord],
    ) -> Result<AnalysisResult, AnalysisError> {
        if !range.is_valid() {
            return Err(AnalysisError::inverted_range(range.start, range.end));
        }

        let entries: Vec<&JournalEntry> =
            entries.iter().filter(|e| range.contains(e.date)).collect();
        let records: Vec<&HealthMetricRecord> = records
            .iter()
            .filter(|r| r.date.map(|d| range.contains(d)).unwrap_or(false))
            .collect();

        let split = partition(entries.iter().copied(), symptom, self.options.day_policy);

        let mut metric_comparisons = Vec::new();
        for factor in &self.options.factors {
            if !self.is_reported(*factor, &records) {
                continue;
            }

            let (with, without) = match factor.metric_kind() {
                Some(_) => {
                    let value = |r: &&HealthMetricRecord| factor.metric_value(r);
                    (
                        aggregate_for_days(&split.with_symptom, &records, |r| r.date, value),
                        aggregate_for_days(&split.without_symptom, &records, |r| r.date, value),
                    )
                }
                None => {
                    let day = |e: &&JournalEntry| Some(e.date);
                    let value = |e: &&JournalEntry| factor.journal_value(e);
                    (
                        aggregate_for_days(&split.with_symptom, &entries, day, value),
                        aggregate_for_days(&split.without_symptom, &entries, day, value),
                    )
                }
            };

            let comparison = Comparison::metric(*factor, with.value, without.value);
            metric_comparisons.push(if with.has_data() && without.has_data() {
                comparison
            } else {
                comparison.one_sided()
            });
        }

        // Metric comparisons first, then tags already ordered among themselves
        let mut comparisons = metric_comparisons;
        comparisons.extend(tag_comparisons(&split.symptom_entries, &split.symptom_free_entries));
        let comparisons = rank(comparisons);

        let symptom_days_count = split.with_symptom.len();
        let symptom_free_days_count = split.without_symptom.len();

        let insights = build_insights(symptom, &comparisons);

        tracing::debug!(
            symptom = %symptom,
            range = %range,
            entries = entries.len(),
            records = records.len(),
            comparisons = comparisons.len(),
            "Built analysis"
        );

        Ok(AnalysisResult {
            symptom: symptom.to_string(),
            range,
            day_policy: self.options.day_policy,
            symptom_days_count,
            symptom_free_days_count,
            occurrence_percentage: percentage(
                symptom_days_count,
                symptom_days_count + symptom_free_days_count,
            ),
            symptom_day_tags: tag_frequency(split.symptom_entries.iter().copied()),
            symptom_free_day_tags: tag_frequency(split.symptom_free_entries.iter().copied()),
            symptom_days: split.with_symptom,
            symptom_free_days: split.without_symptom,
            entry_count: entries.len(),
            metric_record_count: records.len(),
            comparisons,
            insights,
        })
    }

    /// Analyze using records fetched from a [`RecordSource`]
    pub fn build_from<S: RecordSource + ?Sized>(
        &self,
        source: &S,
        symptom: &str,
        range: DateRange,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !range.is_valid() {
            return Err(AnalysisError::inverted_range(range.start, range.end));
        }

        let entries = source.journal_entries(&range);
        let records = source.metric_records(&range);
        self.build(symptom, range, &entries, &records)
    }

    fn is_reported(&self, factor: Factor, records: &[&HealthMetricRecord]) -> bool {
        if factor.always_reported() {
            return true;
        }
        match factor.metric_kind() {
            Some(kind) => records.iter().any(|r| r.kind == kind && r.value.is_some()),
            None => true,
        }
    }
}

/// Analyze with default options
pub fn analyze(
    symptom: &str,
    range: DateRange,
    entries: &[JournalEntry],
    records: &[HealthMetricRecord],
) -> Result<AnalysisResult, AnalysisError> {
    CorrelationAnalyzer::default().build(symptom, range, entries, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ranking::Strength;
    use crate::records::{MetricKind, RecordStore};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn fixture_range() -> DateRange {
        DateRange::new(day(25), day(29))
    }

    /// Five days, headache on the first and last
    fn fixture() -> (Vec<JournalEntry>, Vec<HealthMetricRecord>) {
        let entries = vec![
            JournalEntry::new(day(25), 2, 2).symptom("Headache", 6).tag("stress"),
            JournalEntry::new(day(26), 4, 4).tag("exercise"),
            JournalEntry::new(day(27), 4, 3),
            JournalEntry::new(day(28), 3, 4).tag("exercise"),
            JournalEntry::new(day(29), 3, 2).symptom("Headache", 7).tag("stress"),
        ];

        let sleep = [5.5, 6.5, 7.2, 6.8, 6.1];
        let steps = [4200.0, 6500.0, 9100.0, 7200.0, 3800.0];
        let mut records = Vec::new();
        for (i, (s, st)) in sleep.iter().zip(steps.iter()).enumerate() {
            let date = day(25 + i as u32);
            records.push(HealthMetricRecord::new(date, MetricKind::SleepDurationHours, *s));
            records.push(HealthMetricRecord::new(date, MetricKind::StepCount, *st));
        }

        (entries, records)
    }

    #[test]
    fn test_end_to_end_fixture() {
        let (entries, records) = fixture();
        let result = analyze("Headache", fixture_range(), &entries, &records).unwrap();

        assert_eq!(result.symptom_days_count, 2);
        assert_eq!(result.symptom_free_days_count, 3);
        assert_eq!(result.occurrence_percentage, 40);
        assert_eq!(result.symptom_days.keys(), vec!["2025-03-25", "2025-03-29"]);

        let sleep = result.comparison(Factor::SleepDuration).unwrap();
        assert_eq!(sleep.with_symptom, 5.8);
        assert_eq!(sleep.without_symptom, 6.8);
        assert_eq!(sleep.difference, 1.0);

        let steps = result.comparison(Factor::Activity).unwrap();
        assert_eq!(steps.with_symptom, 4000.0);
        assert_eq!(steps.without_symptom, 7600.0);
        assert_eq!(steps.difference, 3600.0);

        // Steps differ by more in raw terms, so they rank first
        assert_eq!(result.comparisons[0].factor(), Some(Factor::Activity));
    }

    #[test]
    fn test_optional_factors_need_records() {
        let (entries, mut records) = fixture();

        let result = analyze("Headache", fixture_range(), &entries, &records).unwrap();
        assert!(result.comparison(Factor::RestingHeartRate).is_none());
        assert!(result.comparison(Factor::ActiveCalories).is_none());
        assert!(result.comparison(Factor::Mood).is_some());

        records.push(HealthMetricRecord::new(day(25), MetricKind::RestingHeartRate, 72.0));
        let result = analyze("Headache", fixture_range(), &entries, &records).unwrap();
        let hr = result.comparison(Factor::RestingHeartRate).unwrap();
        assert_eq!(hr.with_symptom, 72.0);
        assert_eq!(hr.without_symptom, 0.0);
        assert!(!hr.both_sides_observed);
    }

    #[test]
    fn test_metric_seen_on_one_side_only_is_not_a_pattern() {
        let entries = vec![
            JournalEntry::new(day(25), 3, 3).symptom("Headache", 6),
            JournalEntry::new(day(26), 3, 3),
        ];
        let records = vec![HealthMetricRecord::new(day(26), MetricKind::StepCount, 7600.0)];

        let range = DateRange::new(day(25), day(26));
        let result = analyze("Headache", range, &entries, &records).unwrap();

        let steps = result.comparison(Factor::Activity).unwrap();
        assert_eq!(steps.with_symptom, 0.0);
        assert_eq!(steps.without_symptom, 7600.0);
        assert_eq!(steps.score, 0.0);
        assert_eq!(steps.strength, Strength::Weak);
        assert!(!steps.both_sides_observed);

        // Mood and energy are equal, steps only seen on one side: nothing to say
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].factor, "Overall Patterns");
    }

    #[test]
    fn test_tags_and_journal_factors() {
        let (entries, records) = fixture();
        let result = analyze("Headache", fixture_range(), &entries, &records).unwrap();

        assert_eq!(result.symptom_day_tags.get("stress"), Some(&2));
        assert_eq!(result.symptom_free_day_tags.get("exercise"), Some(&2));

        let stress = result.tag_comparison("stress").unwrap();
        assert_eq!(stress.difference, 100.0);
        assert_eq!(stress.strength, Strength::Strong);

        let exercise = result.tag_comparison("exercise").unwrap();
        assert_eq!(exercise.without_symptom, 67.0);
        assert_eq!(exercise.difference, -67.0);

        let mood = result.comparison(Factor::Mood).unwrap();
        assert_eq!(mood.with_symptom, 2.5);
        assert_eq!(mood.without_symptom, 3.7);
    }

    #[test]
    fn test_ranked_output_is_sorted() {
        let (entries, records) = fixture();
        let result = analyze("Headache", fixture_range(), &entries, &records).unwrap();

        for pair in result.comparisons.windows(2) {
            assert!(pair[0].difference.abs() >= pair[1].difference.abs());
        }
        assert!(!result.insights.is_empty());
    }

    #[test]
    fn test_unknown_symptom_is_not_an_error() {
        let (entries, records) = fixture();
        let result = analyze("Nausea", fixture_range(), &entries, &records).unwrap();

        assert!(!result.has_symptom_days());
        assert_eq!(result.symptom_free_days_count, 5);
        assert_eq!(result.occurrence_percentage, 0);
        for c in result.metric_comparisons() {
            assert_eq!(c.with_symptom, 0.0);
            assert!(!c.both_sides_observed);
        }
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].factor, "Overall Patterns");
    }

    #[test]
    fn test_empty_input() {
        let result = analyze("Headache", fixture_range(), &[], &[]).unwrap();

        assert_eq!(result.symptom_days_count, 0);
        assert_eq!(result.symptom_free_days_count, 0);
        assert!(result.symptom_day_tags.is_empty());
        assert!(result.comparisons.iter().all(|c| c.difference == 0.0));
        assert_eq!(result.insights.len(), 1);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let (entries, records) = fixture();
        let inverted = DateRange::new(day(29), day(25));
        let err = analyze("Headache", inverted, &entries, &records).unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn test_range_filters_inputs() {
        let (entries, records) = fixture();
        let range = DateRange::new(day(26), day(29));
        let result = analyze("Headache", range, &entries, &records).unwrap();

        assert_eq!(result.entry_count, 4);
        assert_eq!(result.metric_record_count, 8);
        assert_eq!(result.symptom_days_count, 1);
        assert_eq!(result.comparison(Factor::SleepDuration).unwrap().with_symptom, 6.1);
    }

    #[test]
    fn test_inputs_are_untouched() {
        let (entries, records) = fixture();
        let before = (entries.clone(), records.clone());

        let first = analyze("Headache", fixture_range(), &entries, &records).unwrap();
        let second = analyze("Headache", fixture_range(), &entries, &records).unwrap();

        assert_eq!(first, second);
        assert_eq!((entries, records), before);
    }

    #[test]
    fn test_day_policy_changes_same_day_handling() {
        let entries = vec![
            JournalEntry::new(day(25), 4, 4),
            JournalEntry::new(day(25), 2, 2).symptom("Headache", 5),
            JournalEntry::new(day(26), 4, 4),
        ];

        let dominated = CorrelationAnalyzer::default()
            .build("Headache", fixture_range(), &entries, &[])
            .unwrap();
        assert_eq!(dominated.symptom_days_count, 1);
        assert_eq!(dominated.symptom_free_days_count, 1);

        let per_entry = CorrelationAnalyzer::default()
            .day_policy(DayPolicy::PerEntry)
            .build("Headache", fixture_range(), &entries, &[])
            .unwrap();
        assert_eq!(per_entry.symptom_days_count, 1);
        assert_eq!(per_entry.symptom_free_days_count, 2);
        assert_eq!(per_entry.day_policy, DayPolicy::PerEntry);
    }

    #[test]
    fn test_build_from_record_source() {
        let (entries, records) = fixture();
        let store = RecordStore::new(entries.clone(), records.clone());

        let from_store = CorrelationAnalyzer::default()
            .build_from(&store, "Headache", fixture_range())
            .unwrap();
        let direct = analyze("Headache", fixture_range(), &entries, &records).unwrap();
        assert_eq!(from_store, direct);
    }

    #[test]
    fn test_custom_factor_list() {
        let (entries, records) = fixture();
        let result = CorrelationAnalyzer::default()
            .factors(vec![Factor::Energy])
            .build("Headache", fixture_range(), &entries, &records)
            .unwrap();

        assert_eq!(result.metric_comparisons().count(), 1);
        assert!(result.comparison(Factor::Energy).is_some());
    }
}

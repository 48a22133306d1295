//! Metric Aggregator
//!
//! Averages a numeric value over the items that fall on a day-set. The same
//! function serves metric records and journal mood/energy; callers supply
//! extractors for the item's day and value.

use super::partition::DaySet;
use chrono::NaiveDate;

/// Round half-up to `decimals` places
///
/// Halves always round toward positive infinity, so `-0.25` becomes `-0.2`
/// at one decimal.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

/// Arithmetic mean, `None` for an empty input
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of a factor over a day-set, with the number of values behind it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAverage {
    /// Rounded half-up to one decimal, `0.0` when `samples` is zero
    pub value: f64,
    pub samples: usize,
}

impl DayAverage {
    pub fn has_data(&self) -> bool {
        self.samples > 0
    }
}

/// Mean of `value_of` over items whose day is in `days`
///
/// Items without a day or without a value are left out of both the sum and
/// the count. Returns `0.0` when nothing qualifies; otherwise the mean is
/// rounded half-up to one decimal.
pub fn average_for_days<T, D, V>(days: &DaySet, items: &[T], day_of: D, value_of: V) -> f64
where
    D: Fn(&T) -> Option<NaiveDate>,
    V: Fn(&T) -> Option<f64>,
{
    aggregate_for_days(days, items, day_of, value_of).value
}

/// Same as [`average_for_days`], keeping the sample count so callers can
/// tell a real zero from "no data"
pub fn aggregate_for_days<T, D, V>(
    days: &DaySet,
    items: &[T],
    day_of: D,
    value_of: V,
) -> DayAverage
where
    D: Fn(&T) -> Option<NaiveDate>,
    V: Fn(&T) -> Option<f64>,
{
    if days.is_empty() {
        return DayAverage {
            value: 0.0,
            samples: 0,
        };
    }

    let values: Vec<f64> = items
        .iter()
        .filter(|item| day_of(item).map(|d| days.contains(d)).unwrap_or(false))
        .filter_map(|item| value_of(item).filter(|v| v.is_finite()))
        .collect();

    DayAverage {
        value: mean(&values).map(|m| round_half_up(m, 1)).unwrap_or(0.0),
        samples: values.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{HealthMetricRecord, JournalEntry, MetricKind};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn sleep_records(values: &[f64]) -> Vec<HealthMetricRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                HealthMetricRecord::new(day(25 + i as u32), MetricKind::SleepDurationHours, *v)
            })
            .collect()
    }

    fn sleep_value(r: &HealthMetricRecord) -> Option<f64> {
        if r.kind == MetricKind::SleepDurationHours {
            r.value
        } else {
            None
        }
    }

    fn all_days() -> DaySet {
        (25..=29).map(day).collect()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(6.42, 1), 6.4);
        assert_eq!(round_half_up(6.25, 1), 6.3);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round_half_up(-0.25, 1), -0.2);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let records = sleep_records(&[5.5, 6.5, 7.2, 6.8, 6.1]);
        let avg = average_for_days(&all_days(), &records, |r| r.date, sleep_value);
        assert_eq!(avg, 6.4);
    }

    #[test]
    fn test_empty_day_set_is_zero() {
        let records = sleep_records(&[5.5, 6.5]);
        let avg = average_for_days(&DaySet::new(), &records, |r| r.date, sleep_value);
        assert_eq!(avg, 0.0);
    }

    #[test]
    fn test_no_matching_records_is_zero() {
        let days: DaySet = [day(1)].into_iter().collect();
        let records = sleep_records(&[5.5, 6.5]);
        assert_eq!(average_for_days(&days, &records, |r| r.date, sleep_value), 0.0);
    }

    #[test]
    fn test_is_idempotent() {
        let records = sleep_records(&[5.5, 6.5, 7.2, 6.8, 6.1]);
        let days: DaySet = [day(25), day(29)].into_iter().collect();

        let first = average_for_days(&days, &records, |r| r.date, sleep_value);
        let second = average_for_days(&days, &records, |r| r.date, sleep_value);
        assert_eq!(first, second);
        assert_eq!(first, 5.8);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut records = sleep_records(&[6.0, 8.0]);
        records.push(HealthMetricRecord {
            value: None,
            ..HealthMetricRecord::new(day(27), MetricKind::SleepDurationHours, 0.0)
        });
        records.push(HealthMetricRecord {
            date: None,
            ..HealthMetricRecord::new(day(28), MetricKind::SleepDurationHours, 1.0)
        });
        records.push(HealthMetricRecord::new(day(25), MetricKind::StepCount, 9000.0));

        // Not treated as zero: the mean stays 7.0
        assert_eq!(average_for_days(&all_days(), &records, |r| r.date, sleep_value), 7.0);
    }

    #[test]
    fn test_sample_count_separates_zero_from_no_data() {
        let records = sleep_records(&[0.0, 6.0]);

        let zero_day: DaySet = [day(25)].into_iter().collect();
        let measured = aggregate_for_days(&zero_day, &records, |r| r.date, sleep_value);
        assert_eq!(measured, DayAverage { value: 0.0, samples: 1 });
        assert!(measured.has_data());

        let empty_day: DaySet = [day(28)].into_iter().collect();
        let missing = aggregate_for_days(&empty_day, &records, |r| r.date, sleep_value);
        assert_eq!(missing.value, 0.0);
        assert!(!missing.has_data());
    }

    #[test]
    fn test_duplicate_day_records_are_all_averaged() {
        let records = vec![
            HealthMetricRecord::new(day(25), MetricKind::SleepDurationHours, 6.0),
            HealthMetricRecord::new(day(25), MetricKind::SleepDurationHours, 7.0),
        ];
        assert_eq!(average_for_days(&all_days(), &records, |r| r.date, sleep_value), 6.5);
    }

    #[test]
    fn test_journal_values() {
        let entries = vec![
            JournalEntry::new(day(25), 2, 1),
            JournalEntry::new(day(26), 5, 4),
        ];
        let mood = average_for_days(
            &all_days(),
            &entries,
            |e| Some(e.date),
            |e| Some(f64::from(e.mood)),
        );
        assert_eq!(mood, 3.5);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}

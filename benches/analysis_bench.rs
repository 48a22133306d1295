//! Benchmarks for the symptom correlation engine
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use symptom_lens::analysis::{partition, summarize, CorrelationAnalyzer, DayPolicy};
use symptom_lens::records::{DateRange, HealthMetricRecord, JournalEntry, MetricKind};

const TAGS: [&str; 6] = ["stress", "poor_sleep", "exercise", "caffeine", "travel", "alcohol"];

fn start_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Two entries per day, a headache roughly every third day
fn create_entries(days: usize) -> Vec<JournalEntry> {
    (0..days * 2)
        .map(|i| {
            let date = start_day() + Duration::days((i / 2) as i64);
            let mut entry = JournalEntry::new(date, (i % 5 + 1) as u8, ((i + 2) % 5 + 1) as u8)
                .tag(TAGS[i % TAGS.len()])
                .tag(TAGS[(i * 7) % TAGS.len()]);
            if (i / 2) % 3 == 0 && i % 2 == 0 {
                entry = entry.symptom("Headache", (i % 10 + 1) as u8);
            }
            entry
        })
        .collect()
}

fn create_metrics(days: usize) -> Vec<HealthMetricRecord> {
    (0..days)
        .flat_map(|d| {
            let date = start_day() + Duration::days(d as i64);
            [
                HealthMetricRecord::new(date, MetricKind::SleepDurationHours, 5.0 + (d % 4) as f64),
                HealthMetricRecord::new(date, MetricKind::StepCount, 3000.0 + (d * 37 % 9000) as f64),
                HealthMetricRecord::new(date, MetricKind::RestingHeartRate, 55.0 + (d % 12) as f64),
            ]
        })
        .collect()
}

fn bench_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");

    for days in [30, 365, 3650] {
        let entries = create_entries(days);
        let metrics = create_metrics(days);
        let range = DateRange::ending_on(start_day() + Duration::days(days as i64 - 1), days as i64);
        let analyzer = CorrelationAnalyzer::default();

        group.throughput(Throughput::Elements((entries.len() + metrics.len()) as u64));

        group.bench_with_input(BenchmarkId::new("build", days), &days, |b, _| {
            b.iter(|| {
                analyzer
                    .build(black_box("headache"), range, black_box(&entries), black_box(&metrics))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    let entries = create_entries(365);

    for policy in [DayPolicy::SymptomDominates, DayPolicy::PerEntry] {
        group.bench_function(policy.to_string(), |b| {
            b.iter(|| partition(black_box(&entries), "headache", policy))
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let entries = create_entries(365);
    let metrics = create_metrics(365);
    let range = DateRange::ending_on(start_day() + Duration::days(364), 365);

    c.bench_function("summarize_year", |b| {
        b.iter(|| summarize(range, black_box(&entries), black_box(&metrics)).unwrap())
    });
}

criterion_group!(benches, bench_analyzer, bench_partition, bench_summary);
criterion_main!(benches);

//! Tag Frequency Analyzer
//!
//! Counts are per entry: a tag counts once for each entry that carries it,
//! so two entries on one day count twice. Tags are case-sensitive.

use super::aggregate::round_half_up;
use super::ranking::{by_magnitude, Comparison};
use crate::records::JournalEntry;
use std::collections::{BTreeMap, BTreeSet};

/// Number of entries carrying each tag
pub fn tag_frequency<'a, I>(entries: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let mut counts = BTreeMap::new();
    for entry in entries {
        for tag in &entry.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// `count` out of `total` as a whole percentage, 0 when `total` is 0
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(100.0 * count as f64 / total as f64, 0) as u32
}

/// Share of `entries` that carry `tag`, as a whole percentage
pub fn percentage_for(tag: &str, entries: &[&JournalEntry]) -> u32 {
    let count = entries.iter().filter(|e| e.tags.contains(tag)).count();
    percentage(count, entries.len())
}

/// Tag comparisons over the union of tags seen on either side
///
/// A tag missing from one side counts as 0% there. When one side has no
/// entries at all every comparison is one-sided. The result is ordered by
/// `|difference|` descending, ties broken by tag name.
pub fn tag_comparisons(
    symptom_entries: &[&JournalEntry],
    symptom_free_entries: &[&JournalEntry],
) -> Vec<Comparison> {
    let with = tag_frequency(symptom_entries.iter().copied());
    let without = tag_frequency(symptom_free_entries.iter().copied());

    let all_tags: BTreeSet<&String> = with.keys().chain(without.keys()).collect();
    let one_sided = symptom_entries.is_empty() || symptom_free_entries.is_empty();

    let mut comparisons: Vec<Comparison> = all_tags
        .into_iter()
        .map(|tag| {
            let with_count = with.get(tag).copied().unwrap_or(0);
            let without_count = without.get(tag).copied().unwrap_or(0);
            let comparison = Comparison::tag(
                tag.clone(),
                percentage(with_count, symptom_entries.len()),
                percentage(without_count, symptom_free_entries.len()),
            );
            if one_sided {
                comparison.one_sided()
            } else {
                comparison
            }
        })
        .collect();

    comparisons.sort_by(|a, b| by_magnitude(b.difference, a.difference));
    comparisons
}

//! Day Partitioner
//!
//! Splits the days covered by a set of journal entries into days on which a
//! symptom was reported and days on which it was not. Days without any
//! journal entry belong to neither set; they carry no symptom information.

use crate::records::JournalEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Ordered set of calendar days, serialized as `YYYY-MM-DD` strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySet(BTreeSet<NaiveDate>);

impl DaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the day was already present
    pub fn insert(&mut self, day: NaiveDate) -> bool {
        self.0.insert(day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.0.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.iter()
    }

    pub fn is_disjoint(&self, other: &DaySet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Canonical `YYYY-MM-DD` keys, in calendar order
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
    }
}

impl FromIterator<NaiveDate> for DaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How to classify a day that has several journal entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPolicy {
    /// A day is a symptom day if any entry on it reports the symptom.
    /// The two day-sets are always disjoint.
    #[default]
    SymptomDominates,
    /// Every entry is classified on its own, so a day with conflicting
    /// entries lands in both day-sets.
    PerEntry,
}

impl fmt::Display for DayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPolicy::SymptomDominates => write!(f, "symptom_dominates"),
            DayPolicy::PerEntry => write!(f, "per_entry"),
        }
    }
}

impl FromStr for DayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "symptom_dominates" | "day" => Ok(DayPolicy::SymptomDominates),
            "per_entry" | "entry" => Ok(DayPolicy::PerEntry),
            other => Err(format!("unknown day policy: {}", other)),
        }
    }
}

/// Output of [`partition`]
///
/// Besides the two day-sets, the entries are grouped per side so that tag
/// frequencies can be counted per entry rather than per day.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub with_symptom: DaySet,
    pub without_symptom: DaySet,
    pub symptom_entries: Vec<&'a JournalEntry>,
    pub symptom_free_entries: Vec<&'a JournalEntry>,
}

impl Partition<'_> {
    /// Number of distinct days seen across both sets
    pub fn distinct_days(&self) -> usize {
        self.with_symptom
            .iter()
            .chain(self.without_symptom.iter())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Whether an entry reports `symptom` (case-insensitive, exact)
pub fn matches(entry: &JournalEntry, symptom: &str) -> bool {
    entry.has_symptom(symptom)
}

/// Split `entries` into symptom and symptom-free days
///
/// An empty or unknown symptom yields an empty symptom side with every entry
/// day on the symptom-free side. Entry order is preserved within each side.
pub fn partition<'a, I>(entries: I, symptom: &str, policy: DayPolicy) -> Partition<'a>
where
    I: IntoIterator<Item = &'a JournalEntry>,
{
    let entries: Vec<&'a JournalEntry> = entries.into_iter().collect();
    let mut result = Partition::default();

    match policy {
        DayPolicy::SymptomDominates => {
            let symptom_days: DaySet = entries
                .iter()
                .filter(|e| matches(e, symptom))
                .map(|e| e.date)
                .collect();

            for entry in entries {
                if symptom_days.contains(entry.date) {
                    result.symptom_entries.push(entry);
                } else {
                    result.without_symptom.insert(entry.date);
                    result.symptom_free_entries.push(entry);
                }
            }

            result.with_symptom = symptom_days;
        }
        DayPolicy::PerEntry => {
            for entry in entries {
                if matches(entry, symptom) {
                    result.with_symptom.insert(entry.date);
                    result.symptom_entries.push(entry);
                } else {
                    result.without_symptom.insert(entry.date);
                    result.symptom_free_entries.push(entry);
                }
            }
        }
    }

    tracing::debug!(
        symptom = %symptom,
        policy = %policy,
        symptom_days = result.with_symptom.len(),
        symptom_free_days = result.without_symptom.len(),
        "Partitioned journal days"
    );

    result
}

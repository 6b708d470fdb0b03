//! The normalized record table and its summary queries.
//!
//! One [`CompletionRecord`] is the atomic extracted fact: a person
//! completed some count of a known task, in one section of one source
//! period. The table owns the records plus a derived chronological key
//! per source label, and exposes the read-only aggregation queries the
//! reporting layer consumes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parse a source display label as a long month name plus 4-digit year,
/// e.g. "March 2024". Returns the first day of that month.
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", label.trim()), "%d %B %Y").ok()
}

/// The atomic extracted fact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Display label of the originating source, e.g. "March 2024"
    pub source: String,
    /// Section (portal) name the record was extracted from
    pub section: String,
    /// Person owning the record; always a member of the run's frozen
    /// person vocabulary
    pub person: String,
    /// Task name from the closed task vocabulary
    pub task: String,
    /// Completion count; always finite and non-negative
    pub completion: f64,
}

/// Ordered collection of completion records with per-source
/// chronological sort keys.
///
/// Sources whose label does not parse as "Month Year" get no key and
/// sort after all dated sources, ties broken by label. The table is
/// append-only at construction and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    records: Vec<CompletionRecord>,
    month_keys: BTreeMap<String, Option<NaiveDate>>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, deriving chronological keys and
    /// enforcing the completion invariant (finite, >= 0; anything else
    /// becomes exactly 0).
    pub fn from_records(records: Vec<CompletionRecord>) -> Self {
        let mut table = Self::new();
        for mut record in records {
            if !record.completion.is_finite() || record.completion < 0.0 {
                record.completion = 0.0;
            }
            table
                .month_keys
                .entry(record.source.clone())
                .or_insert_with(|| parse_month_label(&record.source));
            table.records.push(record);
        }
        table
    }

    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chronological key for a source label, if its label parsed.
    pub fn month_key(&self, source: &str) -> Option<NaiveDate> {
        self.month_keys.get(source).copied().flatten()
    }

    /// Distinct source labels in chronological order; labels without a
    /// parseable month sort last, ties broken by label.
    pub fn source_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.month_keys.keys().cloned().collect();
        labels.sort_by_key(|label| {
            let key = self.month_key(label);
            (key.is_none(), key.unwrap_or(NaiveDate::MIN), label.clone())
        });
        labels
    }

    /// Distinct person names, sorted.
    pub fn persons(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.person.clone()).collect()
    }

    /// Distinct section names, sorted.
    pub fn sections(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.section.clone()).collect()
    }

    /// Distinct task names, sorted.
    pub fn tasks(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.task.clone()).collect()
    }

    // ========================================================================
    // Summary queries
    // ========================================================================

    pub fn total_completion(&self) -> f64 {
        self.records.iter().map(|r| r.completion).sum()
    }

    /// Number of distinct persons with at least one record.
    pub fn active_person_count(&self) -> usize {
        self.persons().len()
    }

    /// Person with the highest total completion, with that total.
    ///
    /// Returns `None` on an empty table (the defined "no data" sentinel).
    /// Ties resolve to the alphabetically first person.
    pub fn top_performer(&self) -> Option<(String, f64)> {
        let mut best: Option<(String, f64)> = None;
        for (person, total) in self.sum_by_person() {
            match &best {
                Some((_, current)) if total <= *current => {}
                _ => best = Some((person, total)),
            }
        }
        best
    }

    pub fn sum_by_person(&self) -> BTreeMap<String, f64> {
        let mut sums = BTreeMap::new();
        for record in &self.records {
            *sums.entry(record.person.clone()).or_insert(0.0) += record.completion;
        }
        sums
    }

    /// Sum of completion keyed by (person, section).
    pub fn sum_by_person_section(&self) -> BTreeMap<(String, String), f64> {
        let mut sums = BTreeMap::new();
        for record in &self.records {
            *sums
                .entry((record.person.clone(), record.section.clone()))
                .or_insert(0.0) += record.completion;
        }
        sums
    }

    pub fn sum_by_task(&self) -> BTreeMap<String, f64> {
        let mut sums = BTreeMap::new();
        for record in &self.records {
            *sums.entry(record.task.clone()).or_insert(0.0) += record.completion;
        }
        sums
    }

    /// Sum of completion keyed by (source label, person).
    pub fn sum_by_person_month(&self) -> BTreeMap<(String, String), f64> {
        let mut sums = BTreeMap::new();
        for record in &self.records {
            *sums
                .entry((record.source.clone(), record.person.clone()))
                .or_insert(0.0) += record.completion;
        }
        sums
    }

    /// Sum of completion keyed by (source label, section).
    pub fn sum_by_section_month(&self) -> BTreeMap<(String, String), f64> {
        let mut sums = BTreeMap::new();
        for record in &self.records {
            *sums
                .entry((record.source.clone(), record.section.clone()))
                .or_insert(0.0) += record.completion;
        }
        sums
    }

    /// Persons with their totals, highest first; ties sort by name.
    pub fn leaderboard(&self) -> Vec<(String, f64)> {
        let mut rows: Vec<(String, f64)> = self.sum_by_person().into_iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    // ========================================================================
    // Filtered views
    // ========================================================================

    /// Records for one source period, as a new table.
    pub fn for_source(&self, source: &str) -> RecordTable {
        RecordTable::from_records(
            self.records
                .iter()
                .filter(|r| r.source == source)
                .cloned()
                .collect(),
        )
    }

    /// Records for the given persons only, as a new table.
    pub fn for_persons<S: AsRef<str>>(&self, persons: &[S]) -> RecordTable {
        let keep: BTreeSet<&str> = persons.iter().map(AsRef::as_ref).collect();
        RecordTable::from_records(
            self.records
                .iter()
                .filter(|r| keep.contains(r.person.as_str()))
                .cloned()
                .collect(),
        )
    }
}

//! Cell classification and the person vocabulary.
//!
//! The monthly exports carry no headers, so every label cell has to be
//! classified heuristically: structural noise (totals, headers, blanks),
//! a known task from the closed vocabulary, or a person candidate.
//! Person candidates are collected into a vocabulary during a discovery
//! pass over the whole batch; the frozen vocabulary then disambiguates
//! person rows from stray labels during extraction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The closed vocabulary of task type names.
///
/// Matching is exact and case-sensitive; anything else in a label column
/// is either structural noise or a person candidate.
pub const KNOWN_TASKS: [&str; 14] = [
    "Preparation and Setup",
    "Monitor WebInspect",
    "Quality",
    "Quality 1",
    "Quality 2",
    "Authentication and Session",
    "Access Control",
    "Input Validation",
    "Business Logic",
    "Work",
    "Review",
    "Remediation",
    "Remediation 1",
    "Remediation 2",
];

/// Exact, case-sensitive membership in [`KNOWN_TASKS`].
pub fn is_known_task(label: &str) -> bool {
    KNOWN_TASKS.contains(&label)
}

/// Classification of a raw label cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellClass {
    /// Not noise and not a known task; folded into the person vocabulary
    /// during discovery. There is no reject bucket.
    PersonCandidate,
    /// Exact match against the closed task vocabulary.
    KnownTask,
    /// Blanks, headers, totals, purely numeric tokens.
    StructuralNoise,
}

/// Classify a raw cell string. Rules apply in order, first match wins:
///
/// 1. blank after trimming
/// 2. equals "row labels" (case-insensitive)
/// 3. contains "portal" (case-insensitive)
/// 4. starts with "total" (case-insensitive)
/// 5. contains "grand total" (case-insensitive)
/// 6. entirely digits after removing spaces
/// 7. exact case-sensitive known task
/// 8. otherwise a person candidate
pub fn classify(label: &str) -> CellClass {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return CellClass::StructuralNoise;
    }

    let lower = trimmed.to_lowercase();
    if lower == "row labels"
        || lower.contains("portal")
        || lower.starts_with("total")
        || lower.contains("grand total")
    {
        return CellClass::StructuralNoise;
    }

    let compact: String = trimmed.chars().filter(|c| *c != ' ').collect();
    if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
        return CellClass::StructuralNoise;
    }

    if is_known_task(trimmed) {
        return CellClass::KnownTask;
    }

    CellClass::PersonCandidate
}

/// Accumulates person candidates during the discovery pass.
///
/// Set union: order-independent, duplicates collapse. Freezing produces
/// the immutable [`PersonVocabulary`] required before extraction starts.
#[derive(Clone, Debug, Default)]
pub struct VocabularyBuilder {
    names: BTreeSet<String>,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the classifier to a label cell and fold person candidates in.
    pub fn observe(&mut self, label: &str) {
        if classify(label) == CellClass::PersonCandidate {
            self.names.insert(label.trim().to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Freeze the accumulated set. The result is never mutated again:
    /// the extraction pass only reads it, so a run cannot misclassify
    /// based on the order its sources were scanned.
    pub fn freeze(self) -> PersonVocabulary {
        PersonVocabulary { names: self.names }
    }
}

/// The frozen set of person labels recognized for one ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonVocabulary {
    names: BTreeSet<String>,
}

impl PersonVocabulary {
    /// Build directly from known names (tests, embedding applications).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

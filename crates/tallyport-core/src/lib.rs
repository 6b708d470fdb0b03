//! # tallyport-core
//!
//! Core domain model for the tallyport extraction engine.
//!
//! This crate provides:
//! - Grid types: `Cell`, `SheetGrid` (an unlabelled spreadsheet grid)
//! - Section configuration: `SectionDef`, `SectionLayout`
//! - The cell classifier and person vocabulary (`classify` module)
//! - The normalized record table with its summary queries (`table` module)
//! - Error types and the `ReportRenderer` trait
//!
//! ## Example
//!
//! ```rust
//! use tallyport_core::{classify, CellClass, SectionLayout, VocabularyBuilder};
//!
//! assert_eq!(classify("Grand Total"), CellClass::StructuralNoise);
//! assert_eq!(classify("Quality"), CellClass::KnownTask);
//! assert_eq!(classify("Alice"), CellClass::PersonCandidate);
//!
//! let mut builder = VocabularyBuilder::new();
//! builder.observe("Alice");
//! builder.observe("Quality"); // known task, not folded in
//! let vocabulary = builder.freeze();
//! assert!(vocabulary.contains("Alice"));
//! assert!(!vocabulary.contains("Quality"));
//!
//! let layout = SectionLayout::portals();
//! assert_eq!(layout.sections.len(), 4);
//! ```

pub mod classify;
pub mod table;

pub use classify::{
    classify, is_known_task, CellClass, PersonVocabulary, VocabularyBuilder, KNOWN_TASKS,
};
pub use table::{parse_month_label, CompletionRecord, RecordTable};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Cells and grids
// ============================================================================

/// The decoded scalar value of one spreadsheet cell.
///
/// Date, time and duration cells decode to their numeric serial form;
/// error cells decode to `Empty`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// A present cell is anything other than `Empty`.
    pub fn is_present(&self) -> bool {
        !matches!(self, Cell::Empty)
    }

    /// Trimmed string form of the cell, as a section walker reads labels.
    ///
    /// Whole numbers render without a fractional part so that a numeric
    /// label like `7` hits the all-digits noise rule.
    pub fn label_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        }
    }
}

/// An opaque grid of cells addressed by zero-based row/column index.
///
/// No header semantics: row 0 is just the first row. Loaded once per
/// uploaded source and discarded after extraction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows of cells (test and embedding convenience).
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Cell at (row, col); out-of-range addresses read as `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the grid.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

// ============================================================================
// Section configuration
// ============================================================================

/// A named logical section bound to a label column and a value column
/// within one sheet. Static configuration, never derived from the data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    /// Display name, e.g. "AMS PORTAL"
    pub name: String,
    /// Column holding person and task labels
    pub label_col: usize,
    /// Column holding completion values
    pub value_col: usize,
}

impl SectionDef {
    pub fn new(name: impl Into<String>, label_col: usize, value_col: usize) -> Self {
        Self {
            name: name.into(),
            label_col,
            value_col,
        }
    }
}

/// The fixed set of sections expected in every source sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub sections: Vec<SectionDef>,
}

impl SectionLayout {
    pub fn new(sections: Vec<SectionDef>) -> Self {
        Self { sections }
    }

    /// The canonical four-portal layout of the monthly exports:
    /// AMS (0,1), EMEA (3,4), APAC (6,7), SGP (9,10).
    pub fn portals() -> Self {
        Self::new(vec![
            SectionDef::new("AMS PORTAL", 0, 1),
            SectionDef::new("EMEA PORTAL", 3, 4),
            SectionDef::new("APAC PORTAL", 6, 7),
            SectionDef::new("SGP PORTAL", 9, 10),
        ])
    }
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self::portals()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Fatal failure while loading a single source document.
///
/// These never abort a batch: the ingestion pipeline catches them at the
/// source boundary and degrades to a warning.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while rendering a report document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Renderer trait
// ============================================================================

/// A rendering backend over the normalized record table.
///
/// Renderers are read-only consumers; they must tolerate an empty table
/// (render a defined "no data" output rather than erroring).
pub trait ReportRenderer {
    type Output;

    fn render(&self, table: &RecordTable) -> Result<Self::Output, ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cell_label_text_trims_and_formats() {
        assert_eq!(Cell::Text("  Alice  ".into()).label_text(), "Alice");
        assert_eq!(Cell::Number(7.0).label_text(), "7");
        assert_eq!(Cell::Number(2.5).label_text(), "2.5");
        assert_eq!(Cell::Empty.label_text(), "");
        assert_eq!(Cell::Bool(true).label_text(), "true");
    }

    #[test]
    fn cell_presence() {
        assert!(!Cell::Empty.is_present());
        assert!(Cell::Number(0.0).is_present());
        assert!(Cell::Text(String::new()).is_present());
    }

    #[test]
    fn grid_out_of_range_reads_empty() {
        let grid = SheetGrid::from_rows(vec![vec![Cell::Text("a".into())]]);
        assert_eq!(grid.cell(0, 0), &Cell::Text("a".into()));
        assert_eq!(grid.cell(0, 5), &Cell::Empty);
        assert_eq!(grid.cell(9, 0), &Cell::Empty);
    }

    #[test]
    fn grid_dimensions() {
        let grid = SheetGrid::from_rows(vec![
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
            vec![Cell::Empty],
        ]);
        assert_eq!(grid.num_rows(), 2);
        assert_eq!(grid.num_cols(), 3);
        assert_eq!(SheetGrid::new().num_cols(), 0);
    }

    #[test]
    fn portal_layout_column_pairs() {
        let layout = SectionLayout::portals();
        let pairs: Vec<(usize, usize)> = layout
            .sections
            .iter()
            .map(|s| (s.label_col, s.value_col))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (3, 4), (6, 7), (9, 10)]);
        assert_eq!(layout.sections[0].name, "AMS PORTAL");
    }

    #[test]
    fn section_layout_round_trips_through_json() {
        let layout = SectionLayout::portals();
        let json = serde_json::to_string(&layout).unwrap();
        let back: SectionLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(layout, back);
    }
}

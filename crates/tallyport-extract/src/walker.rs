//! The section walker and the person discovery pass.
//!
//! Both passes see a section as the same two-column projection of the
//! grid: (label cell, value cell) pairs with rows that are blank in both
//! columns dropped. Discovery feeds every label to the vocabulary
//! builder; extraction walks the projection with an explicit
//! current-person cursor and emits triples.

use tallyport_core::{
    classify, Cell, CellClass, PersonVocabulary, SectionDef, SectionLayout, SheetGrid,
    VocabularyBuilder,
};

/// An extracted (section, person, task, value) fact with the value cell
/// still uncoerced. Coercion to a numeric completion happens in the
/// aggregator, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTriple {
    pub section: String,
    pub person: String,
    pub task: String,
    pub value: Cell,
}

/// True when the grid is too narrow to contain the section's columns at
/// all; such a section contributes zero triples and deserves a warning.
pub fn section_out_of_range(grid: &SheetGrid, section: &SectionDef) -> bool {
    let needed = section.label_col.max(section.value_col) + 1;
    grid.num_cols() < needed
}

/// Two-column projection of a section: (label, value) pairs, top to
/// bottom, with rows blank in both columns dropped before any
/// classification.
fn project_section<'a>(grid: &'a SheetGrid, section: &SectionDef) -> Vec<(&'a Cell, &'a Cell)> {
    (0..grid.num_rows())
        .map(|row| {
            (
                grid.cell(row, section.label_col),
                grid.cell(row, section.value_col),
            )
        })
        .filter(|(label, value)| label.is_present() || value.is_present())
        .collect()
}

/// Discovery pass over one grid: apply the classifier to every label
/// cell of every section and fold person candidates into the builder.
///
/// Sections the grid cannot contain are skipped silently here; the
/// extraction pass is the one that reports them.
pub fn discover_into(builder: &mut VocabularyBuilder, grid: &SheetGrid, layout: &SectionLayout) {
    for section in &layout.sections {
        if section_out_of_range(grid, section) {
            continue;
        }
        for (label, _) in project_section(grid, section) {
            builder.observe(&label.label_text());
        }
    }
    tracing::debug!(candidates = builder.len(), "discovery pass over grid done");
}

/// Single forward pass over one section, emitting completion triples.
///
/// The current-person cursor is local state, reset here at every call:
/// - structural noise (blanks, "total"/"grand total" terminators, other
///   noise) skips the row without touching the cursor;
/// - a label in the frozen vocabulary moves the cursor, emitting nothing;
/// - a known task with an active cursor and a present value cell emits;
/// - anything else (task before any person row, stray labels) skips
///   silently.
pub fn walk_section(
    grid: &SheetGrid,
    section: &SectionDef,
    vocabulary: &PersonVocabulary,
) -> Vec<RawTriple> {
    let mut triples = Vec::new();
    let mut current_person: Option<String> = None;

    for (label_cell, value_cell) in project_section(grid, section) {
        let label = label_cell.label_text();
        match classify(&label) {
            CellClass::StructuralNoise => {}
            CellClass::PersonCandidate => {
                if vocabulary.contains(&label) {
                    current_person = Some(label);
                }
            }
            CellClass::KnownTask => {
                if let Some(person) = &current_person {
                    if value_cell.is_present() {
                        triples.push(RawTriple {
                            section: section.name.clone(),
                            person: person.clone(),
                            task: label,
                            value: value_cell.clone(),
                        });
                    }
                }
            }
        }
    }

    triples
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    fn grid(rows: Vec<Vec<Cell>>) -> SheetGrid {
        SheetGrid::from_rows(rows)
    }

    fn section() -> SectionDef {
        SectionDef::new("AMS PORTAL", 0, 1)
    }

    fn vocabulary() -> PersonVocabulary {
        PersonVocabulary::from_names(["Alice", "Bob"])
    }

    #[test]
    fn interleaved_person_and_task_rows() {
        // Scenario: person rows hand ownership to the task rows below them
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Quality"), Cell::Number(5.0)],
            vec![text("Bob"), Cell::Empty],
            vec![text("Work"), Cell::Number(3.0)],
        ]);

        let triples = walk_section(&grid, &section(), &vocabulary());
        assert_eq!(
            triples,
            vec![
                RawTriple {
                    section: "AMS PORTAL".into(),
                    person: "Alice".into(),
                    task: "Quality".into(),
                    value: Cell::Number(5.0),
                },
                RawTriple {
                    section: "AMS PORTAL".into(),
                    person: "Bob".into(),
                    task: "Work".into(),
                    value: Cell::Number(3.0),
                },
            ]
        );
    }

    #[test]
    fn task_with_no_prior_person_emits_nothing() {
        let grid = grid(vec![vec![text("Quality"), Cell::Number(5.0)]]);
        assert!(walk_section(&grid, &section(), &vocabulary()).is_empty());
    }

    #[test]
    fn missing_value_drops_the_row_at_extraction() {
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Quality"), Cell::Empty],
        ]);
        assert!(walk_section(&grid, &section(), &vocabulary()).is_empty());
    }

    #[test]
    fn non_numeric_present_value_still_emits() {
        // Coercion to 0 is the aggregator's job; the walker only checks
        // that the value cell is present.
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Quality"), text("n/a")],
        ]);
        let triples = walk_section(&grid, &section(), &vocabulary());
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].value, text("n/a"));
    }

    #[test]
    fn noise_rows_never_touch_the_cursor() {
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Total"), Cell::Number(99.0)],
            vec![text("Grand Total"), Cell::Number(99.0)],
            vec![text("Row Labels"), Cell::Empty],
            vec![text("Quality"), Cell::Number(5.0)],
        ]);
        let triples = walk_section(&grid, &section(), &vocabulary());
        // The cursor survives the noise rows, and no noise row emits
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].person, "Alice");
    }

    #[test]
    fn person_not_in_vocabulary_does_not_take_the_cursor() {
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Mallory"), Cell::Empty],
            vec![text("Quality"), Cell::Number(2.0)],
        ]);
        let triples = walk_section(&grid, &section(), &vocabulary());
        // "Mallory" is a candidate but not in the frozen vocabulary, so
        // Alice still owns the task row
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].person, "Alice");
    }

    #[test]
    fn rows_blank_in_both_columns_are_dropped_before_classification() {
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![Cell::Empty, Cell::Empty],
            vec![text("Quality"), Cell::Number(1.0)],
        ]);
        assert_eq!(walk_section(&grid, &section(), &vocabulary()).len(), 1);
    }

    #[test]
    fn numeric_labels_are_noise_not_tasks() {
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![Cell::Number(42.0), Cell::Number(7.0)],
            vec![text("Work"), Cell::Number(1.0)],
        ]);
        let triples = walk_section(&grid, &section(), &vocabulary());
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].task, "Work");
    }

    #[test]
    fn discovery_collects_candidates_across_sections() {
        let layout = SectionLayout::new(vec![
            SectionDef::new("LEFT", 0, 1),
            SectionDef::new("RIGHT", 3, 4),
        ]);
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty, Cell::Empty, text("Carol"), Cell::Empty],
            vec![text("Quality"), Cell::Number(1.0), Cell::Empty, text("Total"), Cell::Empty],
        ]);

        let mut builder = VocabularyBuilder::new();
        discover_into(&mut builder, &grid, &layout);
        let vocabulary = builder.freeze();

        assert!(vocabulary.contains("Alice"));
        assert!(vocabulary.contains("Carol"));
        assert!(!vocabulary.contains("Quality"));
        assert!(!vocabulary.contains("Total"));
    }

    #[test]
    fn discovery_is_idempotent() {
        let layout = SectionLayout::portals();
        let grid = grid(vec![
            vec![text("Alice"), Cell::Empty],
            vec![text("Quality"), Cell::Number(1.0)],
        ]);

        let mut once = VocabularyBuilder::new();
        discover_into(&mut once, &grid, &layout);

        let mut twice = VocabularyBuilder::new();
        discover_into(&mut twice, &grid, &layout);
        discover_into(&mut twice, &grid, &layout);

        assert_eq!(once.freeze(), twice.freeze());
    }

    #[test]
    fn out_of_range_section_detection() {
        let grid = grid(vec![vec![text("Alice"), Cell::Number(1.0)]]);
        assert!(!section_out_of_range(&grid, &SectionDef::new("A", 0, 1)));
        assert!(section_out_of_range(&grid, &SectionDef::new("B", 3, 4)));
    }
}

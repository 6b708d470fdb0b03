//! End-to-end ingestion tests over synthesized xlsx workbooks.

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use tallyport_core::SectionLayout;
use tallyport_extract::{ingest_files, ingest_sources, IngestWarning, SourceInput};

/// Write one pivot-style section at (label_col, value_col): a header
/// row, interleaved person/task rows, then total rows.
fn write_section(
    sheet: &mut Worksheet,
    label_col: u16,
    value_col: u16,
    rows: &[(&str, Option<f64>)],
) -> Result<(), XlsxError> {
    sheet.write_string(0, label_col, "Row Labels")?;
    sheet.write_string(0, value_col, "Count of Task")?;
    let mut row = 1u32;
    for (label, value) in rows {
        sheet.write_string(row, label_col, *label)?;
        if let Some(value) = value {
            sheet.write_number(row, value_col, *value)?;
        }
        row += 1;
    }
    sheet.write_string(row, label_col, "Grand Total")?;
    sheet.write_number(
        row,
        value_col,
        rows.iter().filter_map(|(_, v)| *v).sum::<f64>(),
    )?;
    Ok(())
}

fn march_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Total").unwrap();

    write_section(
        sheet,
        0,
        1,
        &[
            ("Alice", None),
            ("Quality", Some(5.0)),
            ("Work", Some(2.0)),
            ("Total", Some(7.0)),
            ("Bob", None),
            ("Review", Some(3.0)),
            ("Total", Some(3.0)),
        ],
    )
    .unwrap();

    write_section(
        sheet,
        3,
        4,
        &[
            ("Carol", None),
            ("Remediation", Some(4.0)),
            ("Dana", None),
            ("Input Validation", Some(1.0)),
        ],
    )
    .unwrap();

    workbook.save_to_buffer().unwrap()
}

fn april_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Total").unwrap();

    write_section(
        sheet,
        0,
        1,
        &[("Alice", None), ("Quality", Some(7.0))],
    )
    .unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn two_months_end_to_end() {
    let sources = vec![
        SourceInput::new("April 2024", april_workbook()),
        SourceInput::new("March 2024", march_workbook()),
    ];
    let outcome = ingest_sources(&sources, &SectionLayout::portals());
    let table = &outcome.table;

    // March: 5 + 2 + 3 in AMS, 4 + 1 in EMEA; April: 7 in AMS
    assert_eq!(table.len(), 6);
    assert_eq!(table.total_completion(), 22.0);
    assert_eq!(
        table.source_labels(),
        vec!["March 2024".to_string(), "April 2024".to_string()]
    );

    assert_eq!(table.top_performer(), Some(("Alice".to_string(), 14.0)));
    assert_eq!(table.for_source("March 2024").total_completion(), 15.0);
    assert_eq!(table.for_source("April 2024").total_completion(), 7.0);

    let by_section = table.sum_by_person_section();
    assert_eq!(
        by_section.get(&("Carol".to_string(), "EMEA PORTAL".to_string())),
        Some(&4.0)
    );

    // Every extracted person is a member of the frozen vocabulary
    for record in table.records() {
        assert!(outcome.vocabulary.contains(&record.person));
    }
    for person in ["Alice", "Bob", "Carol", "Dana"] {
        assert!(outcome.vocabulary.contains(person));
    }
    // Totals and headers never made it into the vocabulary
    assert!(!outcome.vocabulary.contains("Grand Total"));
    assert!(!outcome.vocabulary.contains("Row Labels"));
}

#[test]
fn ingestion_is_deterministic() {
    let sources = vec![
        SourceInput::new("March 2024", march_workbook()),
        SourceInput::new("April 2024", april_workbook()),
    ];
    let layout = SectionLayout::portals();
    let first = ingest_sources(&sources, &layout);
    let second = ingest_sources(&sources, &layout);

    assert_eq!(first.table, second.table);
    assert_eq!(first.vocabulary, second.vocabulary);
}

#[test]
fn missing_total_sheet_falls_back_to_first_sheet() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary").unwrap();
    write_section(sheet, 0, 1, &[("Alice", None), ("Quality", Some(2.0))]).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let sources = vec![SourceInput::new("May 2024", bytes)];
    let outcome = ingest_sources(&sources, &SectionLayout::portals());

    assert_eq!(outcome.table.total_completion(), 2.0);
    assert!(outcome.warnings.iter().any(|w| matches!(
        w,
        IngestWarning::MissingSheet { source, used, .. }
            if source == "May 2024" && used == "Summary"
    )));
}

#[test]
fn narrow_sheet_skips_out_of_range_sections() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Total").unwrap();
    write_section(sheet, 0, 1, &[("Alice", None), ("Work", Some(6.0))]).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let sources = vec![SourceInput::new("June 2024", bytes)];
    let outcome = ingest_sources(&sources, &SectionLayout::portals());

    // AMS extracted, the three wider sections warned about
    assert_eq!(outcome.table.total_completion(), 6.0);
    let skipped: Vec<&IngestWarning> = outcome
        .warnings
        .iter()
        .filter(|w| matches!(w, IngestWarning::SectionSkipped { .. }))
        .collect();
    assert_eq!(skipped.len(), 3);
}

#[test]
fn source_with_no_records_warns_but_does_not_abort() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Total").unwrap();
    // A task value with no preceding person row: cursor stays null
    write_section(sheet, 0, 1, &[("Quality", Some(5.0))]).unwrap();
    let empty_bytes = workbook.save_to_buffer().unwrap();

    let sources = vec![
        SourceInput::new("July 2024", empty_bytes),
        SourceInput::new("March 2024", march_workbook()),
    ];
    let outcome = ingest_sources(&sources, &SectionLayout::portals());

    assert_eq!(outcome.table.total_completion(), 15.0);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, IngestWarning::EmptySource { source } if source == "July 2024")));
}

#[test]
fn ingest_files_labels_sources_by_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("March 2024.xlsx");
    std::fs::write(&path, march_workbook()).unwrap();

    let outcome = ingest_files(&[&path], &SectionLayout::portals());
    assert_eq!(
        outcome.table.source_labels(),
        vec!["March 2024".to_string()]
    );
    assert_eq!(outcome.table.total_completion(), 15.0);
}

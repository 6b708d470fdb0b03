//! # tallyport-extract
//!
//! The spreadsheet-to-record extraction pipeline.
//!
//! This crate provides:
//! - Workbook loading (xlsx bytes to a cell grid)
//! - The person discovery pass and the section walker
//! - The record aggregator
//! - The batch ingestion entry points with their warning taxonomy
//!
//! Ingestion is two-stage: a discovery pass over *all* sources builds
//! the frozen person vocabulary, then the extraction pass walks every
//! section of every source against it. Nothing here is fatal to a
//! batch: a bad source degrades to zero records plus a warning.
//!
//! ## Example
//!
//! ```rust
//! use tallyport_core::SectionLayout;
//! use tallyport_extract::{ingest_sources, IngestWarning, SourceInput};
//!
//! // A source that is not a workbook is skipped with a warning, not an error
//! let sources = vec![SourceInput::new("March 2024", b"not an xlsx".to_vec())];
//! let outcome = ingest_sources(&sources, &SectionLayout::portals());
//!
//! assert!(outcome.table.is_empty());
//! assert!(matches!(
//!     outcome.warnings[0],
//!     IngestWarning::UnreadableSource { .. }
//! ));
//! ```

pub mod aggregate;
pub mod walker;
pub mod workbook;

pub use aggregate::{aggregate, coerce_completion, SourceTriples};
pub use walker::{discover_into, walk_section, RawTriple};
pub use workbook::{load_sheet, LoadedSheet, PREFERRED_SHEET};

use std::path::Path;

use tallyport_core::{
    ExtractError, PersonVocabulary, RecordTable, SectionLayout, VocabularyBuilder,
};

/// One uploaded source: its display label and raw workbook bytes.
#[derive(Clone, Debug)]
pub struct SourceInput {
    /// Display label, interpreted as "Month Year" for chronological
    /// ordering (e.g. "March 2024")
    pub label: String,
    pub bytes: Vec<u8>,
}

impl SourceInput {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    /// Read a source from disk; the label is the file name minus its
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;
        Ok(Self { label, bytes })
    }
}

/// A recoverable problem surfaced during ingestion. Warnings never
/// abort the batch; they accompany a smaller result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestWarning {
    UnreadableSource {
        source: String,
        reason: String,
    },

    MissingSheet {
        source: String,
        requested: String,
        used: String,
    },

    SectionSkipped {
        source: String,
        section: String,
        columns: usize,
    },

    EmptySource {
        source: String,
    },
}

// Manual impls rather than `derive(Error)`: thiserror would treat the
// `source` fields (which hold the source *label*, not a cause) as the
// error's `source()`, and `String` is not an `Error`.
impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableSource { source, reason } => {
                write!(f, "{source}: unreadable workbook: {reason}")
            }
            Self::MissingSheet {
                source,
                requested,
                used,
            } => {
                write!(
                    f,
                    "{source}: sheet \"{requested}\" missing, read \"{used}\" instead"
                )
            }
            Self::SectionSkipped {
                source,
                section,
                columns,
            } => {
                write!(
                    f,
                    "{source}: section \"{section}\" skipped: sheet has only {columns} columns"
                )
            }
            Self::EmptySource { source } => {
                write!(f, "{source}: no completion records extracted")
            }
        }
    }
}

impl std::error::Error for IngestWarning {}

/// Result of one ingestion run.
#[derive(Clone, Debug)]
pub struct IngestOutcome {
    /// The normalized record table across all readable sources
    pub table: RecordTable,
    /// The frozen person vocabulary the run extracted against
    pub vocabulary: PersonVocabulary,
    pub warnings: Vec<IngestWarning>,
}

/// Ingest one batch of uploaded sources.
///
/// Stage one loads every workbook and runs the discovery pass across
/// all of them; only then is the vocabulary frozen and stage two
/// extracts, section by section. The vocabulary is rebuilt from scratch
/// on every call; nothing is shared across runs.
pub fn ingest_sources(sources: &[SourceInput], layout: &SectionLayout) -> IngestOutcome {
    let mut warnings = Vec::new();

    // Stage one: load everything, discover the person vocabulary.
    // Partial discovery is not allowed; a later source may introduce
    // person names absent from earlier ones.
    let mut builder = VocabularyBuilder::new();
    let mut loaded: Vec<Option<LoadedSheet>> = Vec::with_capacity(sources.len());
    for source in sources {
        match load_sheet(&source.bytes) {
            Ok(sheet) => {
                if sheet.used_fallback {
                    tracing::warn!(
                        source = %source.label,
                        used = %sheet.sheet_name,
                        "preferred sheet missing, reading first sheet"
                    );
                    warnings.push(IngestWarning::MissingSheet {
                        source: source.label.clone(),
                        requested: PREFERRED_SHEET.to_string(),
                        used: sheet.sheet_name.clone(),
                    });
                }
                discover_into(&mut builder, &sheet.grid, layout);
                loaded.push(Some(sheet));
            }
            Err(err) => {
                tracing::warn!(source = %source.label, error = %err, "skipping unreadable source");
                warnings.push(IngestWarning::UnreadableSource {
                    source: source.label.clone(),
                    reason: err.to_string(),
                });
                loaded.push(None);
            }
        }
    }
    let vocabulary = builder.freeze();

    // Stage two: extract against the frozen vocabulary.
    let mut extracted = Vec::new();
    for (source, sheet) in sources.iter().zip(loaded) {
        let Some(sheet) = sheet else { continue };

        let mut triples = Vec::new();
        for section in &layout.sections {
            if walker::section_out_of_range(&sheet.grid, section) {
                tracing::warn!(
                    source = %source.label,
                    section = %section.name,
                    "section columns out of range, skipping"
                );
                warnings.push(IngestWarning::SectionSkipped {
                    source: source.label.clone(),
                    section: section.name.clone(),
                    columns: sheet.grid.num_cols(),
                });
                continue;
            }
            triples.extend(walk_section(&sheet.grid, section, &vocabulary));
        }

        if triples.is_empty() {
            warnings.push(IngestWarning::EmptySource {
                source: source.label.clone(),
            });
        }
        extracted.push(SourceTriples {
            label: source.label.clone(),
            triples,
        });
    }

    IngestOutcome {
        table: aggregate(extracted),
        vocabulary,
        warnings,
    }
}

/// Ingest workbook files from disk. Files that cannot be read at all
/// become `UnreadableSource` warnings, like any other bad source.
pub fn ingest_files<P: AsRef<Path>>(paths: &[P], layout: &SectionLayout) -> IngestOutcome {
    let mut sources = Vec::new();
    let mut unreadable = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match SourceInput::from_path(path) {
            Ok(source) => sources.push(source),
            Err(err) => unreadable.push(IngestWarning::UnreadableSource {
                source: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    let mut outcome = ingest_sources(&sources, layout);
    outcome.warnings.splice(0..0, unreadable);
    outcome
}

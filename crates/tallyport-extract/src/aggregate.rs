//! The record aggregator: per-source triples into one normalized table.
//!
//! Values arrive as raw cells; here they are coerced to numeric
//! completions. Coercion never drops a record: a triple whose value
//! cannot be read as a number becomes a record with completion 0, which
//! is still a valid record, distinct from "no record".

use tallyport_core::{Cell, CompletionRecord, RecordTable};

use crate::walker::RawTriple;

/// All triples extracted from one source, tagged with its display label.
#[derive(Clone, Debug)]
pub struct SourceTriples {
    /// Display label, e.g. "March 2024" (file name minus extension)
    pub label: String,
    pub triples: Vec<RawTriple>,
}

/// Coerce a raw value cell to a completion count.
///
/// Numbers pass through, booleans become 1/0, numeric strings parse,
/// anything else becomes exactly 0. The result is clamped finite and
/// non-negative.
pub fn coerce_completion(value: &Cell) -> f64 {
    let n = match value {
        Cell::Number(v) => *v,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Cell::Empty => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Concatenate per-source triples into the normalized record table,
/// deriving each source's chronological key from its label.
pub fn aggregate(sources: Vec<SourceTriples>) -> RecordTable {
    let mut records = Vec::new();
    for source in sources {
        for triple in source.triples {
            records.push(CompletionRecord {
                source: source.label.clone(),
                section: triple.section,
                person: triple.person,
                task: triple.task,
                completion: coerce_completion(&triple.value),
            });
        }
    }
    RecordTable::from_records(records)
}

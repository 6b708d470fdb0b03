//! Workbook loading: raw xlsx bytes to a [`SheetGrid`].
//!
//! The exports carry their data in a sheet named "Total". When that
//! sheet is absent the first sheet is used instead; the caller decides
//! whether the fallback deserves a warning.

use std::io::Cursor;

use calamine::{DataType, Reader as CalamineReader, Xlsx};

use tallyport_core::{Cell, ExtractError, SheetGrid};

/// Sheet expected to hold the section grid.
pub const PREFERRED_SHEET: &str = "Total";

/// A grid loaded from one workbook.
#[derive(Clone, Debug)]
pub struct LoadedSheet {
    /// Name of the sheet that was actually read
    pub sheet_name: String,
    /// True when [`PREFERRED_SHEET`] was absent and the first sheet was
    /// read instead
    pub used_fallback: bool,
    pub grid: SheetGrid,
}

/// Load the section grid from raw xlsx bytes.
pub fn load_sheet(bytes: &[u8]) -> Result<LoadedSheet, ExtractError> {
    let cursor = Cursor::new(bytes);
    let mut workbook =
        Xlsx::new(cursor).map_err(|err| ExtractError::Workbook(err.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let (sheet_name, used_fallback) = if sheet_names.iter().any(|n| n == PREFERRED_SHEET) {
        (PREFERRED_SHEET.to_string(), false)
    } else {
        let first = sheet_names.first().cloned().ok_or(ExtractError::NoSheets)?;
        (first, true)
    };

    let range = match workbook.worksheet_range(&sheet_name) {
        Some(Ok(range)) => range,
        Some(Err(err)) => return Err(ExtractError::Workbook(err.to_string())),
        None => return Err(ExtractError::SheetNotFound(sheet_name)),
    };

    let mut grid = SheetGrid::new();
    for row in range.rows() {
        grid.rows.push(row.iter().map(decode_cell).collect());
    }

    Ok(LoadedSheet {
        sheet_name,
        used_fallback,
        grid,
    })
}

/// Decode one calamine cell into the domain scalar. Dates and durations
/// keep their serial form; error cells read as empty.
fn decode_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty | DataType::Error(_) => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(v) | DataType::DateTime(v) | DataType::Duration(v) => Cell::Number(*v),
        DataType::Int(v) => Cell::Number(*v as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTimeIso(s) | DataType::DurationIso(s) => Cell::Text(s.clone()),
    }
}

//! Workbook reading — one named sheet into a raw, untyped extract.
//!
//! The regulator publishes a single `.xlsx` with a known sheet name and a
//! fixed number of leading subtitle rows. This module only captures the
//! sheet's cells as rendered strings; all coercion (dates, numerics,
//! missing) happens in one place downstream, in [`crate::data::normalize`].

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::LoadError;

/// Unprocessed content of one sheet: a header row plus data rows, with the
/// configured leading rows already discarded. Ephemeral — consumed by
/// normalization.
#[derive(Debug, Clone)]
pub struct RawExtract {
    /// Sheet the extract came from, kept for error messages.
    pub sheet: String,
    /// Column labels. The first is the date-like column (whatever the sheet
    /// called it); the rest are issuer names in source order.
    pub headers: Vec<String>,
    /// Data rows, one `Option<String>` per header. `None` is an empty cell.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Read the named sheet from a workbook on disk.
pub fn read_sheet(path: &Path, sheet: &str, skip_rows: usize) -> Result<RawExtract, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    extract(&mut workbook, sheet, skip_rows)
}

/// Read the named sheet from an in-memory workbook (uploaded bytes).
pub fn read_sheet_from<R: Read + Seek>(
    reader: R,
    sheet: &str,
    skip_rows: usize,
) -> Result<RawExtract, LoadError> {
    let mut workbook = Xlsx::new(reader)?;
    extract(&mut workbook, sheet, skip_rows)
}

fn extract<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    sheet: &str,
    skip_rows: usize,
) -> Result<RawExtract, LoadError> {
    if !workbook.sheet_names().iter().any(|name| name.as_str() == sheet) {
        return Err(LoadError::SheetMissing(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;
    from_range(&range, sheet, skip_rows)
}

fn from_range(range: &Range<Data>, sheet: &str, skip_rows: usize) -> Result<RawExtract, LoadError> {
    let mut rows = range.rows().skip(skip_rows);

    let header_row = rows.next().ok_or_else(|| LoadError::NoDataRows {
        sheet: sheet.to_string(),
        skip: skip_rows,
    })?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| match render_cell(cell) {
            Some(label) => label,
            None => format!("column_{idx}"),
        })
        .collect();
    if headers.len() < 2 {
        return Err(LoadError::NoIssuerColumns(sheet.to_string()));
    }

    let width = headers.len();
    let data_rows: Vec<Vec<Option<String>>> = rows
        .map(|row| {
            // Pad short rows so every row has one cell per header.
            (0..width)
                .map(|idx| row.get(idx).and_then(render_cell))
                .collect()
        })
        .collect();
    if data_rows.is_empty() {
        return Err(LoadError::NoDataRows {
            sheet: sheet.to_string(),
            skip: skip_rows,
        });
    }

    Ok(RawExtract {
        sheet: sheet.to_string(),
        headers,
        rows: data_rows,
    })
}

/// Render a cell to the string the normalization pipeline coerces from.
///
/// Spreadsheet datetimes become ISO dates so the date column parses
/// uniformly; empty, boolean, error and duration cells become `None`.
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.date().format("%Y-%m-%d").to_string()),
        Data::DateTimeIso(s) => s.get(..10).map(str::to_string),
        Data::Bool(_) | Data::Error(_) | Data::DurationIso(_) => None,
    }
}

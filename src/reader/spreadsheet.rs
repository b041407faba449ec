//! Excel / ODS input (first worksheet)

use crate::error::{CarbonImportError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub fn read_spreadsheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CarbonImportError::SpreadsheetRead(format!("{}: {}", path.display(), e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| CarbonImportError::SpreadsheetRead(e.to_string()))?,
        None => return Ok(Vec::new()),
    };

    // the range starts at the first used cell; pad rows back to row 1 so
    // row numbers match the sheet
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row];
    rows.extend(range.rows().map(|row| row.iter().map(cell_to_string).collect()));

    Ok(rows)
}

/// Stringify a cell the way it would appear in a CSV export
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

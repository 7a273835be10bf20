//! Spreadsheet parsing
//!
//! Reads `.xlsx`/`.xls` uploads. Only the first sheet is considered and
//! its first row becomes the field keys, matching how the stop lists are
//! exported by dispatch tooling.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{Error, Result};

/// A parsed spreadsheet row keyed by header name; empty cells are absent
pub type Row = HashMap<String, String>;

/// Check an uploaded filename for a supported spreadsheet extension
pub fn is_spreadsheet(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Parse workbook bytes into header-keyed rows
pub fn parse_rows(data: &[u8]) -> Result<Vec<Row>> {
    let cursor = Cursor::new(data);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| Error::parse(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::parse("workbook has no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| Error::parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Err(Error::parse("spreadsheet is empty")),
    };

    let mut parsed = Vec::new();
    for row in rows {
        let mut record = Row::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = cell_to_string(cell);
            if !value.is_empty() {
                record.insert(header.clone(), value);
            }
        }
        // Fully blank rows are common at the bottom of exports
        if !record.is_empty() {
            parsed.push(record);
        }
    }

    Ok(parsed)
}

/// Render a cell the way it reads in the sheet
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Excel stores integers as floats; keep "12" rather than "12.0"
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

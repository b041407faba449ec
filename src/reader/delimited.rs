//! CSV input

use crate::error::Result;
use csv::ReaderBuilder;
use std::path::Path;

/// Read every record of a CSV file as raw strings
///
/// The header is returned as the first row; nothing is interpreted here.
pub fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path)?;
    let content = decode(&bytes);
    parse_csv(&content)
}

/// Parse CSV text; every line outside a quoted field is one row
pub fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let content = keep_blank_lines(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(rows)
}

/// Turn blank lines into a single empty field
///
/// The csv reader drops empty lines entirely, which would shift the row
/// number of everything below them.
fn keep_blank_lines(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_quotes = false;
    let mut line_start = true;
    let mut field_start = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    // escaped quote
                    chars.next();
                    out.push('"');
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        let blank_line = c == '\n' || (c == '\r' && chars.peek() == Some(&'\n'));
        if line_start && blank_line {
            out.push_str("\"\"");
        }
        // quotes only open a quoted field at its first character
        if c == '"' && field_start {
            in_quotes = true;
        }
        line_start = c == '\n';
        field_start = matches!(c, ',' | '\n' | '\r');
        out.push(c);
    }

    out
}

/// UTF-8, falling back to Windows-874 (Thai) for legacy exports
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, had_errors) = encoding_rs::WINDOWS_874.decode(bytes);
            if had_errors {
                tracing::warn!("input is neither UTF-8 nor Windows-874; some characters were replaced");
            }
            content.into_owned()
        }
    }
}

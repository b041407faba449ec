mod delimited;
mod spreadsheet;

pub use delimited::parse_csv;
pub use spreadsheet::cell_to_string;

use crate::error::{CarbonImportError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Spreadsheet,
}

#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: InputKind,
}

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

pub fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if ext == "csv" {
        Some(InputKind::Csv)
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        Some(InputKind::Spreadsheet)
    } else {
        None
    }
}

fn input_file(path: &Path) -> Option<InputFile> {
    let kind = input_kind(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // lock files left behind by Excel
    if file_name.starts_with("~$") {
        return None;
    }

    Some(InputFile {
        path: path.to_path_buf(),
        file_name,
        kind,
    })
}

/// Expand the given paths into import files
///
/// Files are taken as given (and must have a supported extension);
/// directories contribute their direct children, sorted by name.
pub fn scan_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(CarbonImportError::FileNotFound(path.display().to_string()));
        }

        if path.is_file() {
            let file = input_file(path)
                .ok_or_else(|| CarbonImportError::UnsupportedFile(path.display().to_string()))?;
            files.push(file);
            continue;
        }

        let mut found: Vec<InputFile> = WalkDir::new(path)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| input_file(e.path()))
            .collect();
        found.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        tracing::debug!(folder = %path.display(), files = found.len(), "scanned folder");
        files.extend(found);
    }

    Ok(files)
}

/// Read a file into raw rows, header included
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(CarbonImportError::FileNotFound(path.display().to_string()));
    }

    let mut rows = match input_kind(path) {
        Some(InputKind::Csv) => delimited::read_csv(path)?,
        Some(InputKind::Spreadsheet) => spreadsheet::read_spreadsheet(path)?,
        None => return Err(CarbonImportError::UnsupportedFile(path.display().to_string())),
    };

    trim_trailing_blank_rows(&mut rows);
    tracing::debug!(file = %path.display(), rows = rows.len(), "read input");
    Ok(rows)
}

/// Drop fully empty rows at the end of a sheet
pub fn trim_trailing_blank_rows(rows: &mut Vec<Vec<String>>) {
    while rows
        .last()
        .map(|row| row.iter().all(|cell| cell.trim().is_empty()))
        .unwrap_or(false)
    {
        rows.pop();
    }
}

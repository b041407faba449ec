//! Template tests
//!
//! Generated templates must read back and validate cleanly

use carbon_import::reader;
use carbon_import::template::{write_template, TemplateFormat, TEMPLATE_HEADER};
use carbon_import_common::{CategoryRegistry, RecordImportValidator};
use tempfile::tempdir;

#[test]
fn test_csv_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("template.csv");
    let registry = CategoryRegistry::tgo();

    write_template(&path, TemplateFormat::Csv, &registry).expect("CSV template failed");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("Date,Category,Amount,Unit,Description"));

    let rows = reader::read_rows(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], TEMPLATE_HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>());

    let validations = RecordImportValidator::new(&registry).validate_rows(&rows);
    assert!(validations.iter().all(|v| v.is_valid()));
}

#[test]
fn test_xlsx_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("template.xlsx");
    let registry = CategoryRegistry::tgo();

    write_template(&path, TemplateFormat::Xlsx, &registry).expect("XLSX template failed");
    assert!(path.exists());

    // first sheet holds the records
    let rows = reader::read_rows(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "Date");
    assert_eq!(rows[1][1], "grid_electricity");
    assert_eq!(rows[1][2], "1500");

    let validations = RecordImportValidator::new(&registry).validate_rows(&rows);
    assert!(validations.iter().all(|v| v.is_valid()));
}

#[test]
fn test_template_bad_path() {
    let registry = CategoryRegistry::tgo();
    let path = std::path::Path::new("/nonexistent/dir/template.csv");
    assert!(write_template(path, TemplateFormat::Csv, &registry).is_err());
}

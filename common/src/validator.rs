//! Import row validation
//!
//! Turns raw spreadsheet rows into [`EmissionCandidate`]s. Checks run in a
//! fixed order per row (columns, date, category, amount, unit) and stop at
//! the first failure. Rows never affect each other and nothing here touches
//! the network.

use crate::registry::CategoryRegistry;
use crate::types::{EmissionCandidate, ImportOutcome, ImportReport, ImportRow};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

/// Date, category, amount, unit
pub const MIN_COLUMNS: usize = 4;

/// Row-level validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Not enough columns (need at least 4)")]
    NotEnoughColumns,

    #[error("Invalid date '{0}'. Use YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),

    #[error("Invalid category {0}. Please use known categories.")]
    InvalidCategory(String),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid unit {unit} for category {category}. Expected {expected}")]
    UnitMismatch {
        unit: String,
        category: String,
        expected: String,
    },

    #[error("Invalid period {month}/{year}")]
    InvalidPeriod { month: u32, year: i32 },
}

/// Validation result of one data row
#[derive(Debug, Clone, PartialEq)]
pub struct RowValidation {
    pub row_index: usize,
    pub result: Result<EmissionCandidate, RowError>,
}

impl RowValidation {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    /// Outcome for a row that will not be submitted
    ///
    /// Valid rows become `Success` without a CO2e value.
    pub fn to_outcome(&self) -> ImportOutcome {
        match &self.result {
            Ok(candidate) => ImportOutcome::success(self.row_index, candidate.category(), "Valid", None),
            Err(error) => ImportOutcome::validation_error(self.row_index, error),
        }
    }
}

impl ImportReport {
    /// Report built from validation alone, nothing submitted
    pub fn validation_only(source: impl Into<String>, validations: &[RowValidation]) -> Self {
        Self::from_outcomes(source, validations.iter().map(RowValidation::to_outcome))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordImportValidator<'a> {
    registry: &'a CategoryRegistry,
}

impl<'a> RecordImportValidator<'a> {
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        self.registry
    }

    /// Validate a full table; the first row is the header
    ///
    /// Output is in source order, numbered from 2.
    pub fn validate_rows(&self, rows: &[Vec<String>]) -> Vec<RowValidation> {
        data_rows(rows)
            .map(|row| self.validate(&row))
            .collect()
    }

    /// Validate one row
    pub fn validate(&self, row: &ImportRow) -> RowValidation {
        RowValidation {
            row_index: row.row_index,
            result: self.validate_row(row),
        }
    }

    pub fn validate_row(&self, row: &ImportRow) -> Result<EmissionCandidate, RowError> {
        if row.filled_columns < MIN_COLUMNS {
            return Err(RowError::NotEnoughColumns);
        }

        let date = parse_record_date(&row.raw_date)
            .ok_or_else(|| RowError::InvalidDate(row.raw_date.clone()))?;

        let category = row.raw_category.trim().to_lowercase();
        let expected_unit = self
            .registry
            .unit_for(&category)
            .ok_or_else(|| RowError::InvalidCategory(category.clone()))?;

        let amount = parse_amount(&row.raw_amount).ok_or(RowError::InvalidAmount)?;

        let unit = row.raw_unit.trim().to_lowercase();
        if unit != expected_unit {
            return Err(RowError::UnitMismatch {
                unit,
                category,
                expected: expected_unit.to_string(),
            });
        }

        EmissionCandidate::new(self.registry, &category, amount, &unit, date.month(), date.year())
            .map(|c| c.with_description(row.raw_description.clone()))
    }
}

/// Data rows of a table
///
/// The first non-blank row is the header; blank rows above it are sheet
/// padding. Rows keep their 1-based position in the table, so with the
/// header on row 1 the first data row is 2.
pub fn data_rows(rows: &[Vec<String>]) -> impl Iterator<Item = ImportRow> + '_ {
    let first_data = rows
        .iter()
        .position(|cells| !is_blank(cells))
        .map_or(rows.len(), |header| header + 1);

    rows.iter()
        .enumerate()
        .skip(first_data)
        .map(|(i, cells)| ImportRow::from_cells(i + 1, cells))
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.trim().is_empty())
}

/// Parse a record date
///
/// Values with a 4-digit year first are read as `YYYY-MM-DD` (or `YYYY/MM/DD`,
/// optionally followed by a time); anything else as day/month/year with
/// `/`, `-` or `.` separators. Years outside 1000..=9999 are rejected.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    lazy_static::lazy_static! {
        static ref ISO_RE: Regex = Regex::new(
            r"^(\d{4})([-/])(\d{1,2})([-/])(\d{1,2})(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$"
        ).unwrap();
        static ref DMY_RE: Regex = Regex::new(
            r"^(\d{1,2})([/.\-])(\d{1,2})([/.\-])(\d{4})(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?$"
        ).unwrap();
    }

    let value = raw.trim();

    let (year, month, day) = if let Some(cap) = ISO_RE.captures(value) {
        // "2024-01/05" is not a date
        if cap[2] != cap[4] {
            return None;
        }
        (cap[1].parse().ok()?, cap[3].parse().ok()?, cap[5].parse().ok()?)
    } else if let Some(cap) = DMY_RE.captures(value) {
        if cap[2] != cap[4] {
            return None;
        }
        (cap[5].parse().ok()?, cap[3].parse().ok()?, cap[1].parse().ok()?)
    } else {
        return None;
    };

    if !(1000..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a non-negative, finite amount
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CategoryDefinition;
    use crate::types::{OutcomeStatus, Scope};

    const HEADER: &[&str] = &["Date", "Category", "Amount", "Unit"];

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn table(data: &[&[&str]]) -> Vec<Vec<String>> {
        std::iter::once(row(HEADER))
            .chain(data.iter().map(|r| row(r)))
            .collect()
    }

    fn validate_one(registry: &CategoryRegistry, values: &[&str]) -> Result<EmissionCandidate, RowError> {
        let validator = RecordImportValidator::new(registry);
        let mut results = validator.validate_rows(&table(&[values]));
        assert_eq!(results.len(), 1);
        results.remove(0).result
    }

    #[test]
    fn test_valid_dmy_row() {
        let registry = CategoryRegistry::tgo();
        let candidate = validate_one(&registry, &["15/01/2024", "grid_electricity", "500", "kwh"]).unwrap();

        assert_eq!(candidate.category(), "grid_electricity");
        assert_eq!(candidate.amount(), 500.0);
        assert_eq!(candidate.unit(), "kwh");
        assert_eq!(candidate.month(), 1);
        assert_eq!(candidate.year(), 2024);
    }

    #[test]
    fn test_unit_mismatch() {
        let registry = CategoryRegistry::tgo();
        let err = validate_one(&registry, &["2024-01-20", "gas_diesel_oil", "100", "liter"]).unwrap_err();

        assert_eq!(
            err,
            RowError::UnitMismatch {
                unit: "liter".into(),
                category: "gas_diesel_oil".into(),
                expected: "litre".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid unit liter for category gas_diesel_oil. Expected litre"
        );
    }

    #[test]
    fn test_bad_date() {
        let registry = CategoryRegistry::tgo();
        let err = validate_one(&registry, &["bad-date", "grid_electricity", "500", "kwh"]).unwrap_err();

        assert_eq!(err, RowError::InvalidDate("bad-date".into()));
        assert!(err.to_string().contains("bad-date"));
    }

    #[test]
    fn test_unknown_category() {
        let registry = CategoryRegistry::tgo();
        let err = validate_one(&registry, &["15/01/2024", "unknown_fuel_xyz", "10", "kg"]).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid category unknown_fuel_xyz. Please use known categories."
        );
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let registry = CategoryRegistry::tgo();
        let lower = validate_one(&registry, &["2024-02-01", "electricity", "1", "kwh"]);
        let upper = validate_one(&registry, &["2024-02-01", "Electricity", "1", "kwh"]);
        assert_eq!(lower, upper);

        let mixed = validate_one(&registry, &["2024-02-01", " GRID_Electricity ", "1", "KWH"]).unwrap();
        assert_eq!(mixed.category(), "grid_electricity");
    }

    #[test]
    fn test_not_enough_columns() {
        let registry = CategoryRegistry::tgo();
        for values in [
            &["15/01/2024", "grid_electricity", "500"][..],
            &["15/01/2024", "", "500", "kwh"][..],
            &["not", "a", "row"][..],
            &[][..],
        ] {
            let err = validate_one(&registry, values).unwrap_err();
            assert_eq!(err, RowError::NotEnoughColumns);
            assert!(err.to_string().contains("Not enough columns"));
        }
    }

    #[test]
    fn test_invalid_amount() {
        let registry = CategoryRegistry::tgo();
        for amount in ["abc", "-5", "NaN", "inf", "1,000"] {
            let err = validate_one(&registry, &["2024-01-01", "r22", amount, "kg"]).unwrap_err();
            assert_eq!(err, RowError::InvalidAmount, "amount {:?}", amount);
        }
        let zero = validate_one(&registry, &["2024-01-01", "r22", " 0 ", "kg"]).unwrap();
        assert_eq!(zero.amount(), 0.0);
    }

    #[test]
    fn test_description_column_ignored() {
        let registry = CategoryRegistry::tgo();
        let candidate = validate_one(&registry, &["2024-03-05", "r32", "1.5", "kg", "chiller #2"]).unwrap();
        assert_eq!(candidate.description(), Some("chiller #2"));

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_check_order() {
        let registry = CategoryRegistry::tgo();
        // bad date reported before bad category
        let err = validate_one(&registry, &["31/02/2024", "nope", "x", "y"]).unwrap_err();
        assert!(matches!(err, RowError::InvalidDate(_)));
        // bad category before bad amount
        let err = validate_one(&registry, &["2024-01-01", "nope", "x", "y"]).unwrap_err();
        assert!(matches!(err, RowError::InvalidCategory(_)));
        // bad amount before bad unit
        let err = validate_one(&registry, &["2024-01-01", "r22", "x", "y"]).unwrap_err();
        assert_eq!(err, RowError::InvalidAmount);
    }

    #[test]
    fn test_rows_are_independent() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);

        let results = validator.validate_rows(&table(&[
            &["15/01/2024", "grid_electricity", "500", "kwh"],
            &["bad-date", "grid_electricity", "500", "kwh"],
            &["2024-01-20", "gas_diesel_oil", "100", "litre"],
        ]));

        let rows: Vec<usize> = results.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![2, 3, 4]);
        assert!(results[0].is_valid());
        assert!(!results[1].is_valid());
        assert!(results[2].is_valid());
    }

    #[test]
    fn test_swapping_rows_keeps_outcomes() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);
        let a: &[&str] = &["15/01/2024", "grid_electricity", "500", "kwh"];
        let b: &[&str] = &["2024-01-20", "r22", "3", "kg"];

        let forward = validator.validate_rows(&table(&[a, b]));
        let backward = validator.validate_rows(&table(&[b, a]));

        assert_eq!(forward[0].result, backward[1].result);
        assert_eq!(forward[1].result, backward[0].result);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);
        let rows = table(&[&["2024-01-20", "gas_diesel_oil", "100", "liter"]]);

        assert_eq!(validator.validate_rows(&rows), validator.validate_rows(&rows));
    }

    #[test]
    fn test_header_only_table() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);
        assert!(validator.validate_rows(&table(&[])).is_empty());
        assert!(validator.validate_rows(&[]).is_empty());
    }

    #[test]
    fn test_fixture_registry() {
        let registry = CategoryRegistry::from_definitions(vec![CategoryDefinition {
            key: "steam".into(),
            name: "Purchased Steam".into(),
            unit: "GJ".into(),
            scope: Scope::Scope2,
            emission_factor: 66.0,
            group: String::new(),
        }])
        .unwrap();

        assert!(validate_one(&registry, &["2024-05-01", "steam", "4", "gj"]).is_ok());
        assert!(matches!(
            validate_one(&registry, &["2024-05-01", "grid_electricity", "4", "kwh"]),
            Err(RowError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_validation_only_report() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);
        let results = validator.validate_rows(&table(&[
            &["15/01/2024", "grid_electricity", "500", "kwh"],
            &["15/01/2024", "grid_electricity"],
        ]));

        let report = ImportReport::validation_only("upload.csv", &results);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.outcomes[1].status, OutcomeStatus::ValidationError);
        assert_eq!(report.outcomes[1].row_index, 3);
        assert_eq!(report.outcomes[0].co2_equivalent, None);
    }

    #[test]
    fn test_parse_record_date_forms() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);

        assert_eq!(parse_record_date("2024-01-20"), d(2024, 1, 20));
        assert_eq!(parse_record_date(" 2024/1/5 "), d(2024, 1, 5));
        assert_eq!(parse_record_date("2024-01-20T08:30:00"), d(2024, 1, 20));
        assert_eq!(parse_record_date("2024-01-20 00:00:00"), d(2024, 1, 20));
        assert_eq!(parse_record_date("15/01/2024"), d(2024, 1, 15));
        assert_eq!(parse_record_date("05-03-2024"), d(2024, 3, 5));
        assert_eq!(parse_record_date("5.3.2024"), d(2024, 3, 5));
        // day first, never month first
        assert_eq!(parse_record_date("02/03/2024"), d(2024, 3, 2));
        assert_eq!(parse_record_date("2024-01-20T08:30:00.000Z"), d(2024, 1, 20));
        assert_eq!(parse_record_date("15/01/2024 08:30"), d(2024, 1, 15));
    }

    #[test]
    fn test_parse_record_date_rejects() {
        for value in ["", "bad-date", "2024-13-01", "31/02/2024", "01/15/2024", "2024-01/05", "24-01-15", "15/01/24",
            "2024-01-20 garbage", "2024-01-20T", "15/01/2024 junk", "15/01/0999", "0000-01-01",
        ] {
            assert_eq!(parse_record_date(value), None, "value {:?}", value);
        }
    }

    #[test]
    fn test_out_of_range_year_cites_raw_date() {
        let registry = CategoryRegistry::tgo();
        let err = validate_one(&registry, &["15/01/0999", "grid_electricity", "500", "kwh"]).unwrap_err();
        assert_eq!(err, RowError::InvalidDate("15/01/0999".into()));
        assert!(err.to_string().contains("'15/01/0999'"));
    }

    #[test]
    fn test_trailing_text_after_date() {
        let registry = CategoryRegistry::tgo();
        let err = validate_one(&registry, &["2024-01-20 garbage", "grid_electricity", "500", "kwh"]).unwrap_err();
        assert_eq!(err, RowError::InvalidDate("2024-01-20 garbage".into()));
    }

    #[test]
    fn test_leading_blank_rows_before_header() {
        let registry = CategoryRegistry::tgo();
        let validator = RecordImportValidator::new(&registry);
        let rows = vec![
            vec![],
            row(&["", " "]),
            row(HEADER),
            row(&["15/01/2024", "grid_electricity", "500", "kwh"]),
            row(&[]),
            row(&["15/01/2024", "grid_electricity", "x", "kwh"]),
        ];

        let results = validator.validate_rows(&rows);
        let indices: Vec<usize> = results.iter().map(|r| r.row_index).collect();
        assert_eq!(indices, vec![4, 5, 6]);
        assert!(results[0].is_valid());
        assert_eq!(results[1].result, Err(RowError::NotEnoughColumns));
        assert_eq!(results[2].result, Err(RowError::InvalidAmount));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500"), Some(500.0));
        assert_eq!(parse_amount(" 12.75 "), Some(12.75));
        assert_eq!(parse_amount("-1"), None);
        assert_eq!(parse_amount(""), None);
    }
}

//! Import data model
//!
//! Shared by the CLI and anything else that drives an import:
//! - ImportRow: one raw spreadsheet line
//! - EmissionCandidate: a validated row, ready for submission
//! - ImportOutcome / ImportReport: per-row results of an import

use crate::registry::CategoryRegistry;
use crate::validator::RowError;
use serde::{Deserialize, Serialize};

/// GHG Protocol scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Scope {
    /// Direct emissions (combustion, fugitive)
    Scope1,
    /// Indirect emissions from purchased energy
    Scope2,
}

impl Scope {
    pub fn number(self) -> u8 {
        match self {
            Scope::Scope1 => 1,
            Scope::Scope2 => 2,
        }
    }
}

impl TryFrom<u8> for Scope {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Scope::Scope1),
            2 => Ok(Scope::Scope2),
            other => Err(format!("unsupported scope: {}", other)),
        }
    }
}

impl From<Scope> for u8 {
    fn from(scope: Scope) -> Self {
        scope.number()
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scope {}", self.number())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "1" | "s1" | "scope1" => Ok(Scope::Scope1),
            "2" | "s2" | "scope2" => Ok(Scope::Scope2),
            _ => Err(format!("Unknown scope: {}. Use 1 or 2", s)),
        }
    }
}

/// One data line of an import file
///
/// `row_index` counts the header as row 1, so the first data row is 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub row_index: usize,
    pub raw_date: String,
    pub raw_category: String,
    pub raw_amount: String,
    pub raw_unit: String,
    pub raw_description: Option<String>,
    /// Number of cells that are non-empty after trimming
    pub filled_columns: usize,
}

impl ImportRow {
    /// Build a row from raw cells in `date, category, amount, unit[, description]` order
    pub fn from_cells(row_index: usize, cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();

        Self {
            row_index,
            raw_date: cell(0),
            raw_category: cell(1),
            raw_amount: cell(2),
            raw_unit: cell(3),
            raw_description: cells.get(4).filter(|d| !d.trim().is_empty()).cloned(),
            filled_columns: cells.iter().filter(|c| !c.trim().is_empty()).count(),
        }
    }
}

/// A row that passed validation
///
/// Fields are private: the only way in is [`EmissionCandidate::new`], which
/// checks the unit against the registry, so `unit == registry.unit_for(category)`
/// holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionCandidate {
    category: String,
    amount: f64,
    unit: String,
    month: u32,
    year: i32,
    #[serde(skip)]
    description: Option<String>,
}

impl EmissionCandidate {
    pub fn new(
        registry: &CategoryRegistry,
        category: &str,
        amount: f64,
        unit: &str,
        month: u32,
        year: i32,
    ) -> Result<Self, RowError> {
        let category = category.trim().to_lowercase();
        let unit = unit.trim().to_lowercase();

        let expected = registry
            .unit_for(&category)
            .ok_or_else(|| RowError::InvalidCategory(category.clone()))?;

        if !amount.is_finite() || amount < 0.0 {
            return Err(RowError::InvalidAmount);
        }

        if unit != expected {
            return Err(RowError::UnitMismatch {
                unit,
                category,
                expected: expected.to_string(),
            });
        }

        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(RowError::InvalidPeriod { month, year });
        }

        Ok(Self {
            category,
            amount,
            unit,
            month,
            year,
            description: None,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.map(|d| d.trim().to_string());
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Per-row result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeStatus {
    Success,
    ValidationError,
    ApiError,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::ValidationError => write!(f, "validation error"),
            OutcomeStatus::ApiError => write!(f, "api error"),
        }
    }
}

/// Result of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub row_index: usize,
    pub status: OutcomeStatus,
    pub message: String,

    /// Only set on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_equivalent: Option<f64>,

    /// Normalized category, when the row got far enough to have one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ImportOutcome {
    pub fn success(
        row_index: usize,
        category: &str,
        message: impl Into<String>,
        co2_equivalent: Option<f64>,
    ) -> Self {
        Self {
            row_index,
            status: OutcomeStatus::Success,
            message: message.into(),
            co2_equivalent,
            category: Some(category.to_string()),
        }
    }

    pub fn validation_error(row_index: usize, error: &RowError) -> Self {
        Self {
            row_index,
            status: OutcomeStatus::ValidationError,
            message: error.to_string(),
            co2_equivalent: None,
            category: None,
        }
    }

    pub fn api_error(row_index: usize, category: &str, message: impl Into<String>) -> Self {
        Self {
            row_index,
            status: OutcomeStatus::ApiError,
            message: message.into(),
            co2_equivalent: None,
            category: Some(category.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregated result of one import file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Source file name
    #[serde(default)]
    pub source: String,
    pub success_count: usize,
    pub error_count: usize,
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Build a report; outcomes are ordered by source row
    pub fn from_outcomes(
        source: impl Into<String>,
        outcomes: impl IntoIterator<Item = ImportOutcome>,
    ) -> Self {
        let mut outcomes: Vec<ImportOutcome> = outcomes.into_iter().collect();
        outcomes.sort_by_key(|o| o.row_index);

        let mut report = Self::new(source);
        for outcome in outcomes {
            report.push(outcome);
        }
        report
    }

    pub fn push(&mut self, outcome: ImportOutcome) {
        if outcome.is_success() {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn total_rows(&self) -> usize {
        self.outcomes.len()
    }

    pub fn validation_error_count(&self) -> usize {
        self.count_status(OutcomeStatus::ValidationError)
    }

    pub fn api_error_count(&self) -> usize {
        self.count_status(OutcomeStatus::ApiError)
    }

    /// Sum of CO2e over successful rows
    pub fn total_co2_equivalent(&self) -> f64 {
        self.outcomes.iter().filter_map(|o| o.co2_equivalent).sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ImportOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    fn count_status(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

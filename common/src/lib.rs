//! Carbon Import Common Library
//!
//! Emission record validation and GHG scope classification, shared by the
//! CLI and any other front end. Nothing in this crate performs I/O beyond
//! loading a registry file on request.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod registry;
pub mod types;
pub mod validator;

pub use aggregate::{
    aggregate_by_category, aggregate_by_scope, report_emissions, CategoryTotals, ScopeBreakdown,
};
pub use classifier::{CategoryScopeClassifier, ScopeBasis, ScopeClassification};
pub use error::{Error, Result};
pub use registry::{CategoryDefinition, CategoryRegistry, ScopeKeywords};
pub use types::{EmissionCandidate, ImportOutcome, ImportReport, ImportRow, OutcomeStatus, Scope};
pub use validator::{parse_amount, parse_record_date, RecordImportValidator, RowError, RowValidation, MIN_COLUMNS};

//! Console and JSON output of import reports

use crate::error::Result;
use carbon_import_common::{
    aggregate_by_category, aggregate_by_scope, report_emissions, CategoryScopeClassifier, CategoryTotals,
    ImportReport, OutcomeStatus, Scope, ScopeBreakdown,
};
use serde::Serialize;
use std::path::Path;

/// Everything one `validate` or `import` run produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub generated_at: String,
    pub dry_run: bool,
    pub success_count: usize,
    pub error_count: usize,
    pub total_co2_equivalent: f64,
    pub by_scope: ScopeBreakdown,
    pub by_category: CategoryTotals,
    pub reports: Vec<ImportReport>,
}

impl RunSummary {
    pub fn new(classifier: &CategoryScopeClassifier<'_>, reports: Vec<ImportReport>, dry_run: bool) -> Self {
        let emissions: Vec<(&str, f64)> = reports.iter().flat_map(report_emissions).collect();
        let by_scope = aggregate_by_scope(classifier, emissions.iter().copied());
        let by_category = aggregate_by_category(emissions.iter().copied());

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            dry_run,
            success_count: reports.iter().map(|r| r.success_count).sum(),
            error_count: reports.iter().map(|r| r.error_count).sum(),
            total_co2_equivalent: by_scope.total(),
            by_scope,
            by_category,
            reports,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn print(&self) {
        println!("Rows: {} ok, {} failed", self.success_count, self.error_count);
        if self.by_scope.total() > 0.0 {
            for scope in [Scope::Scope1, Scope::Scope2] {
                println!(
                    "  {}: {:.2} kgCO2e ({:.1}%)",
                    scope,
                    self.by_scope.get(scope),
                    self.by_scope.percentage(scope)
                );
            }
            println!("  Total: {:.2} kgCO2e", self.by_scope.total());
        }
    }
}

/// Per-file lines: counts, then every failed row
pub fn print_report(report: &ImportReport) {
    println!(
        "  {}: {} ok / {} failed ({} rows)",
        report.source,
        report.success_count,
        report.error_count,
        report.total_rows()
    );

    for outcome in report.errors() {
        let tag = match outcome.status {
            OutcomeStatus::ValidationError => "invalid",
            OutcomeStatus::ApiError => "rejected",
            OutcomeStatus::Success => continue,
        };
        println!("    row {:>4} [{}] {}", outcome.row_index, tag, outcome.message);
    }
}

//! Scope and category totals for dashboards and summaries

use crate::classifier::CategoryScopeClassifier;
use crate::types::{ImportReport, Scope};
use serde::Serialize;
use std::collections::BTreeMap;

/// CO2e split by scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeBreakdown {
    pub scope1: f64,
    pub scope2: f64,
}

impl ScopeBreakdown {
    pub fn add(&mut self, scope: Scope, value: f64) {
        match scope {
            Scope::Scope1 => self.scope1 += value,
            Scope::Scope2 => self.scope2 += value,
        }
    }

    pub fn get(&self, scope: Scope) -> f64 {
        match scope {
            Scope::Scope1 => self.scope1,
            Scope::Scope2 => self.scope2,
        }
    }

    pub fn total(&self) -> f64 {
        self.scope1 + self.scope2
    }

    /// Share of the total in percent; 0 when there is nothing
    pub fn percentage(&self, scope: Scope) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.get(scope) / total * 100.0
        } else {
            0.0
        }
    }
}

/// Bucket (category, CO2e) pairs into scopes
pub fn aggregate_by_scope<'a, I>(classifier: &CategoryScopeClassifier<'_>, items: I) -> ScopeBreakdown
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut breakdown = ScopeBreakdown::default();
    for (category, value) in items {
        breakdown.add(classifier.scope_of(category), value);
    }
    breakdown
}

/// Category key -> CO2e, ordered by key
pub type CategoryTotals = BTreeMap<String, f64>;

/// Sum CO2e per normalized category key
pub fn aggregate_by_category<'a, I>(items: I) -> CategoryTotals
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut totals = BTreeMap::new();
    for (category, value) in items {
        *totals.entry(category.trim().to_lowercase()).or_insert(0.0) += value;
    }
    totals
}

/// (category, CO2e) pairs of the successful rows in a report
pub fn report_emissions(report: &ImportReport) -> impl Iterator<Item = (&str, f64)> {
    report.outcomes.iter().filter_map(|o| {
        match (o.is_success(), o.category.as_deref(), o.co2_equivalent) {
            (true, Some(category), Some(co2)) => Some((category, co2)),
            _ => None,
        }
    })
}

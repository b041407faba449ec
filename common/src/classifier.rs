//! GHG scope classification
//!
//! Registry lookup first; categories missing from the registry fall back to
//! keyword matching. Keyword order is fixed: scope 2 keywords are tried
//! before scope 1 keywords, and a miss on both defaults to scope 1.

use crate::registry::CategoryRegistry;
use crate::types::Scope;
use serde::Serialize;

/// How a scope was decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "keyword")]
pub enum ScopeBasis {
    Registry,
    Keyword(String),
    Default,
}

impl std::fmt::Display for ScopeBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeBasis::Registry => write!(f, "registry"),
            ScopeBasis::Keyword(keyword) => write!(f, "keyword \"{}\"", keyword),
            ScopeBasis::Default => write!(f, "default"),
        }
    }
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeClassification {
    /// Normalized display key
    pub key: String,
    pub scope: Scope,
    pub basis: ScopeBasis,
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryScopeClassifier<'a> {
    registry: &'a CategoryRegistry,
}

impl<'a> CategoryScopeClassifier<'a> {
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry }
    }

    /// Classify a category label
    pub fn classify(&self, category: &str) -> ScopeClassification {
        let key = normalize_key(category);

        if let Some(scope) = self.registry.scope_for(&key) {
            return ScopeClassification {
                key,
                scope,
                basis: ScopeBasis::Registry,
            };
        }

        // "heavy_fuel_oil" should match "heavy fuel oil"
        let spaced = key.replace('_', " ");
        let keywords = self.registry.keywords();

        let matched = find_keyword(&key, &spaced, &keywords.scope2)
            .map(|k| (Scope::Scope2, k))
            .or_else(|| find_keyword(&key, &spaced, &keywords.scope1).map(|k| (Scope::Scope1, k)));

        match matched {
            Some((scope, keyword)) => ScopeClassification {
                key,
                scope,
                basis: ScopeBasis::Keyword(keyword.to_string()),
            },
            None => ScopeClassification {
                key,
                scope: Scope::Scope1,
                basis: ScopeBasis::Default,
            },
        }
    }

    pub fn scope_of(&self, category: &str) -> Scope {
        self.classify(category).scope
    }

    /// Registry-only lookup; `None` means the category is not registered
    pub fn registry_scope(&self, category: &str) -> Option<Scope> {
        self.registry.scope_for(&normalize_key(category))
    }
}

fn normalize_key(category: &str) -> String {
    category.trim().to_lowercase()
}

fn find_keyword<'k>(key: &str, spaced: &str, keywords: &'k [String]) -> Option<&'k str> {
    keywords
        .iter()
        .find(|k| key.contains(k.as_str()) || spaced.contains(k.as_str()))
        .map(|k| k.as_str())
}

//! Category registry
//!
//! Known emission categories with their required unit, GHG scope and
//! emission factor. The registry is immutable once built and is handed to the
//! validator and the classifier, so tests can swap in a small fixture.

use crate::error::{Error, Result};
use crate::types::Scope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub unit: String,
    pub scope: Scope,
    /// kg CO2e per unit
    #[serde(default, alias = "factor")]
    pub emission_factor: f64,
    #[serde(default)]
    pub group: String,
}

/// Fallback keyword tables used when a category is not in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeKeywords {
    pub scope2: Vec<String>,
    pub scope1: Vec<String>,
}

const SCOPE2_KEYWORDS: &[&str] = &["electric", "electricity", "grid", "power", "energy", "kwh"];

const SCOPE1_KEYWORDS: &[&str] = &[
    "fuel", "gasoline", "diesel", "natural gas", "lpg", "coal", "kerosene",
    "mobile", "vehicle", "transport", "combustion", "stationary", "biomass",
    "bagasse", "biogas", "wood", "anthracite", "bituminous", "lignite",
    "refrigerant", "fugitive", "cng", "heavy fuel oil", "gas oil",
    "equipment", "machinery", "agriculture", "forestry", "construction",
    // refrigerant naming
    "r-", "hfc", "pfc", "sf6", "nf3",
];

impl Default for ScopeKeywords {
    fn default() -> Self {
        Self {
            scope2: SCOPE2_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            scope1: SCOPE1_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// On-disk registry layout: either a bare list or a full document
#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    List(Vec<CategoryDefinition>),
    Full {
        categories: Vec<CategoryDefinition>,
        #[serde(default)]
        keywords: ScopeKeywords,
    },
}

/// Immutable category table
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRegistry {
    categories: BTreeMap<String, CategoryDefinition>,
    keywords: ScopeKeywords,
}

const STATIONARY_FOSSIL: &str = "Stationary Combustion - Fossil Fuels";
const STATIONARY_BIOMASS: &str = "Stationary Combustion - Biomass";
const MOBILE_ON_ROAD: &str = "Mobile Combustion - On Road Vehicles";
const OFF_ROAD_DIESEL: &str = "Mobile Combustion - Off Road Equipment (Diesel)";
const OFF_ROAD_GASOLINE_4S: &str = "Mobile Combustion - Off Road Equipment (Gasoline 4-Stroke)";
const OFF_ROAD_GASOLINE_2S: &str = "Mobile Combustion - Off Road Equipment (Gasoline 2-Stroke)";
const REFRIGERANTS: &str = "Fugitive Emissions - Refrigerants";
const PURCHASED_ELECTRICITY: &str = "Purchased Electricity";

/// TGO emission factor table: (key, name, unit, kg CO2e per unit, group, scope)
const TGO_CATEGORIES: &[(&str, &str, &str, f64, &str, u8)] = &[
    ("natural_gas_scf", "Natural Gas (SCF)", "scf", 0.0573, STATIONARY_FOSSIL, 1),
    ("natural_gas_mj", "Natural Gas (MJ)", "mj", 0.0562, STATIONARY_FOSSIL, 1),
    ("lignite_coal", "Lignite Coal", "kg", 1.0619, STATIONARY_FOSSIL, 1),
    ("heavy_fuel_oil_a", "Heavy Fuel Oil A", "litre", 3.2200, STATIONARY_FOSSIL, 1),
    ("heavy_fuel_oil_c", "Heavy Fuel Oil C", "litre", 3.2457, STATIONARY_FOSSIL, 1),
    ("gas_diesel_oil", "Gas/Diesel Oil", "litre", 2.7078, STATIONARY_FOSSIL, 1),
    ("anthracite_coal", "Anthracite Coal", "kg", 3.1000, STATIONARY_FOSSIL, 1),
    ("sub_bituminous_coal", "Sub-bituminous Coal", "kg", 2.5454, STATIONARY_FOSSIL, 1),
    ("jet_kerosene", "Jet Kerosene", "litre", 2.4775, STATIONARY_FOSSIL, 1),
    ("lpg_litre", "LPG (Liquefied Petroleum Gas)", "litre", 1.6812, STATIONARY_FOSSIL, 1),
    ("lpg_kg", "LPG (Liquefied Petroleum Gas)", "kg", 3.1134, STATIONARY_FOSSIL, 1),
    ("motor_gasoline", "Motor Gasoline", "litre", 2.1894, STATIONARY_FOSSIL, 1),
    ("fuel_wood", "Fuel Wood", "kg", 0.0304, STATIONARY_BIOMASS, 1),
    ("bagasse", "Bagasse", "kg", 0.0143, STATIONARY_BIOMASS, 1),
    ("palm_kernel_shell", "Palm Kernel Shell", "kg", 0.0352, STATIONARY_BIOMASS, 1),
    ("corn_cob", "Corn Cob", "kg", 0.0319, STATIONARY_BIOMASS, 1),
    ("biogas", "Biogas", "m³", 0.0011, STATIONARY_BIOMASS, 1),
    ("fuel_wood_co2", "Fuel Wood (CO₂ only)", "kg", 1.7909, STATIONARY_BIOMASS, 1),
    ("bagasse_co2", "Bagasse (CO₂ only)", "kg", 0.7530, STATIONARY_BIOMASS, 1),
    ("palm_kernel_shell_co2", "Palm Kernel Shell (CO₂ only)", "kg", 1.8530, STATIONARY_BIOMASS, 1),
    ("corn_cob_co2", "Corn Cob (CO₂ only)", "kg", 1.6780, STATIONARY_BIOMASS, 1),
    ("biogas_co2", "Biogas (CO₂ only)", "m³", 1.1428, STATIONARY_BIOMASS, 1),
    ("motor_gasoline_uncontrolled", "Motor Gasoline - Uncontrolled", "litre", 2.2394, MOBILE_ON_ROAD, 1),
    ("motor_gasoline_catalyst", "Motor Gasoline - Oxidation Catalyst", "litre", 2.2719, MOBILE_ON_ROAD, 1),
    ("motor_gasoline_low_mileage", "Motor Gasoline - Low Mileage Light Duty (1995+)", "litre", 2.2327, MOBILE_ON_ROAD, 1),
    ("gas_diesel_oil_mobile", "Gas/Diesel Oil", "litre", 2.7406, MOBILE_ON_ROAD, 1),
    ("cng", "Compressed Natural Gas (CNG)", "kg", 2.2609, MOBILE_ON_ROAD, 1),
    ("lpg_mobile_litre", "LPG - Mobile", "litre", 1.7306, MOBILE_ON_ROAD, 1),
    ("lpg_mobile_kg", "LPG - Mobile", "kg", 3.2049, MOBILE_ON_ROAD, 1),
    ("diesel_agriculture", "Agriculture Equipment", "litre", 2.9793, OFF_ROAD_DIESEL, 1),
    ("diesel_forestry", "Forestry Equipment", "litre", 2.9793, OFF_ROAD_DIESEL, 1),
    ("diesel_industrial", "Industrial Equipment", "litre", 2.9793, OFF_ROAD_DIESEL, 1),
    ("diesel_household", "Household Equipment", "litre", 2.9793, OFF_ROAD_DIESEL, 1),
    ("gasoline_4s_agriculture", "Agriculture Equipment", "litre", 2.2738, OFF_ROAD_GASOLINE_4S, 1),
    ("gasoline_4s_forestry", "Forestry Equipment", "litre", 2.1816, OFF_ROAD_GASOLINE_4S, 1),
    ("gasoline_4s_industrial", "Industrial Equipment", "litre", 2.2455, OFF_ROAD_GASOLINE_4S, 1),
    ("gasoline_4s_household", "Household Equipment", "litre", 2.3116, OFF_ROAD_GASOLINE_4S, 1),
    ("gasoline_2s_agriculture", "Agriculture Equipment", "litre", 2.3171, OFF_ROAD_GASOLINE_2S, 1),
    ("gasoline_2s_forestry", "Forestry Equipment", "litre", 2.3454, OFF_ROAD_GASOLINE_2S, 1),
    ("gasoline_2s_industrial", "Industrial Equipment", "litre", 2.3077, OFF_ROAD_GASOLINE_2S, 1),
    ("gasoline_2s_household", "Household Equipment", "litre", 2.3549, OFF_ROAD_GASOLINE_2S, 1),
    ("r22", "R-22 (HCFC-22)", "kg", 1760.0, REFRIGERANTS, 1),
    ("r32", "R-32", "kg", 677.0, REFRIGERANTS, 1),
    ("r125", "R-125", "kg", 3170.0, REFRIGERANTS, 1),
    ("r134", "R-134", "kg", 1120.0, REFRIGERANTS, 1),
    ("r134a", "R-134a", "kg", 1300.0, REFRIGERANTS, 1),
    ("r143", "R-143", "kg", 328.0, REFRIGERANTS, 1),
    ("r143a", "R-143a", "kg", 4800.0, REFRIGERANTS, 1),
    ("grid_electricity", "Grid Mix Electricity (Thailand)", "kwh", 0.4999, PURCHASED_ELECTRICITY, 2),
];

impl CategoryRegistry {
    /// Built-in Thailand TGO emission factor table
    pub fn tgo() -> Self {
        let categories = TGO_CATEGORIES
            .iter()
            .map(|&(key, name, unit, factor, group, scope)| {
                let definition = CategoryDefinition {
                    key: key.to_string(),
                    name: name.to_string(),
                    unit: unit.to_string(),
                    scope: if scope == 2 { Scope::Scope2 } else { Scope::Scope1 },
                    emission_factor: factor,
                    group: group.to_string(),
                };
                (definition.key.clone(), definition)
            })
            .collect();

        Self {
            categories,
            keywords: ScopeKeywords::default(),
        }
    }

    /// Build a registry with the default keyword tables
    pub fn from_definitions(definitions: Vec<CategoryDefinition>) -> Result<Self> {
        Self::with_keywords(definitions, ScopeKeywords::default())
    }

    /// Build a registry; keys and units are trimmed and lowercased
    pub fn with_keywords(
        definitions: Vec<CategoryDefinition>,
        keywords: ScopeKeywords,
    ) -> Result<Self> {
        let mut categories = BTreeMap::new();

        for mut definition in definitions {
            definition.key = definition.key.trim().to_lowercase();
            definition.unit = definition.unit.trim().to_lowercase();

            if definition.key.is_empty() {
                return Err(Error::Registry("category key must not be empty".into()));
            }
            if definition.unit.is_empty() {
                return Err(Error::Registry(format!(
                    "category {} has no unit",
                    definition.key
                )));
            }
            if categories.contains_key(&definition.key) {
                return Err(Error::Registry(format!(
                    "duplicate category key: {}",
                    definition.key
                )));
            }

            categories.insert(definition.key.clone(), definition);
        }

        let keywords = ScopeKeywords {
            scope2: keywords.scope2.iter().map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()).collect(),
            scope1: keywords.scope1.iter().map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()).collect(),
        };

        Ok(Self { categories, keywords })
    }

    /// Load from a JSON string (list of definitions, or `{categories, keywords}`)
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str(json)? {
            RegistryFile::List(categories) => Self::from_definitions(categories),
            RegistryFile::Full { categories, keywords } => Self::with_keywords(categories, keywords),
        }
    }

    /// Load from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, key: &str) -> Option<&CategoryDefinition> {
        self.categories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    /// The single unit registered for a category
    pub fn unit_for(&self, key: &str) -> Option<&str> {
        self.get(key).map(|d| d.unit.as_str())
    }

    pub fn scope_for(&self, key: &str) -> Option<Scope> {
        self.get(key).map(|d| d.scope)
    }

    pub fn factor_for(&self, key: &str) -> Option<f64> {
        self.get(key).map(|d| d.emission_factor)
    }

    pub fn keywords(&self) -> &ScopeKeywords {
        &self.keywords
    }

    /// Definitions sorted by key
    pub fn iter(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.values()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::tgo()
    }
}

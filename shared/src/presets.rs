//! Waste presets, known suppliers and costing settings

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::costing::MarginPolicy;
use crate::error::CostingResult;

/// Default waste percentage per ingredient category
pub const DEFAULT_WASTE_PRESETS: &[(&str, i64)] = &[
    ("Dairy", 8),
    ("Syrups", 3),
    ("Coffee", 5),
    ("Baked Goods", 12),
    ("Fresh Items", 15),
    ("Dry Goods", 2),
    ("Beverages", 4),
];

/// Suppliers offered by the ingredient form
pub const KNOWN_SUPPLIERS: &[&str] = &[
    "Main Supplier",
    "Local Dairy",
    "Wholesaler",
    "Flavor Co.",
    "Sweet Syrups Inc.",
    "Coffee Roasters Ltd",
    "Fresh Foods Co",
];

/// Tunable costing settings, loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostingSettings {
    /// Half-width of the "breaking even" band, in percentage points
    #[serde(default = "default_tolerance")]
    pub breaking_even_tolerance: Decimal,
    #[serde(default = "default_waste_presets")]
    pub waste_presets: BTreeMap<String, Decimal>,
    #[serde(default = "default_suppliers")]
    pub suppliers: Vec<String>,
}

fn default_tolerance() -> Decimal {
    MarginPolicy::default().breaking_even_tolerance
}

fn default_waste_presets() -> BTreeMap<String, Decimal> {
    DEFAULT_WASTE_PRESETS
        .iter()
        .map(|(category, percent)| (category.to_string(), Decimal::from(*percent)))
        .collect()
}

fn default_suppliers() -> Vec<String> {
    KNOWN_SUPPLIERS.iter().map(|s| s.to_string()).collect()
}

impl Default for CostingSettings {
    fn default() -> Self {
        Self {
            breaking_even_tolerance: default_tolerance(),
            waste_presets: default_waste_presets(),
            suppliers: default_suppliers(),
        }
    }
}

impl CostingSettings {
    pub fn margin_policy(&self) -> CostingResult<MarginPolicy> {
        MarginPolicy::new(self.breaking_even_tolerance)
    }

    /// Preset waste percentage for a category (case-insensitive)
    pub fn default_waste_percent(&self, category: &str) -> Option<Decimal> {
        let category = category.trim();
        self.waste_presets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, percent)| *percent)
    }

    /// Explicit waste wins; otherwise fall back to the category preset
    pub fn resolve_waste_percent(
        &self,
        explicit: Option<Decimal>,
        category: Option<&str>,
    ) -> Option<Decimal> {
        explicit.or_else(|| category.and_then(|c| self.default_waste_percent(c)))
    }

    pub fn is_known_supplier(&self, supplier: &str) -> bool {
        let supplier = supplier.trim();
        self.suppliers
            .iter()
            .any(|known| known.eq_ignore_ascii_case(supplier))
    }
}

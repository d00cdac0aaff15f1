//! Measurement units for ingredient packages

use serde::{Deserialize, Serialize};

/// Closed set of units an ingredient can be bought in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeasurementUnit {
    #[serde(rename = "L", alias = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    /// Countable items (each, slice, bag)
    #[serde(rename = "unit", alias = "each")]
    Unit,
}

/// What a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Volume,
    Mass,
    Count,
}

impl MeasurementUnit {
    pub const ALL: [MeasurementUnit; 5] = [
        MeasurementUnit::Liter,
        MeasurementUnit::Milliliter,
        MeasurementUnit::Kilogram,
        MeasurementUnit::Gram,
        MeasurementUnit::Unit,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            MeasurementUnit::Liter => "L",
            MeasurementUnit::Milliliter => "ml",
            MeasurementUnit::Kilogram => "kg",
            MeasurementUnit::Gram => "g",
            MeasurementUnit::Unit => "unit",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            MeasurementUnit::Liter | MeasurementUnit::Milliliter => Dimension::Volume,
            MeasurementUnit::Kilogram | MeasurementUnit::Gram => Dimension::Mass,
            MeasurementUnit::Unit => Dimension::Count,
        }
    }

    /// Large units are costed per 1/1000 subunit (ml, g) in recipes
    pub fn is_large(&self) -> bool {
        matches!(self, MeasurementUnit::Liter | MeasurementUnit::Kilogram)
    }

    /// Unit recipes are expected to use for this ingredient
    pub fn recipe_unit(&self) -> MeasurementUnit {
        match self {
            MeasurementUnit::Liter => MeasurementUnit::Milliliter,
            MeasurementUnit::Kilogram => MeasurementUnit::Gram,
            other => *other,
        }
    }

    /// Parse a unit symbol, ignoring case
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim().to_lowercase().as_str() {
            "l" | "liter" | "litre" => Some(MeasurementUnit::Liter),
            "ml" => Some(MeasurementUnit::Milliliter),
            "kg" => Some(MeasurementUnit::Kilogram),
            "g" | "gram" => Some(MeasurementUnit::Gram),
            "unit" | "each" => Some(MeasurementUnit::Unit),
            _ => None,
        }
    }
}

impl std::fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

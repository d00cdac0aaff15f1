//! True-cost calculations
//!
//! Turns purchase data into waste-adjusted unit costs, and a product recipe
//! into a margin verdict. Every function here is pure: no logging, no shared
//! state, same inputs always give the same outputs.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CostingError, CostingResult};
use crate::models::{MeasurementUnit, RecipeUsage};

/// Subunits (ml, g) per large unit (L, kg)
const SUBUNITS_PER_LARGE_UNIT: Decimal = Decimal::ONE_THOUSAND;

/// Waste-adjusted cost of one unit of a purchased package
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitCost {
    /// Purchase price divided by package size, before waste
    pub base_cost_per_unit: Decimal,
    /// True cost per declared unit (after waste)
    pub cost_per_unit: Decimal,
    /// True cost per ml for liter packages, otherwise `cost_per_unit`
    pub cost_per_ml: Decimal,
    /// True cost per gram for kilogram packages, otherwise `cost_per_unit`
    pub cost_per_gram: Decimal,
}

impl UnitCost {
    /// Pick the cost matching what recipes measure for `unit`
    pub fn for_unit(&self, unit: MeasurementUnit) -> Decimal {
        match unit.dimension() {
            crate::models::Dimension::Volume => self.cost_per_ml,
            crate::models::Dimension::Mass => self.cost_per_gram,
            crate::models::Dimension::Count => self.cost_per_unit,
        }
    }

    /// Extra cost per unit caused by waste
    pub fn waste_uplift(&self) -> Decimal {
        self.cost_per_unit - self.base_cost_per_unit
    }
}

/// Compute the true cost per unit of an ingredient package.
///
/// `package_size` of `None` means a single unit.
pub fn compute_unit_cost(
    purchase_price: Decimal,
    package_size: Option<Decimal>,
    waste_percent: Decimal,
    unit: MeasurementUnit,
) -> CostingResult<UnitCost> {
    ensure_positive("purchase_price", purchase_price)?;
    let package_size = package_size.unwrap_or(Decimal::ONE);
    ensure_positive("package_size", package_size)?;
    ensure_non_negative("waste_percent", waste_percent)?;

    let waste_multiplier = checked(
        "waste_percent",
        waste_percent
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|w| Decimal::ONE.checked_add(w)),
    )?;
    let base_cost_per_unit = checked("package_size", purchase_price.checked_div(package_size))?;
    let true_cost_per_unit = checked(
        "purchase_price",
        base_cost_per_unit.checked_mul(waste_multiplier),
    )?;
    let per_subunit = checked(
        "purchase_price",
        true_cost_per_unit.checked_div(SUBUNITS_PER_LARGE_UNIT),
    )?;

    Ok(UnitCost {
        base_cost_per_unit,
        cost_per_unit: true_cost_per_unit,
        cost_per_ml: if unit == MeasurementUnit::Liter {
            per_subunit
        } else {
            true_cost_per_unit
        },
        cost_per_gram: if unit == MeasurementUnit::Kilogram {
            per_subunit
        } else {
            true_cost_per_unit
        },
    })
}

/// Cost contributed by one recipe line
pub fn compute_ingredient_cost(quantity_used: Decimal, unit_cost: Decimal) -> CostingResult<Decimal> {
    ensure_positive("quantity_used", quantity_used)?;
    ensure_non_negative("unit_cost", unit_cost)?;
    checked("quantity_used", quantity_used.checked_mul(unit_cost))
}

/// Profitability verdict for a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MarginStatus {
    #[serde(rename = "profitable")]
    Profitable,
    #[serde(rename = "breaking even")]
    BreakingEven,
    #[serde(rename = "losing money")]
    LosingMoney,
}

impl MarginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginStatus::Profitable => "profitable",
            MarginStatus::BreakingEven => "breaking even",
            MarginStatus::LosingMoney => "losing money",
        }
    }

    /// Parse a status label, ignoring case and accepting `_`/`-` separators
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "profitable" => Some(MarginStatus::Profitable),
            "breaking even" => Some(MarginStatus::BreakingEven),
            "losing money" => Some(MarginStatus::LosingMoney),
            _ => None,
        }
    }
}

impl std::fmt::Display for MarginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarginStatus::Profitable => write!(f, "Profitable"),
            MarginStatus::BreakingEven => write!(f, "Breaking even"),
            MarginStatus::LosingMoney => write!(f, "Losing money"),
        }
    }
}

/// Thresholds used to classify a margin percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarginPolicy {
    /// Half-width, in percentage points, of the band around 0 that counts as
    /// breaking even
    pub breaking_even_tolerance: Decimal,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            breaking_even_tolerance: Decimal::new(5, 1),
        }
    }
}

impl MarginPolicy {
    pub fn new(breaking_even_tolerance: Decimal) -> CostingResult<Self> {
        ensure_non_negative("breaking_even_tolerance", breaking_even_tolerance)?;
        Ok(Self {
            breaking_even_tolerance,
        })
    }

    pub fn classify(&self, margin_percent: Decimal) -> MarginStatus {
        if margin_percent < -self.breaking_even_tolerance {
            MarginStatus::LosingMoney
        } else if margin_percent.abs() <= self.breaking_even_tolerance {
            MarginStatus::BreakingEven
        } else {
            MarginStatus::Profitable
        }
    }
}

/// Margin figures for a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductMargin {
    pub total_cost: Decimal,
    pub margin_amount: Decimal,
    pub margin_percent: Decimal,
    pub status: MarginStatus,
}

/// Source of unit-normalized ingredient costs, keyed by ingredient reference
pub trait CostLookup {
    fn unit_cost(&self, ingredient: &str) -> Option<Decimal>;
}

impl<S: BuildHasher> CostLookup for HashMap<String, Decimal, S> {
    fn unit_cost(&self, ingredient: &str) -> Option<Decimal> {
        self.get(ingredient).copied()
    }
}

impl CostLookup for BTreeMap<String, Decimal> {
    fn unit_cost(&self, ingredient: &str) -> Option<Decimal> {
        self.get(ingredient).copied()
    }
}

impl<T: CostLookup + ?Sized> CostLookup for &T {
    fn unit_cost(&self, ingredient: &str) -> Option<Decimal> {
        (**self).unit_cost(ingredient)
    }
}

/// Compute total cost, margin and status for a product recipe.
///
/// Every quantity is checked before any ingredient is looked up.
pub fn compute_product_margin<L: CostLookup + ?Sized>(
    sell_price: Decimal,
    usages: &[RecipeUsage],
    lookup: &L,
    policy: &MarginPolicy,
) -> CostingResult<ProductMargin> {
    ensure_positive("sell_price", sell_price)?;
    for (index, usage) in usages.iter().enumerate() {
        if usage.quantity_used <= Decimal::ZERO {
            return Err(CostingError::invalid(
                format!("ingredients[{}].quantity_used", index),
                "must be greater than zero",
            ));
        }
    }

    let mut total_cost = Decimal::ZERO;
    for usage in usages {
        let unit_cost = lookup
            .unit_cost(&usage.ingredient_id)
            .ok_or_else(|| CostingError::missing(&usage.ingredient_id))?;
        let line_cost = compute_ingredient_cost(usage.quantity_used, unit_cost)?;
        total_cost = checked("ingredients", total_cost.checked_add(line_cost))?;
    }

    let margin_amount = checked("sell_price", sell_price.checked_sub(total_cost))?;
    let margin_percent = checked(
        "sell_price",
        margin_amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(sell_price)),
    )?;

    Ok(ProductMargin {
        total_cost,
        margin_amount,
        margin_percent,
        status: policy.classify(margin_percent),
    })
}

/// Recipe references the lookup cannot resolve, in recipe order, without repeats
pub fn unresolved_references<L: CostLookup + ?Sized>(
    usages: &[RecipeUsage],
    lookup: &L,
) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for usage in usages {
        if lookup.unit_cost(&usage.ingredient_id).is_none()
            && !missing.contains(&usage.ingredient_id)
        {
            missing.push(usage.ingredient_id.clone());
        }
    }
    missing
}

pub(crate) fn ensure_positive(field: &str, value: Decimal) -> CostingResult<()> {
    if value <= Decimal::ZERO {
        return Err(CostingError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> CostingResult<()> {
    if value < Decimal::ZERO {
        return Err(CostingError::invalid(field, "cannot be negative"));
    }
    Ok(())
}

fn checked(field: &str, value: Option<Decimal>) -> CostingResult<Decimal> {
    value.ok_or_else(|| CostingError::invalid(field, "value out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn lookup(entries: &[(&str, &str)]) -> HashMap<String, Decimal> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), dec(v)))
            .collect()
    }

    // ========================================================================
    // Unit cost
    // ========================================================================

    #[test]
    fn test_unit_cost_without_waste() {
        let cost = compute_unit_cost(dec("10"), Some(dec("2")), Decimal::ZERO, MeasurementUnit::Unit)
            .unwrap();
        assert_eq!(cost.cost_per_unit, dec("5"));
        assert_eq!(cost.base_cost_per_unit, dec("5"));
        assert_eq!(cost.waste_uplift(), Decimal::ZERO);
    }

    #[test]
    fn test_unit_cost_with_waste() {
        let cost = compute_unit_cost(dec("10"), Some(dec("2")), dec("50"), MeasurementUnit::Unit)
            .unwrap();
        assert_eq!(cost.cost_per_unit, dec("7.5"));
        assert_eq!(cost.base_cost_per_unit, dec("5"));
        assert_eq!(cost.waste_uplift(), dec("2.5"));
    }

    #[test]
    fn test_package_size_defaults_to_one() {
        let cost = compute_unit_cost(dec("4.20"), None, Decimal::ZERO, MeasurementUnit::Unit).unwrap();
        assert_eq!(cost.cost_per_unit, dec("4.20"));
    }

    #[test]
    fn test_liter_projects_to_milliliters() {
        let cost = compute_unit_cost(dec("3.00"), Some(dec("2")), Decimal::ZERO, MeasurementUnit::Liter)
            .unwrap();
        assert_eq!(cost.cost_per_unit, dec("1.5"));
        assert_eq!(cost.cost_per_ml, dec("0.0015"));
        assert_eq!(cost.cost_per_gram, dec("1.5"));
        assert_eq!(cost.for_unit(MeasurementUnit::Liter), dec("0.0015"));
    }

    #[test]
    fn test_kilogram_projects_to_grams() {
        let cost = compute_unit_cost(dec("18"), Some(dec("1")), dec("5"), MeasurementUnit::Kilogram)
            .unwrap();
        assert_eq!(cost.cost_per_unit, dec("18.9"));
        assert_eq!(cost.cost_per_gram, dec("0.0189"));
        assert_eq!(cost.cost_per_ml, dec("18.9"));
        assert_eq!(cost.for_unit(MeasurementUnit::Kilogram), dec("0.0189"));
    }

    #[test]
    fn test_small_units_are_not_divided() {
        let cost = compute_unit_cost(dec("7.50"), Some(dec("750")), Decimal::ZERO, MeasurementUnit::Milliliter)
            .unwrap();
        assert_eq!(cost.cost_per_ml, dec("0.01"));
        assert_eq!(cost.for_unit(MeasurementUnit::Milliliter), dec("0.01"));
    }

    #[test]
    fn test_unit_cost_rejects_bad_input() {
        let unit = MeasurementUnit::Unit;
        assert_eq!(
            compute_unit_cost(Decimal::ZERO, None, Decimal::ZERO, unit),
            Err(CostingError::invalid("purchase_price", "must be greater than zero"))
        );
        assert_eq!(
            compute_unit_cost(dec("1"), Some(dec("-2")), Decimal::ZERO, unit),
            Err(CostingError::invalid("package_size", "must be greater than zero"))
        );
        assert_eq!(
            compute_unit_cost(dec("1"), Some(dec("2")), dec("-0.1"), unit),
            Err(CostingError::invalid("waste_percent", "cannot be negative"))
        );
    }

    // ========================================================================
    // Product margin
    // ========================================================================

    #[test]
    fn test_espresso_margin() {
        let usages = vec![RecipeUsage::new("espresso", dec("30"))];
        let margin = compute_product_margin(
            dec("5.00"),
            &usages,
            &lookup(&[("espresso", "0.015")]),
            &MarginPolicy::default(),
        )
        .unwrap();

        assert_eq!(margin.total_cost, dec("0.45"));
        assert_eq!(margin.margin_amount, dec("4.55"));
        assert_eq!(margin.margin_percent, dec("91.0"));
        assert_eq!(margin.status, MarginStatus::Profitable);
    }

    #[test]
    fn test_rose_latte_loses_money() {
        let usages = vec![
            RecipeUsage::new("espresso", dec("30")),
            RecipeUsage::new("oat-milk", dec("200")),
            RecipeUsage::new("rose-syrup", dec("15")),
            RecipeUsage::new("rose-petals", dec("2")),
            RecipeUsage::new("whipped-cream", dec("20")),
        ];
        let costs = lookup(&[
            ("espresso", "0.015"),
            ("oat-milk", "0.0034"),
            ("rose-syrup", "0.2"),
            ("rose-petals", "0.20"),
            ("whipped-cream", "0.022"),
        ]);
        let margin =
            compute_product_margin(dec("4.50"), &usages, &costs, &MarginPolicy::default()).unwrap();

        assert_eq!(margin.total_cost, dec("4.97"));
        assert_eq!(margin.margin_amount, dec("-0.47"));
        assert_eq!(margin.margin_percent.round_dp(1), dec("-10.4"));
        assert_eq!(margin.status, MarginStatus::LosingMoney);
    }

    #[test]
    fn test_exact_break_even() {
        let usages = vec![RecipeUsage::new("cold-brew", dec("250"))];
        let margin = compute_product_margin(
            dec("1.20"),
            &usages,
            &lookup(&[("cold-brew", "0.0048")]),
            &MarginPolicy::default(),
        )
        .unwrap();
        assert_eq!(margin.margin_percent, Decimal::ZERO);
        assert_eq!(margin.status, MarginStatus::BreakingEven);
    }

    #[test]
    fn test_empty_recipe_is_all_margin() {
        let margin = compute_product_margin(
            dec("3.00"),
            &[],
            &lookup(&[]),
            &MarginPolicy::default(),
        )
        .unwrap();
        assert_eq!(margin.total_cost, Decimal::ZERO);
        assert_eq!(margin.margin_percent, dec("100"));
    }

    #[test]
    fn test_missing_reference() {
        let usages = vec![
            RecipeUsage::new("espresso", dec("30")),
            RecipeUsage::new("maple-syrup", dec("10")),
        ];
        let result = compute_product_margin(
            dec("4.80"),
            &usages,
            &lookup(&[("espresso", "0.015")]),
            &MarginPolicy::default(),
        );
        assert_eq!(result, Err(CostingError::missing("maple-syrup")));
    }

    #[test]
    fn test_quantities_checked_before_lookup() {
        let usages = vec![
            RecipeUsage::new("unknown", dec("10")),
            RecipeUsage::new("espresso", Decimal::ZERO),
        ];
        let result = compute_product_margin(
            dec("4.80"),
            &usages,
            &lookup(&[("espresso", "0.015")]),
            &MarginPolicy::default(),
        );
        assert_eq!(
            result,
            Err(CostingError::invalid(
                "ingredients[1].quantity_used",
                "must be greater than zero"
            ))
        );
    }

    #[test]
    fn test_non_positive_sell_price() {
        let result = compute_product_margin(
            Decimal::ZERO,
            &[],
            &lookup(&[]),
            &MarginPolicy::default(),
        );
        assert!(matches!(result, Err(CostingError::InvalidInput { ref field, .. }) if field == "sell_price"));
    }

    #[test]
    fn test_btree_lookup_and_reference() {
        let mut costs = BTreeMap::new();
        costs.insert("espresso".to_string(), dec("0.015"));
        let by_ref: &BTreeMap<String, Decimal> = &costs;
        let usages = vec![RecipeUsage::new("espresso", dec("60"))];
        let margin =
            compute_product_margin(dec("3.00"), &usages, &by_ref, &MarginPolicy::default()).unwrap();
        assert_eq!(margin.total_cost, dec("0.90"));
    }

    // ========================================================================
    // Classification
    // ========================================================================

    #[test]
    fn test_classification_band() {
        let policy = MarginPolicy::default();
        assert_eq!(policy.classify(dec("0.5")), MarginStatus::BreakingEven);
        assert_eq!(policy.classify(dec("-0.5")), MarginStatus::BreakingEven);
        assert_eq!(policy.classify(dec("0.51")), MarginStatus::Profitable);
        assert_eq!(policy.classify(dec("-0.51")), MarginStatus::LosingMoney);
    }

    #[test]
    fn test_custom_tolerance() {
        let policy = MarginPolicy::new(dec("1")).unwrap();
        assert_eq!(policy.classify(dec("0.9")), MarginStatus::BreakingEven);
        assert_eq!(policy.classify(dec("-1.1")), MarginStatus::LosingMoney);

        let strict = MarginPolicy::new(Decimal::ZERO).unwrap();
        assert_eq!(strict.classify(Decimal::ZERO), MarginStatus::BreakingEven);
        assert_eq!(strict.classify(dec("0.01")), MarginStatus::Profitable);

        assert!(MarginPolicy::new(dec("-1")).is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(
            serde_json::to_string(&MarginStatus::BreakingEven).unwrap(),
            "\"breaking even\""
        );
        assert_eq!(MarginStatus::parse("losing_money"), Some(MarginStatus::LosingMoney));
        assert_eq!(MarginStatus::parse("Breaking-Even"), Some(MarginStatus::BreakingEven));
        assert_eq!(MarginStatus::parse("great"), None);
        assert_eq!(MarginStatus::Profitable.to_string(), "Profitable");
    }

    #[test]
    fn test_unresolved_references() {
        let usages = vec![
            RecipeUsage::new("espresso", dec("30")),
            RecipeUsage::new("maple-syrup", dec("10")),
            RecipeUsage::new("maple-syrup", dec("5")),
            RecipeUsage::new("cinnamon", dec("1")),
        ];
        let missing = unresolved_references(&usages, &lookup(&[("espresso", "0.015")]));
        assert_eq!(missing, vec!["maple-syrup".to_string(), "cinnamon".to_string()]);
    }
}

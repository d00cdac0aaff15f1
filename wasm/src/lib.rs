//! WebAssembly module for the Busy Fool dashboard
//!
//! Provides client-side computation for:
//! - Waste-adjusted unit costs
//! - Product margins and margin classification
//! - Ingredient form validation and import deduplication
//! - Dashboard analytics
//!
//! Every export takes and returns JSON strings. Failures become JavaScript
//! `Error`s whose `name` is the error code and whose message is the engine's.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::analytics::Dashboard;
use shared::catalog::{plan_merge, IngredientCatalog, MergeReport};
use shared::validation::validate_ingredient_form;
use shared::view::{product_rows, ProductQuery};
use shared::{
    compute_product_margin, compute_unit_cost, CostLookup, CostingError, CostingResult,
    CostingSettings, IngredientInput, MarginPolicy, MeasurementUnit, Product, RecipeUsage,
};

fn parse<'a, T: Deserialize<'a>>(json: &'a str) -> CostingResult<T> {
    serde_json::from_str(json).map_err(|e| CostingError::invalid("json", e.to_string()))
}

fn render<T: Serialize>(value: &T) -> CostingResult<String> {
    serde_json::to_string(value).map_err(|e| CostingError::invalid("json", e.to_string()))
}

fn policy_for(tolerance: Option<Decimal>) -> CostingResult<MarginPolicy> {
    tolerance.map_or_else(|| Ok(MarginPolicy::default()), MarginPolicy::new)
}

fn to_js(err: CostingError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    error.set_name(err.code());
    error.into()
}

// ============================================================================
// Unit cost
// ============================================================================

#[derive(Debug, Deserialize)]
struct UnitCostRequest {
    purchase_price: Decimal,
    #[serde(default)]
    package_size: Option<Decimal>,
    #[serde(default)]
    waste_percent: Decimal,
    unit: MeasurementUnit,
}

pub fn unit_cost_json(request_json: &str) -> CostingResult<String> {
    let request: UnitCostRequest = parse(request_json)?;
    let cost = compute_unit_cost(
        request.purchase_price,
        request.package_size,
        request.waste_percent,
        request.unit,
    )?;
    render(&cost)
}

/// Waste-adjusted unit cost of a package
#[wasm_bindgen]
pub fn calculate_unit_cost(request_json: &str) -> Result<String, JsValue> {
    unit_cost_json(request_json).map_err(to_js)
}

// ============================================================================
// Product margin
// ============================================================================

/// Costs either come from a plain reference map or from a catalog listing
#[derive(Debug, Deserialize)]
struct MarginRequest {
    sell_price: Decimal,
    #[serde(default)]
    ingredients: Vec<RecipeUsage>,
    #[serde(default)]
    costs: BTreeMap<String, Decimal>,
    #[serde(default)]
    catalog: Option<IngredientCatalog>,
    #[serde(default)]
    tolerance: Option<Decimal>,
}

pub fn product_margin_json(request_json: &str) -> CostingResult<String> {
    let request: MarginRequest = parse(request_json)?;
    let policy = policy_for(request.tolerance)?;
    let lookup: &dyn CostLookup = match &request.catalog {
        Some(catalog) => catalog,
        None => &request.costs,
    };
    let margin = compute_product_margin(request.sell_price, &request.ingredients, lookup, &policy)?;
    render(&margin)
}

/// Total cost, margin and status of a product recipe
#[wasm_bindgen]
pub fn calculate_product_margin(request_json: &str) -> Result<String, JsValue> {
    product_margin_json(request_json).map_err(to_js)
}

fn finite_decimal(field: &str, value: f64) -> CostingResult<Decimal> {
    Decimal::try_from(value).map_err(|_| CostingError::invalid(field, "must be a finite number"))
}

pub fn margin_status_label(margin_percent: f64, tolerance: Option<f64>) -> CostingResult<String> {
    let tolerance = tolerance
        .map(|t| finite_decimal("breaking_even_tolerance", t))
        .transpose()?;
    let policy = policy_for(tolerance)?;
    let percent = finite_decimal("margin_percent", margin_percent)?;
    Ok(policy.classify(percent).as_str().to_string())
}

/// Classify a margin percentage
#[wasm_bindgen]
pub fn classify_margin(margin_percent: f64, tolerance: Option<f64>) -> Result<String, JsValue> {
    margin_status_label(margin_percent, tolerance).map_err(to_js)
}

// ============================================================================
// Ingredients
// ============================================================================

#[derive(Debug, Deserialize)]
struct MergeRequest {
    #[serde(default)]
    existing: Vec<String>,
    #[serde(default)]
    incoming: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MergeResponse {
    #[serde(flatten)]
    report: MergeReport,
    accepted_names: Vec<String>,
    message: String,
}

pub fn merge_report_json(request_json: &str) -> CostingResult<String> {
    let request: MergeRequest = parse(request_json)?;
    let plan = plan_merge(
        request.existing.iter().map(String::as_str),
        request.incoming,
    );
    let report = plan.report();
    render(&MergeResponse {
        report,
        message: report.to_string(),
        accepted_names: plan.accepted,
    })
}

/// Which incoming ingredient names survive a merge into the existing list
#[wasm_bindgen]
pub fn ingredient_merge_report(request_json: &str) -> Result<String, JsValue> {
    merge_report_json(request_json).map_err(to_js)
}

#[derive(Debug, Deserialize)]
struct FormRequest {
    form: IngredientInput,
    #[serde(default)]
    catalog: IngredientCatalog,
    #[serde(default)]
    editing: Option<Uuid>,
    #[serde(default)]
    settings: CostingSettings,
}

pub fn validate_form_json(request_json: &str) -> CostingResult<String> {
    let request: FormRequest = parse(request_json)?;
    let payload =
        validate_ingredient_form(&request.form, &request.catalog, &request.settings, request.editing)?;
    render(&payload)
}

/// Validate the add/edit ingredient form, returning the API payload
#[wasm_bindgen]
pub fn validate_ingredient(request_json: &str) -> Result<String, JsValue> {
    validate_form_json(request_json).map_err(to_js)
}

/// Default waste percentage for a category, if it has a preset
#[wasm_bindgen]
pub fn waste_preset(category: &str) -> Option<f64> {
    CostingSettings::default()
        .default_waste_percent(category)
        .and_then(|p| p.to_f64())
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Deserialize)]
struct DashboardRequest {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    catalog: IngredientCatalog,
    #[serde(default)]
    tolerance: Option<Decimal>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

pub fn dashboard_json(request_json: &str) -> CostingResult<String> {
    let request: DashboardRequest = parse(request_json)?;
    let policy = policy_for(request.tolerance)?;
    let rows = product_rows(
        &request.products,
        &request.catalog,
        &policy,
        &ProductQuery::default(),
    );
    render(&Dashboard::build(&rows, &request.catalog, request.limit)?)
}

/// Summary, key metrics, top products, missing recipes and waste in one call
#[wasm_bindgen]
pub fn build_dashboard(request_json: &str) -> Result<String, JsValue> {
    dashboard_json(request_json).map_err(to_js)
}

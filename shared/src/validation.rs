//! Form validation for ingredients, products and accounts
//!
//! The `validator` derive does the per-field work; this module turns its
//! error map into the first failure in form order, with the messages the
//! dashboard shows next to each field.

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::catalog::IngredientCatalog;
use crate::error::{CostingError, CostingResult};
use crate::models::{IngredientInput, IngredientPayload, LoginInput, ProductInput, RegisterInput};
use crate::presets::CostingSettings;

// ============================================================================
// Field validators used by the derive
// ============================================================================

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("not_positive"));
    }
    Ok(())
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

// ============================================================================
// Ingredient form
// ============================================================================

/// Ingredient form fields in display order, with their messages
const INGREDIENT_FIELDS: &[(&str, &str)] = &[
    ("name", "Name is required"),
    ("unit", "Unit is required"),
    ("quantity", "Valid quantity is required"),
    ("purchase_price", "Valid purchase price is required"),
    ("waste_percent", "Waste percentage is required"),
    ("supplier", "Supplier is required"),
];

/// Validate an add/edit ingredient form.
///
/// Returns the first failing field in form order. A blank waste percentage
/// takes the category preset when there is one. `editing` is the id of the
/// record being edited, which may keep its own name.
pub fn validate_ingredient_form(
    input: &IngredientInput,
    catalog: &IngredientCatalog,
    settings: &CostingSettings,
    editing: Option<Uuid>,
) -> CostingResult<IngredientPayload> {
    let waste_percent =
        settings.resolve_waste_percent(input.waste_percent, input.category.as_deref());
    let errors = input.validate().err();

    for (field, message) in INGREDIENT_FIELDS {
        let failed = has_field_error(errors.as_ref(), field)
            || (*field == "waste_percent" && waste_percent.is_none());
        if failed {
            return Err(CostingError::invalid(*field, *message));
        }
    }

    // Every field passed the checks above
    let (Some(name), Some(unit), Some(quantity), Some(purchase_price), Some(waste_percent), Some(supplier)) = (
        input.name.as_deref(),
        input.unit,
        input.quantity,
        input.purchase_price,
        waste_percent,
        input.supplier.as_deref(),
    ) else {
        return Err(CostingError::invalid("form", "incomplete ingredient form"));
    };

    if !settings.is_known_supplier(supplier) {
        return Err(CostingError::invalid(
            "supplier",
            "Supplier is not on the supplier list",
        ));
    }

    catalog.ensure_unique_name(name, editing)?;

    Ok(IngredientPayload {
        name: name.trim().to_string(),
        unit,
        quantity,
        purchase_price,
        waste_percent,
        supplier: supplier.trim().to_string(),
    })
}

// ============================================================================
// Product form
// ============================================================================

pub fn validate_product_input(input: &ProductInput) -> CostingResult<()> {
    let errors = input.validate().err();
    if has_field_error(errors.as_ref(), "name") {
        return Err(CostingError::invalid("name", "Name is required"));
    }
    if has_field_error(errors.as_ref(), "sell_price") {
        return Err(CostingError::invalid("sell_price", "Valid sell price is required"));
    }

    for (index, usage) in input.ingredients.iter().enumerate() {
        if usage.ingredient_id.trim().is_empty() {
            return Err(CostingError::invalid(
                format!("ingredients[{}].ingredient_id", index),
                "Ingredient is required",
            ));
        }
        if usage.quantity_used <= Decimal::ZERO {
            return Err(CostingError::invalid(
                format!("ingredients[{}].quantity_used", index),
                "Valid quantity is required",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Accounts
// ============================================================================

pub fn validate_login(input: &LoginInput) -> CostingResult<()> {
    let errors = input.validate().err();
    account_error(errors.as_ref(), &["email", "password"])
}

pub fn validate_registration(input: &RegisterInput) -> CostingResult<()> {
    let errors = input.validate().err();
    account_error(errors.as_ref(), &["name", "email", "password"])
}

fn account_error(errors: Option<&ValidationErrors>, order: &[&'static str]) -> CostingResult<()> {
    for field in order {
        if has_field_error(errors, field) {
            let message = match *field {
                "name" => "Name is required",
                "email" => "Invalid email address",
                _ => "Password must be at least 8 characters",
            };
            return Err(CostingError::invalid(*field, message));
        }
    }
    Ok(())
}

fn has_field_error(errors: Option<&ValidationErrors>, field: &str) -> bool {
    errors
        .map(|e| e.field_errors().contains_key(field))
        .unwrap_or(false)
}

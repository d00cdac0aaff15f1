//! `ingredients list|add|edit|delete|import|cost`

use std::path::PathBuf;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use shared::analytics::IngredientSummary;
use shared::catalog::IngredientCatalog;
use shared::view::{ingredient_rows, IngredientQuery, IngredientSortKey, SortOrder};
use shared::{compute_unit_cost, CostingSettings, Ingredient, IngredientInput, MeasurementUnit};

use super::output::{money, or_dash, percent, print_json, unit_money};
use crate::error::{AppError, AppResult};
use crate::external::BusyFoolApi;
use crate::services::IngredientService;

#[derive(Subcommand, Debug)]
pub enum IngredientCommand {
    /// Show the catalog with true unit costs
    List(ListArgs),
    /// Add an ingredient
    Add(IngredientFormArgs),
    /// Edit an ingredient by id or name
    Edit(EditArgs),
    /// Delete an ingredient by id or name
    Delete(TargetArgs),
    /// Bulk import ingredients from a CSV file
    Import(ImportArgs),
    /// Work out a true unit cost without saving anything
    Cost(CostArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive name filter
    #[arg(long)]
    pub search: Option<String>,
    /// name, unit, quantity, purchase-price, waste-percent, supplier or cost
    #[arg(long, value_parser = parse_sort_key, default_value = "name")]
    pub sort: IngredientSortKey,
    #[arg(long)]
    pub desc: bool,
}

/// Ingredient form fields; blanks are left for validation to report
#[derive(Args, Debug, Default)]
pub struct IngredientFormArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// L, ml, kg, g or unit
    #[arg(long, value_parser = parse_unit)]
    pub unit: Option<MeasurementUnit>,
    /// Package size in `unit`
    #[arg(long)]
    pub quantity: Option<Decimal>,
    /// Purchase price of one package
    #[arg(long)]
    pub price: Option<Decimal>,
    /// Waste percentage; defaults to the category preset
    #[arg(long)]
    pub waste: Option<Decimal>,
    #[arg(long)]
    pub supplier: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl IngredientFormArgs {
    pub fn into_input(self) -> IngredientInput {
        self.overlay(IngredientInput::default())
    }

    /// Apply the given flags on top of an existing form
    pub fn overlay(self, base: IngredientInput) -> IngredientInput {
        IngredientInput {
            name: self.name.or(base.name),
            unit: self.unit.or(base.unit),
            quantity: self.quantity.or(base.quantity),
            purchase_price: self.price.or(base.purchase_price),
            waste_percent: self.waste.or(base.waste_percent),
            supplier: self.supplier.or(base.supplier),
            category: self.category.or(base.category),
        }
    }
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Ingredient id or name
    pub ingredient: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Ingredient id or name
    pub ingredient: String,
    #[command(flatten)]
    pub form: IngredientFormArgs,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct CostArgs {
    #[arg(long)]
    pub price: Decimal,
    /// Package size; a single unit when omitted
    #[arg(long)]
    pub size: Option<Decimal>,
    #[arg(long, default_value = "0")]
    pub waste: Decimal,
    #[arg(long, value_parser = parse_unit, default_value = "unit")]
    pub unit: MeasurementUnit,
}

pub fn parse_unit(raw: &str) -> Result<MeasurementUnit, String> {
    MeasurementUnit::parse(raw).ok_or_else(|| format!("unsupported unit: {raw}"))
}

pub fn parse_sort_key(raw: &str) -> Result<IngredientSortKey, String> {
    let key = raw.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(key)).map_err(|_| format!("unknown sort key: {raw}"))
}

fn find(catalog: &IngredientCatalog, reference: &str) -> AppResult<Uuid> {
    catalog
        .resolve(reference)
        .map(|i| i.id)
        .ok_or_else(|| AppError::NotFound(format!("ingredient '{}'", reference)))
}

pub async fn run(
    api: BusyFoolApi,
    settings: CostingSettings,
    command: IngredientCommand,
    json: bool,
) -> AppResult<()> {
    if let IngredientCommand::Cost(args) = command {
        return cost(args, json);
    }

    let service = IngredientService::new(api, settings);
    let mut catalog = service.load_catalog().await?;

    match command {
        IngredientCommand::List(args) => {
            let query = IngredientQuery {
                search: args.search,
                sort_by: args.sort,
                order: if args.desc { SortOrder::Desc } else { SortOrder::Asc },
            };
            list(&catalog, &query, json)
        }
        IngredientCommand::Add(form) => {
            let created = service.add(&mut catalog, &form.into_input()).await?;
            show_saved("Added", &created, json)
        }
        IngredientCommand::Edit(args) => {
            let id = find(&catalog, &args.ingredient)?;
            let base = catalog.get(id).map(IngredientInput::from).unwrap_or_default();
            let updated = service.edit(&mut catalog, id, &args.form.overlay(base)).await?;
            show_saved("Updated", &updated, json)
        }
        IngredientCommand::Delete(args) => {
            let id = find(&catalog, &args.ingredient)?;
            let removed = service.delete(&mut catalog, id).await?;
            if json {
                return print_json(&removed);
            }
            println!("Deleted {}.", removed.name);
            Ok(())
        }
        IngredientCommand::Import(args) => {
            let outcome = service.import_csv(&mut catalog, &args.path).await?;
            if json {
                return print_json(&outcome);
            }
            println!("Import finished: {}.", outcome.report);
            for ingredient in &outcome.added {
                println!("  + {}", ingredient.name);
            }
            Ok(())
        }
        IngredientCommand::Cost(_) => Ok(()),
    }
}

fn list(catalog: &IngredientCatalog, query: &IngredientQuery, json: bool) -> AppResult<()> {
    let rows = ingredient_rows(catalog, query);
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No ingredients found.");
        return Ok(());
    }

    println!(
        "{:<24} {:>5} {:>9} {:>9} {:>7} {:<20} {:>14}",
        "Name", "Unit", "Quantity", "Price", "Waste", "Supplier", "Cost/subunit"
    );
    for row in rows {
        let cost = row
            .display_cost
            .map(|c| format!("{}/{}", unit_money(c), row.display_unit));
        println!(
            "{:<24} {:>5} {:>9} {:>9} {:>7} {:<20} {:>14}",
            row.name,
            row.unit.symbol(),
            row.quantity.normalize(),
            money(row.purchase_price),
            percent(row.waste_percent),
            row.supplier,
            or_dash(cost),
        );
    }

    let summary = IngredientSummary::from_catalog(catalog)?;
    println!();
    println!(
        "{} ingredients, average waste {}",
        summary.total_ingredients,
        or_dash(summary.average_waste_percent.map(percent))
    );
    Ok(())
}

fn show_saved(verb: &str, ingredient: &Ingredient, json: bool) -> AppResult<()> {
    if json {
        return print_json(ingredient);
    }
    let cost = ingredient
        .cost_per_base_unit()
        .map(|c| format!("{}/{}", unit_money(c), ingredient.unit.recipe_unit()))
        .ok();
    println!("{} {} (true cost {}).", verb, ingredient.name, or_dash(cost));
    Ok(())
}

fn cost(args: CostArgs, json: bool) -> AppResult<()> {
    let cost = compute_unit_cost(args.price, args.size, args.waste, args.unit)?;
    if json {
        return print_json(&cost);
    }
    println!("Cost per {}: {}", args.unit, unit_money(cost.cost_per_unit));
    println!("  before waste: {}", unit_money(cost.base_cost_per_unit));
    println!("  waste uplift: {}", unit_money(cost.waste_uplift()));
    if args.unit.is_large() {
        println!(
            "Cost per {}: {}",
            args.unit.recipe_unit(),
            unit_money(cost.for_unit(args.unit))
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_sort_key() {
        assert_eq!(parse_sort_key("purchase-price"), Ok(IngredientSortKey::PurchasePrice));
        assert_eq!(parse_sort_key("COST"), Ok(IngredientSortKey::Cost));
        assert!(parse_sort_key("colour").is_err());
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(parse_unit("L"), Ok(MeasurementUnit::Liter));
        assert!(parse_unit("cup").is_err());
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let base = IngredientInput {
            name: Some("Oat Milk".to_string()),
            unit: Some(MeasurementUnit::Liter),
            quantity: Some(Decimal::ONE),
            purchase_price: Some(Decimal::from(2)),
            waste_percent: Some(Decimal::from(8)),
            supplier: Some("Local Dairy".to_string()),
            category: None,
        };
        let flags = IngredientFormArgs {
            price: Some(Decimal::from_str("2.40").unwrap()),
            ..IngredientFormArgs::default()
        };
        let merged = flags.overlay(base);
        assert_eq!(merged.name.as_deref(), Some("Oat Milk"));
        assert_eq!(merged.purchase_price, Some(Decimal::from_str("2.40").unwrap()));
        assert_eq!(merged.waste_percent, Some(Decimal::from(8)));
    }
}

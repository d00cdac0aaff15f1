//! `products list` and `analytics`

use clap::{Args, Subcommand};
use serde_json::Value;

use shared::analytics::Dashboard;
use shared::view::{ProductCosting, ProductQuery, ProductRow, ProductSortKey};
use shared::{CostingSettings, MarginStatus};

use super::output::{money, or_dash, percent, print_json};
use crate::error::AppResult;
use crate::external::BusyFoolApi;
use crate::services::{IngredientService, ProductService};

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Show every product with its true cost and margin
    List(ProductListArgs),
}

#[derive(Args, Debug)]
pub struct ProductListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// profitable, breaking-even or losing-money
    #[arg(long, value_parser = parse_status)]
    pub status: Option<MarginStatus>,
    /// margin, sales, price, name or impact
    #[arg(long, value_parser = parse_product_sort, default_value = "margin")]
    pub sort: ProductSortKey,
}

#[derive(Args, Debug)]
pub struct AnalyticsArgs {
    /// Number of biggest losers and winners to show
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

pub fn parse_status(raw: &str) -> Result<MarginStatus, String> {
    MarginStatus::parse(raw).ok_or_else(|| format!("unknown status: {raw}"))
}

pub fn parse_product_sort(raw: &str) -> Result<ProductSortKey, String> {
    let key = raw.trim().to_lowercase();
    serde_json::from_value(Value::String(key)).map_err(|_| format!("unknown sort key: {raw}"))
}

pub async fn run(
    api: BusyFoolApi,
    settings: &CostingSettings,
    command: ProductCommand,
    json: bool,
) -> AppResult<()> {
    let ProductCommand::List(args) = command;

    let catalog = IngredientService::new(api.clone(), settings.clone())
        .load_catalog()
        .await?;
    let service = ProductService::new(api, settings)?;
    let products = service.load().await?;

    let query = ProductQuery {
        search: args.search,
        category: args.category,
        status: args.status,
        sort_by: args.sort,
    };
    let rows = service.rows(&products, &catalog, &query);
    if json {
        return print_json(&rows);
    }
    print_rows(&rows);
    Ok(())
}

pub async fn analytics(
    api: BusyFoolApi,
    settings: &CostingSettings,
    args: AnalyticsArgs,
    json: bool,
) -> AppResult<()> {
    let catalog = IngredientService::new(api.clone(), settings.clone())
        .load_catalog()
        .await?;
    let service = ProductService::new(api, settings)?;
    let products = service.load().await?;

    let dashboard = service.dashboard(&products, &catalog, args.top)?;
    if json {
        return print_json(&dashboard);
    }
    print_dashboard(&dashboard);
    Ok(())
}

fn status_label(row: &ProductRow) -> String {
    match &row.costing {
        ProductCosting::Costed(margin) => margin.status.to_string(),
        ProductCosting::MissingRecipe { .. } => "No recipe".to_string(),
        ProductCosting::Invalid { .. } => "Invalid".to_string(),
    }
}

fn print_rows(rows: &[ProductRow]) {
    if rows.is_empty() {
        println!("No products found.");
        return;
    }
    println!(
        "{:<24} {:<14} {:>8} {:>8} {:>9} {:>8} {:>6} {:<14}",
        "Name", "Category", "Price", "Cost", "Margin", "Margin%", "Sold", "Status"
    );
    for row in rows {
        let margin = row.margin();
        println!(
            "{:<24} {:<14} {:>8} {:>8} {:>9} {:>8} {:>6} {:<14}",
            row.name,
            row.category,
            money(row.sell_price),
            or_dash(margin.map(|m| money(m.total_cost))),
            or_dash(margin.map(|m| money(m.margin_amount))),
            or_dash(margin.map(|m| percent(m.margin_percent))),
            row.units_sold,
            status_label(row),
        );
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    let summary = &dashboard.summary;
    let metrics = &dashboard.metrics;

    println!("Products: {}", summary.total_products);
    println!(
        "  profitable {}, breaking even {}, losing money {}, not costed {}",
        summary.profitable, summary.breaking_even, summary.losing_money, summary.uncosted
    );
    println!(
        "Average margin: {}",
        or_dash(summary.average_margin_percent.map(percent))
    );
    println!("Losing per day: {}", money(summary.daily_loss));
    println!(
        "Ingredients: {} (average waste {})",
        dashboard.ingredients.total_ingredients,
        or_dash(dashboard.ingredients.average_waste_percent.map(percent))
    );
    println!();
    println!("Revenue {}  Costs {}  Profit {}", money(metrics.revenue), money(metrics.costs), money(metrics.profit));

    if !dashboard.top_losers.is_empty() {
        println!();
        println!("Biggest losers:");
        for item in &dashboard.top_losers {
            println!(
                "  {:<24} {:>8}/sale x {:<5} = {:>10}",
                item.name,
                money(item.per_unit),
                item.units_sold,
                money(item.total)
            );
        }
    }
    if !dashboard.top_winners.is_empty() {
        println!();
        println!("Biggest winners:");
        for item in &dashboard.top_winners {
            println!(
                "  {:<24} {:>8}/sale x {:<5} = {:>10}",
                item.name,
                money(item.per_unit),
                item.units_sold,
                money(item.total)
            );
        }
    }
    if !dashboard.missing_recipes.is_empty() {
        println!();
        println!("Missing recipes:");
        for item in &dashboard.missing_recipes {
            let detail = match (&item.reason, item.unresolved.is_empty()) {
                (Some(reason), _) => reason.clone(),
                (None, true) => "no ingredients".to_string(),
                (None, false) => format!("unknown ingredients: {}", item.unresolved.join(", ")),
            };
            println!("  {:<24} {}", item.name, detail);
        }
    }
    if !dashboard.waste.is_empty() {
        println!();
        println!("Waste per package (total {}):", money(dashboard.total_waste_cost));
        for line in &dashboard.waste {
            println!(
                "  {:<24} {:>6} of {:>8} = {:>8}",
                line.name,
                percent(line.waste_percent),
                money(line.purchase_price),
                money(line.waste_cost_per_package)
            );
        }
    }
}

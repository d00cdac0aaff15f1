//! Command line interface
//!
//! Each subcommand runs one sequential flow: load what it needs from the API,
//! run the costing engine locally, print the result.

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::AppResult;
use crate::external::BusyFoolApi;

pub mod auth;
pub mod ingredients;
pub mod output;
pub mod products;

#[derive(Parser, Debug)]
#[command(name = "busy-fool")]
#[command(about = "True-cost margins for coffee shop menus")]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the configured API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and print an access token
    Login(auth::LoginArgs),
    /// Create an account
    Register(auth::RegisterArgs),
    /// Manage the ingredient catalog
    Ingredients(Ingredients),
    /// Product margins
    Products(Products),
    /// Dashboard analytics
    Analytics(products::AnalyticsArgs),
}

#[derive(Args, Debug)]
pub struct Ingredients {
    #[command(subcommand)]
    pub command: ingredients::IngredientCommand,
}

#[derive(Args, Debug)]
pub struct Products {
    #[command(subcommand)]
    pub command: products::ProductCommand,
}

/// Run a parsed command line against the given configuration
pub async fn run(cli: Cli, mut config: Config) -> AppResult<()> {
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    let api = BusyFoolApi::new(&config.api)?;
    let json = cli.json;

    match cli.command {
        Command::Login(args) => auth::login(&api, args, json).await,
        Command::Register(args) => auth::register(&api, args, json).await,
        Command::Ingredients(group) => {
            ingredients::run(api, config.costing, group.command, json).await
        }
        Command::Products(group) => products::run(api, &config.costing, group.command, json).await,
        Command::Analytics(args) => products::analytics(api, &config.costing, args, json).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_command() {
        let cli = Cli::try_parse_from([
            "busy-fool",
            "ingredients",
            "list",
            "--sort",
            "purchase-price",
            "--desc",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Ingredients(_)));
    }
}

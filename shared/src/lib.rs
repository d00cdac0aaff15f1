//! Costing engine and shared models for Busy Fool
//!
//! This crate holds everything that does not talk to the network: the
//! true-cost engine, the ingredient catalog, form validation, the derived
//! table views and dashboard analytics. It is used by the CLI client and,
//! through WASM, by the web dashboard.

pub mod analytics;
pub mod catalog;
pub mod costing;
pub mod error;
pub mod models;
pub mod presets;
pub mod validation;
pub mod view;

pub use catalog::{IngredientCatalog, MergeReport};
pub use costing::*;
pub use error::{CostingError, CostingResult};
pub use models::*;
pub use presets::CostingSettings;

//! Services tying the API client to the costing engine

pub mod ingredient;
pub mod product;

pub use ingredient::{ImportOutcome, IngredientService};
pub use product::ProductService;

//! Domain models for Busy Fool

mod ingredient;
mod product;
mod unit;
mod user;

pub use ingredient::*;
pub use product::*;
pub use unit::*;
pub use user::*;

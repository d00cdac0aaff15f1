//! Busy Fool - command line client
//!
//! Talks to the Busy Fool REST API for persistence and computes every
//! true cost, margin and dashboard figure locally with `shared`.

pub mod commands;
pub mod config;
pub mod error;
pub mod external;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use external::BusyFoolApi;

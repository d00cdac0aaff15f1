//! External API integrations

pub mod api;

pub use api::BusyFoolApi;

//! Error handling for the Busy Fool client
//!
//! API failures are mapped from HTTP status codes; costing and validation
//! failures come straight from the shared engine.

use shared::CostingError;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Costing(#[from] CostingError),

    // Errors reported by the API
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Local errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not logged in: run `busy-fool login` or set BF_API__ACCESS_TOKEN")]
    MissingToken,
}

impl AppError {
    /// Stable machine-readable code, used for `--json` output
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Costing(err) => err.code(),
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::MissingToken => "MISSING_TOKEN",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costing_errors_keep_their_message() {
        let err: AppError = CostingError::duplicate("Oat Milk").into();
        assert_eq!(err.to_string(), "An ingredient named 'Oat Milk' already exists");
        assert_eq!(err.code(), "DUPLICATE_NAME");
    }

    #[test]
    fn test_api_error_display() {
        let err = AppError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
        assert_eq!(AppError::MissingToken.code(), "MISSING_TOKEN");
    }
}

//! Error taxonomy for costing, catalog and validation

use thiserror::Error;

/// Errors raised by the costing engine and the ingredient catalog.
///
/// All variants are local and recoverable: the caller decides how to present
/// them. `MissingReference` is kept apart from `InvalidInput` so a dashboard
/// can flag a cost tracking gap instead of a plain form error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostingError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No cost on record for ingredient '{ingredient}'")]
    MissingReference { ingredient: String },

    #[error("An ingredient named '{name}' already exists")]
    DuplicateName { name: String },
}

impl CostingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CostingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(ingredient: impl Into<String>) -> Self {
        CostingError::MissingReference {
            ingredient: ingredient.into(),
        }
    }

    pub fn duplicate(name: impl Into<String>) -> Self {
        CostingError::DuplicateName { name: name.into() }
    }

    /// Stable machine-readable code, used by the WASM bindings and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            CostingError::InvalidInput { .. } => "INVALID_INPUT",
            CostingError::MissingReference { .. } => "MISSING_REFERENCE",
            CostingError::DuplicateName { .. } => "DUPLICATE_NAME",
        }
    }

    /// Field the error refers to, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            CostingError::InvalidInput { field, .. } => Some(field),
            CostingError::DuplicateName { .. } => Some("name"),
            CostingError::MissingReference { .. } => None,
        }
    }
}

/// Result alias for the costing engine
pub type CostingResult<T> = Result<T, CostingError>;

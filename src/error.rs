//! Custom error types for Chorebook
//!
//! Every failure is scoped to the single requested operation. Callers map
//! these to user-facing messages; the core never carries presentation text
//! beyond the `Display` impls below.

use thiserror::Error;

use crate::models::Money;

/// The main error type for Chorebook operations
#[derive(Error, Debug)]
pub enum ChorebookError {
    /// Missing or malformed required fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// A payment would exceed what the payer still owes
    #[error("Payment of {attempted} exceeds the remaining owed amount of {owed}")]
    Overpayment { owed: Money, attempted: Money },

    /// The acting member lacks permission for a mutating action
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Degenerate split (no participants)
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl ChorebookError {
    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for households
    pub fn household_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Household",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for chores
    pub fn chore_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Chore",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for alerts
    pub fn alert_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Alert",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Check if this is an overpayment rejection
    pub fn is_overpayment(&self) -> bool {
        matches!(self, Self::Overpayment { .. })
    }
}

impl From<std::io::Error> for ChorebookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ChorebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ChorebookError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for Chorebook operations
pub type ChorebookResult<T> = Result<T, ChorebookError>;

//! # Error Types
//!
//! Domain-specific error types for tread-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tread-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tread-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ServiceError     - DbError or CoreError from a service call        │
//! │                                                                         │
//! │  CLI errors (in app)                                                    │
//! │  └── AppError         - What the operator sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → AppError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalid promotion parameters are NOT errors here: the quote calculator
//! falls back to the base price (see [`crate::quote::InvalidPromotion`]).

use thiserror::Error;

use crate::types::StockItemKind;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Tire not found: {0}")]
    TireNotFound(i64),

    #[error("Wheel not found: {0}")]
    WheelNotFound(i64),

    #[error("Promotion not found: {0}")]
    PromotionNotFound(i64),

    #[error("Fitment not found: {0}")]
    FitmentNotFound(i64),

    /// Stock-out larger than what is on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// tread stock out --tire 12 --quantity 5
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { kind: Tire, id: 12, available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {kind} {id}: available {available}, requested {requested}")]
    InsufficientStock {
        kind: StockItemKind,
        id: i64,
        available: i64,
        requested: i64,
    },

    /// Deleting an item that still has units on the shelf.
    #[error("Cannot delete {kind} {id}: {quantity} still in stock")]
    StockRemaining {
        kind: StockItemKind,
        id: i64,
        quantity: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// The not-found error for an item of the given kind.
    pub fn item_not_found(kind: StockItemKind, id: i64) -> Self {
        match kind {
            StockItemKind::Tire => CoreError::TireNotFound(id),
            StockItemKind::Wheel => CoreError::WheelNotFound(id),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised on writes only. Reads never reject stored data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format or an inconsistent combination of fields.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., a second promotion with the same name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

//! # CLI Error Type
//!
//! Unified error type for `tread` commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  tread stock out tire 12 5                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command handler → AppResult<()>                                        │
//! │         │                                                               │
//! │         ├── ServiceError::Core(InsufficientStock) ──┐                   │
//! │         ├── DbError::UniqueViolation ───────────────┤                   │
//! │         ├── ValidationError ────────────────────────┤                   │
//! │         │                                           ▼                   │
//! │         │                                       AppError                │
//! │         │                                           │                   │
//! │         ▼                                           ▼                   │
//! │  exit 0                          "error: ..." on stderr, exit code      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Codes
//! - `1` - storage, I/O, or configuration failure
//! - `2` - the request was rejected (validation, insufficient stock, duplicate)
//! - `3` - the referenced record does not exist

use thiserror::Error;
use tread_core::{CoreError, ValidationError};
use tread_db::{DbError, ServiceError};

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file unreadable, unparsable, or out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No platform data directory and no explicit database path.
    #[error("Could not determine the data directory; pass --db or set TREAD_DB_PATH")]
    NoDataDir,

    /// Arguments that parse but make no sense together.
    #[error("{0}")]
    Usage(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::NotFound { .. } => 3,
            AppError::Db(err) if err.is_not_found() => 3,
            AppError::Core(
                CoreError::TireNotFound(_)
                | CoreError::WheelNotFound(_)
                | CoreError::PromotionNotFound(_)
                | CoreError::FitmentNotFound(_),
            ) => 3,
            AppError::Db(
                DbError::Validation(_)
                | DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::CheckViolation(_),
            ) => 2,
            AppError::Core(_) | AppError::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Db(e) => AppError::Db(e),
            ServiceError::Core(e) => AppError::Core(e),
            ServiceError::Format(e) => AppError::Json(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

//! # Repository Module
//!
//! Database repository implementations for Tread.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  db.tires().list(&filter)                                       │
//! │       ▼                                                                 │
//! │  TireRepository                                                         │
//! │  ├── get_listing(&self, id)      ← tire + promotion + quote             │
//! │  ├── list(&self, filter)                                                │
//! │  ├── insert(&self, tire)                                                │
//! │  └── update(&self, id, tire)                                            │
//! │       │                                                                 │
//! │       │  SQL Query → FromRow struct → domain type                       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PromotionRepository`](promotion::PromotionRepository) - Promotion CRUD
//! - [`TireRepository`](tire::TireRepository) - Tire listings with quotes
//! - [`WheelRepository`](wheel::WheelRepository) - Wheel CRUD and search
//! - [`FitmentRepository`](fitment::FitmentRepository) - Vehicle fitments
//! - [`MovementRepository`](movement::MovementRepository) - Stock ledgers
//!
//! ## Column Conversions
//! Prices live in `*_cents` INTEGER columns; promotion parameters in REAL
//! columns. The helpers below convert at the row boundary so no float ever
//! reaches the quote calculator.

pub mod fitment;
pub mod movement;
pub mod promotion;
pub mod tire;
pub mod wheel;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tread_core::Money;

use crate::error::{DbError, DbResult};

/// Reads a nullable satang column.
pub(crate) fn money_from_cents(cents: Option<i64>) -> Option<Money> {
    cents.map(Money::from_cents)
}

/// Prepares a price for a satang column, rounding half to even.
pub(crate) fn to_cents(column: &str, money: Money) -> DbResult<i64> {
    money
        .to_cents()
        .ok_or_else(|| DbError::invalid_value(column, format!("{money} does not fit in satang")))
}

pub(crate) fn optional_cents(column: &str, money: Option<Money>) -> DbResult<Option<i64>> {
    money.map(|m| to_cents(column, m)).transpose()
}

/// Reads a REAL parameter column. Non-finite values read as missing.
pub(crate) fn decimal_from_real(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64)
}

pub(crate) fn real_from_decimal(column: &str, value: Decimal) -> DbResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| DbError::invalid_value(column, format!("{value} is not representable")))
}

/// `%query%` for a LIKE search.
pub(crate) fn like_pattern(query: &str) -> String {
    format!("%{query}%")
}

//! # Validation Module
//!
//! Write-time input validation for the shop.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                    │
//! │  ├── Type validation (argument parsing)                                 │
//! │  └── Immediate operator feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Business rule validation before any write                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE natural keys                                                │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Reads never validate: a stored promotion with bad parameters is        │
//! │  still listed, and the quote calculator falls back to the base price.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tread_core::validation::{validate_movement_quantity, validate_text};
//!
//! validate_text("brand", "Bridgestone").unwrap();
//! assert!(validate_movement_quantity(0).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::promotion::{NewPromotion, PromotionType};
use crate::types::{NewFitment, NewTire, NewWheel};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text field.
pub const MAX_TEXT_LEN: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_TEXT_LEN`] characters
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string (empty lists everything).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(query.to_string())
}

fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if price.to_cents().is_none() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "amount is too large".to_string(),
        });
    }
    Ok(())
}

fn validate_optional_price(field: &str, price: Option<Money>) -> ValidationResult<()> {
    price.map_or(Ok(()), |p| validate_price(field, p))
}

fn validate_stock_level(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates the size of a stock movement.
///
/// ## Rules
/// - Must be greater than zero; direction is carried separately
pub fn validate_movement_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a promotion before it is stored.
///
/// ## Rules
/// | Type | value1 | value2 |
/// |---|---|---|
/// | `buy_x_get_y` | X > 0 | required, Y > 0 |
/// | `percentage_discount` | 0 < percent ≤ 100 | ignored |
/// | `fixed_price_per_n` | total > 0 | required, N > 0 |
///
/// Stricter than the quote calculator, which also accepts `Y = 0` and
/// `percent = 0` on promotions that got into storage some other way.
pub fn validate_promotion(promotion: &NewPromotion) -> ValidationResult<()> {
    validate_text("name", &promotion.name)?;

    let positive = |field: &str, value: Decimal| {
        if value > Decimal::ZERO {
            Ok(())
        } else {
            Err(ValidationError::MustBePositive {
                field: field.to_string(),
            })
        }
    };
    let second = |field: &str| {
        promotion.value2.ok_or_else(|| ValidationError::Required {
            field: field.to_string(),
        })
    };

    match promotion.promo_type {
        PromotionType::BuyXGetY => {
            positive("buy quantity (X)", promotion.value1)?;
            positive("free quantity (Y)", second("free quantity (Y)")?)?;
        }
        PromotionType::PercentageDiscount => {
            let percent = promotion.value1;
            if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(ValidationError::OutOfRange {
                    field: "percent".to_string(),
                    min: "0 (exclusive)".to_string(),
                    max: "100".to_string(),
                });
            }
        }
        PromotionType::FixedPricePerN => {
            positive("bundle price", promotion.value1)?;
            positive("bundle size (N)", second("bundle size (N)")?)?;
        }
    }

    Ok(())
}

/// Validates a tire before it is stored.
pub fn validate_tire(tire: &NewTire) -> ValidationResult<()> {
    validate_text("brand", &tire.brand)?;
    validate_text("model", &tire.model)?;
    validate_text("size", &tire.size)?;
    validate_stock_level(tire.quantity)?;

    validate_price("price_per_item", tire.price_per_item)?;
    validate_optional_price("cost_sc", tire.cost_sc)?;
    validate_optional_price("cost_dunlop", tire.cost_dunlop)?;
    validate_optional_price("cost_online", tire.cost_online)?;
    validate_optional_price("wholesale_price1", tire.wholesale_price1)?;
    validate_optional_price("wholesale_price2", tire.wholesale_price2)?;

    if let Some(year) = tire.year_of_manufacture {
        if !(1900..=2999).contains(&year) {
            return Err(ValidationError::OutOfRange {
                field: "year_of_manufacture".to_string(),
                min: "1900".to_string(),
                max: "2999".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a wheel before it is stored.
pub fn validate_wheel(wheel: &NewWheel) -> ValidationResult<()> {
    validate_text("brand", &wheel.brand)?;
    validate_text("model", &wheel.model)?;
    validate_text("pcd", &wheel.pcd)?;
    validate_stock_level(wheel.quantity)?;

    for (field, value) in [("diameter", wheel.diameter), ("width", wheel.width)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: field.to_string(),
            });
        }
    }

    validate_price("retail_price", wheel.retail_price)?;
    validate_optional_price("cost", wheel.cost)?;
    validate_optional_price("cost_online", wheel.cost_online)?;
    validate_optional_price("wholesale_price1", wheel.wholesale_price1)?;
    validate_optional_price("wholesale_price2", wheel.wholesale_price2)?;

    Ok(())
}

/// Validates a vehicle fitment.
///
/// ## Rules
/// - Vehicle brand and model required
/// - `year_end`, when given, not before `year_start`
pub fn validate_fitment(fitment: &NewFitment) -> ValidationResult<()> {
    validate_text("brand", &fitment.brand)?;
    validate_text("model", &fitment.model)?;

    if let Some(year_end) = fitment.year_end {
        if year_end < fitment.year_start {
            return Err(ValidationError::InvalidFormat {
                field: "year_end".to_string(),
                reason: format!("must not be before year_start ({})", fitment.year_start),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

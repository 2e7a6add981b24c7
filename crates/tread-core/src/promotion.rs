//! # Promotions
//!
//! Promotion records as stored, and the typed rules they resolve into.
//!
//! ## Record → Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promotions row                          PromotionRule                  │
//! │  ──────────────                          ─────────────                  │
//! │  type = "buy_x_get_y"        ──────►     BuyXGetY { buy: 3, free: 1 }   │
//! │  value1 = 3, value2 = 1                                                 │
//! │                                                                         │
//! │  type = "percentage_discount" ─────►     PercentageDiscount { 25 }      │
//! │  value1 = 25, value2 = NULL                                             │
//! │                                                                         │
//! │  type = "fixed_price_per_n"  ──────►     FixedPricePerN { 2900, 3 }     │
//! │  value1 = 2900, value2 = 3                                              │
//! │                                                                         │
//! │  type = "mystery" / missing value ──►    None (price falls back)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored tag is kept as a raw string so a row with an unknown tag can
//! still be read, listed and edited; it simply never prices anything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Promotion Type
// =============================================================================

/// The promotion scheme tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    /// Buy X, get Y free.
    BuyXGetY,
    /// Percent off the unit price.
    PercentageDiscount,
    /// A flat price for a bundle of N items.
    FixedPricePerN,
}

impl PromotionType {
    /// All known tags, in display order.
    pub const ALL: [PromotionType; 3] = [
        PromotionType::BuyXGetY,
        PromotionType::PercentageDiscount,
        PromotionType::FixedPricePerN,
    ];

    /// The tag as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionType::BuyXGetY => "buy_x_get_y",
            PromotionType::PercentageDiscount => "percentage_discount",
            PromotionType::FixedPricePerN => "fixed_price_per_n",
        }
    }

    /// Whether the scheme needs a second parameter.
    pub const fn uses_value2(&self) -> bool {
        !matches!(self, PromotionType::PercentageDiscount)
    }
}

impl fmt::Display for PromotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "buy_x_get_y" => Ok(PromotionType::BuyXGetY),
            "percentage_discount" => Ok(PromotionType::PercentageDiscount),
            "fixed_price_per_n" => Ok(PromotionType::FixedPricePerN),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: PromotionType::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Promotion Rule
// =============================================================================

/// A promotion scheme with its parameters bound.
///
/// Parameters are carried as configured; range checks happen when the rule
/// is applied to a price (see [`crate::quote`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionRule {
    /// Pay for `buy` items, receive `free` more.
    BuyXGetY { buy: Decimal, free: Decimal },
    /// `percent` off each item (0-100).
    PercentageDiscount { percent: Decimal },
    /// `total` baht for `count` items.
    FixedPricePerN { total: Decimal, count: Decimal },
}

impl PromotionRule {
    /// The tag this rule was resolved from.
    pub const fn promotion_type(&self) -> PromotionType {
        match self {
            PromotionRule::BuyXGetY { .. } => PromotionType::BuyXGetY,
            PromotionRule::PercentageDiscount { .. } => PromotionType::PercentageDiscount,
            PromotionRule::FixedPricePerN { .. } => PromotionType::FixedPricePerN,
        }
    }

    /// Binds a tag to its parameters.
    ///
    /// Returns `None` when a parameter the scheme needs is missing.
    pub fn from_parts(
        promo_type: PromotionType,
        value1: Option<Decimal>,
        value2: Option<Decimal>,
    ) -> Option<Self> {
        match promo_type {
            PromotionType::BuyXGetY => Some(PromotionRule::BuyXGetY {
                buy: value1?,
                free: value2?,
            }),
            PromotionType::PercentageDiscount => {
                Some(PromotionRule::PercentageDiscount { percent: value1? })
            }
            PromotionType::FixedPricePerN => Some(PromotionRule::FixedPricePerN {
                total: value1?,
                count: value2?,
            }),
        }
    }
}

// =============================================================================
// Promotion Record
// =============================================================================

/// A named discount rule, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Integer identifier assigned by storage.
    pub id: i64,

    /// Unique display label.
    pub name: String,

    /// Raw scheme tag (see [`PromotionType`]).
    pub promo_type: String,

    /// First parameter: X, percent, or fixed total.
    pub value1: Option<Decimal>,

    /// Second parameter: Y or N. Absent for percentage discounts.
    pub value2: Option<Decimal>,

    /// Inactive promotions never affect pricing.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Parses the stored tag, if it is one we know.
    pub fn promotion_type(&self) -> Option<PromotionType> {
        self.promo_type.parse().ok()
    }

    /// Resolves the record into a typed rule.
    ///
    /// Returns `None` for an unrecognised tag or a missing parameter. The
    /// active flag is not consulted here.
    pub fn rule(&self) -> Option<PromotionRule> {
        PromotionRule::from_parts(self.promotion_type()?, self.value1, self.value2)
    }
}

/// Input for creating or editing a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    pub promo_type: PromotionType,
    pub value1: Decimal,
    #[serde(default)]
    pub value2: Option<Decimal>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

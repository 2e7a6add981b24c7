//! # tread-core: Pure Business Logic for the Tire & Wheel Shop
//!
//! This crate is the **heart** of Tread. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tread Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    tread CLI (apps/tread-cli)                   │    │
//! │  │   quote · promotions · tires · wheels · stock · import/export   │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    tread-db (Database Layer)                    │    │
//! │  │     SQLite repositories, inventory service, migrations          │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ tread-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   money   │  │ promotion │  │   quote   │  │   types   │    │    │
//! │  │   │   Money   │  │   Rule    │  │ PriceQuote│  │ Tire/Wheel│    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                   │    │
//! │  │   │   stock   │  │ validation│  │  import   │                   │    │
//! │  │   │ movements │  │   rules   │  │   rows    │                   │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘                   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money` in baht
//! - [`promotion`] - Promotion records and the typed rules they resolve into
//! - [`quote`] - The price quote calculator
//! - [`types`] - Tires, wheels, fitments, stock movements
//! - [`stock`] - Stock level arithmetic
//! - [`validation`] - Write-time business rules
//! - [`import`] - Bulk import/export rows
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tread_core::money::Money;
//! use tread_core::promotion::Promotion;
//! use tread_core::quote::compute_quote;
//!
//! let promotion = Promotion {
//!     id: 1,
//!     name: "25% off summer tires".to_string(),
//!     promo_type: "percentage_discount".to_string(),
//!     value1: Some(Decimal::from(25)),
//!     value2: None,
//!     is_active: true,
//!     created_at: chrono::Utc::now(),
//! };
//!
//! let quote = compute_quote(Some(Money::from_major(1000)), Some(&promotion));
//! assert_eq!(quote.price_per_item(), Some(Money::from_major(750)));
//! assert_eq!(quote.price_for_four(), Some(Money::from_major(3000)));
//! assert_eq!(quote.description(), Some("25% off"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod money;
pub mod promotion;
pub mod quote;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use promotion::{NewPromotion, Promotion, PromotionRule, PromotionType};
pub use quote::{compute_quote, evaluate_promotion, AppliedDiscount, InvalidPromotion, PriceQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of items in the quoted set.
///
/// Four tires is the shop's standard sale, so every quote carries a
/// set-of-four price next to the unit price.
pub const QUOTE_SET_SIZE: i64 = 4;

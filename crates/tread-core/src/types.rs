//! # Domain Types
//!
//! Inventory types used throughout the shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │      Tire       │   │      Wheel      │   │  WheelFitment   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (i64)       │   │  id (i64)       │   │  wheel_id (FK)  │        │
//! │  │  brand/model/   │   │  brand/model/   │   │  vehicle brand  │        │
//! │  │    size (key)   │   │    diameter/pcd │   │  year range     │        │
//! │  │  price_per_item │   │  retail_price   │   └─────────────────┘        │
//! │  │  promotion_id ──┼─► Promotion          │                            │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  StockMovement  │   │  MovementType   │   │  StockItemKind  │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  quantity_change│   │  In             │   │  Tire           │        │
//! │  │  remaining_qty  │   │  Out            │   │  Wheel          │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every item has:
//! - `id`: integer assigned by storage, used for relations
//! - A natural key (brand/model/size for tires, every sizing column for wheels)
//!   used to match rows during bulk import

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::promotion::Promotion;
use crate::quote::{compute_quote, PriceQuote};

// =============================================================================
// Stock Item Kind
// =============================================================================

/// Which inventory table (and movement ledger) an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockItemKind {
    Tire,
    Wheel,
}

impl StockItemKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockItemKind::Tire => "tire",
            StockItemKind::Wheel => "wheel",
        }
    }
}

impl fmt::Display for StockItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tire
// =============================================================================

/// A tire model held in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tire {
    pub id: i64,
    pub brand: String,
    pub model: String,

    /// Size designation, e.g. `265/65R17`.
    pub size: String,

    /// Units on hand. Changed only through stock movements and imports.
    pub quantity: i64,

    /// Supplier cost prices.
    pub cost_sc: Option<Money>,
    pub cost_dunlop: Option<Money>,
    pub cost_online: Option<Money>,

    pub wholesale_price1: Option<Money>,
    pub wholesale_price2: Option<Money>,

    /// Base retail price per tire; the input to every quote.
    pub price_per_item: Money,

    pub promotion_id: Option<i64>,
    pub year_of_manufacture: Option<i32>,
}

impl Tire {
    /// Short label for listings and movement history.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.size)
    }
}

/// Input for creating or editing a tire.
///
/// `quantity` is the initial stock on create and is ignored on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTire {
    pub brand: String,
    pub model: String,
    pub size: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub cost_sc: Option<Money>,
    #[serde(default)]
    pub cost_dunlop: Option<Money>,
    #[serde(default)]
    pub cost_online: Option<Money>,
    #[serde(default)]
    pub wholesale_price1: Option<Money>,
    #[serde(default)]
    pub wholesale_price2: Option<Money>,
    pub price_per_item: Money,
    #[serde(default)]
    pub promotion_id: Option<i64>,
    #[serde(default)]
    pub year_of_manufacture: Option<i32>,
}

/// A tire with its promotion resolved and its display prices computed.
///
/// This is what listing views, detail views and exports consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TireListing {
    pub tire: Tire,
    pub promotion: Option<Promotion>,
    pub quote: PriceQuote,
}

impl TireListing {
    /// Quotes the tire against its linked promotion.
    pub fn new(tire: Tire, promotion: Option<Promotion>) -> Self {
        let quote = compute_quote(Some(tire.price_per_item), promotion.as_ref());
        TireListing {
            tire,
            promotion,
            quote,
        }
    }
}

// =============================================================================
// Wheel
// =============================================================================

/// An alloy wheel model held in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub id: i64,
    pub brand: String,
    pub model: String,

    /// Rim diameter in inches.
    pub diameter: f64,

    /// Bolt pattern, e.g. `5x114.3`.
    pub pcd: String,

    /// Rim width in inches.
    pub width: f64,

    /// Offset in millimetres.
    pub et: Option<i64>,
    pub color: Option<String>,

    pub quantity: i64,
    pub cost: Option<Money>,
    pub cost_online: Option<Money>,
    pub wholesale_price1: Option<Money>,
    pub wholesale_price2: Option<Money>,
    pub retail_price: Money,

    /// Product photo, stored by the caller under this name.
    pub image_filename: Option<String>,
}

impl Wheel {
    pub fn label(&self) -> String {
        format!("{} {} {}\" {}", self.brand, self.model, self.diameter, self.pcd)
    }
}

/// Input for creating or editing a wheel.
///
/// `quantity` is the initial stock on create and is ignored on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWheel {
    pub brand: String,
    pub model: String,
    pub diameter: f64,
    pub pcd: String,
    pub width: f64,
    #[serde(default)]
    pub et: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub cost: Option<Money>,
    #[serde(default)]
    pub cost_online: Option<Money>,
    #[serde(default)]
    pub wholesale_price1: Option<Money>,
    #[serde(default)]
    pub wholesale_price2: Option<Money>,
    pub retail_price: Money,
    #[serde(default)]
    pub image_filename: Option<String>,
}

// =============================================================================
// Wheel Fitment
// =============================================================================

/// A vehicle a wheel is known to fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelFitment {
    pub id: i64,
    pub wheel_id: i64,

    /// Vehicle make and model.
    pub brand: String,
    pub model: String,

    pub year_start: i32,

    /// Open-ended when absent.
    pub year_end: Option<i32>,
}

impl WheelFitment {
    /// Whether the fitment covers the given model year.
    pub fn covers_year(&self, year: i32) -> bool {
        year >= self.year_start && self.year_end.map_or(true, |end| year <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFitment {
    pub brand: String,
    pub model: String,
    pub year_start: i32,
    #[serde(default)]
    pub year_end: Option<i32>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods sold or removed.
    Out,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger entry: a change to an item's stock and the balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub kind: StockItemKind,
    pub item_id: i64,
    pub timestamp: DateTime<Utc>,
    pub movement_type: MovementType,

    /// Always positive; direction comes from `movement_type`.
    pub quantity_change: i64,

    /// Stock on hand after this movement.
    pub remaining_quantity: i64,
    pub notes: Option<String>,
}

/// A movement joined with a label for the item it touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementHistoryEntry {
    pub movement: StockMovement,
    pub item_label: String,
}

// =============================================================================
// Listing Filter
// =============================================================================

/// Search options for tire and wheel listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilter {
    /// Substring matched against the text columns.
    pub query: Option<String>,

    /// Exact brand; `None` (or `"all"`) lists every brand.
    pub brand: Option<String>,
}

impl InventoryFilter {
    pub fn search(query: impl Into<String>) -> Self {
        InventoryFilter {
            query: Some(query.into()),
            brand: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Trimmed search text, or `None` if blank.
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Brand to filter on, or `None` for every brand.
    pub fn brand_filter(&self) -> Option<&str> {
        self.brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case("all"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn tire(promotion_id: Option<i64>) -> Tire {
        Tire {
            id: 1,
            brand: "Michelin".to_string(),
            model: "Primacy 4".to_string(),
            size: "205/55R16".to_string(),
            quantity: 8,
            cost_sc: None,
            cost_dunlop: None,
            cost_online: None,
            wholesale_price1: None,
            wholesale_price2: None,
            price_per_item: Money::from_major(1000),
            promotion_id,
            year_of_manufacture: Some(2024),
        }
    }

    #[test]
    fn test_tire_listing_applies_promotion() {
        let promotion = Promotion {
            id: 3,
            name: "Buy 3 get 1".to_string(),
            promo_type: "buy_x_get_y".to_string(),
            value1: Some(Decimal::from(3)),
            value2: Some(Decimal::from(1)),
            is_active: true,
            created_at: Utc::now(),
        };

        let listing = TireListing::new(tire(Some(3)), Some(promotion));
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(750)));
        assert_eq!(listing.quote.description(), Some("Buy 3 get 1 free"));
    }

    #[test]
    fn test_tire_listing_without_promotion() {
        let listing = TireListing::new(tire(None), None);
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(1000)));
        assert_eq!(listing.quote.price_for_four(), Some(Money::from_major(4000)));
        assert!(!listing.quote.is_promotional());
    }

    #[test]
    fn test_movement_type_serialization() {
        assert_eq!(serde_json::to_string(&MovementType::In).unwrap(), "\"IN\"");
        assert_eq!(serde_json::to_string(&MovementType::Out).unwrap(), "\"OUT\"");
        assert_eq!(MovementType::Out.to_string(), "OUT");
    }

    #[test]
    fn test_fitment_year_coverage() {
        let fitment = WheelFitment {
            id: 1,
            wheel_id: 1,
            brand: "Toyota".to_string(),
            model: "Hilux Revo".to_string(),
            year_start: 2015,
            year_end: None,
        };
        assert!(fitment.covers_year(2015));
        assert!(fitment.covers_year(2030));
        assert!(!fitment.covers_year(2014));

        let closed = WheelFitment {
            year_end: Some(2019),
            ..fitment
        };
        assert!(closed.covers_year(2019));
        assert!(!closed.covers_year(2020));
    }

    #[test]
    fn test_filter_normalization() {
        let filter = InventoryFilter::search("  ").with_brand("all");
        assert_eq!(filter.query_text(), None);
        assert_eq!(filter.brand_filter(), None);

        let filter = InventoryFilter::search(" R16 ").with_brand("Bridgestone");
        assert_eq!(filter.query_text(), Some("R16"));
        assert_eq!(filter.brand_filter(), Some("Bridgestone"));
    }
}

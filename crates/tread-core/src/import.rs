//! # Bulk Import / Export Rows
//!
//! Flat, serde-friendly row shapes for moving whole inventories in and out
//! as JSON files.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tires.json  ─► parse_rows ─► [Ok(row), Err(msg), Ok(row), ...]         │
//! │                                   │          │                          │
//! │                                   ▼          ▼                          │
//! │                       row.into_new_tire()   RowError { row: 3, .. }     │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                  upsert by natural key (tread-db InventoryService)      │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │            ImportSummary { imported, updated, errors }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A bad row never aborts the file. Row numbers are reported the way a
//! spreadsheet shows them: the header is row 1, so data index 0 is row 2.
//!
//! Exported rows carry every import column, so an export can be edited and
//! imported back unchanged.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewTire, NewWheel, TireListing, Wheel};
use crate::validation::{validate_tire, validate_wheel, ValidationResult};
use crate::QUOTE_SET_SIZE;

/// Offset from a zero-based data index to the displayed row number.
const HEADER_ROWS: usize = 2;

// =============================================================================
// Summary
// =============================================================================

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Spreadsheet-style row number (data index + 2).
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn at_index(index: usize, message: impl Into<String>) -> Self {
        RowError {
            row: index + HEADER_ROWS,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows that created a new item.
    pub imported: usize,
    /// Rows that matched an existing item by natural key.
    pub updated: usize,
    pub errors: Vec<RowError>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} imported, {} updated", self.imported, self.updated)?;
        if !self.errors.is_empty() {
            write!(f, ", {} failed", self.errors.len())?;
        }
        Ok(())
    }
}

// =============================================================================
// JSON Codec
// =============================================================================

/// Splits a JSON array into per-row results.
///
/// Fails only when the document is not a JSON array. A row that does not
/// match `T` becomes an `Err` holding the message, so the remaining rows can
/// still be imported.
pub fn parse_rows<T: DeserializeOwned>(json: &str) -> serde_json::Result<Vec<Result<T, String>>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(|e| e.to_string()))
        .collect())
}

/// Renders rows as a pretty-printed JSON array.
pub fn write_rows<T: Serialize>(rows: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

// =============================================================================
// Tire Rows
// =============================================================================

/// One tire as read from an import file. Missing numbers read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireImportRow {
    pub brand: String,
    pub model: String,
    pub size: String,
    pub quantity: Option<i64>,
    pub cost_sc: Option<Decimal>,
    pub cost_dunlop: Option<Decimal>,
    pub cost_online: Option<Decimal>,
    pub wholesale_price1: Option<Decimal>,
    pub wholesale_price2: Option<Decimal>,
    pub price_per_item: Option<Decimal>,
    pub promotion_id: Option<i64>,
    pub year_of_manufacture: Option<i32>,
}

impl TireImportRow {
    /// Normalises and validates the row.
    ///
    /// Text is trimmed, a missing quantity is 0, and a missing price is ฿0.00.
    pub fn into_new_tire(self) -> ValidationResult<NewTire> {
        let tire = NewTire {
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            size: self.size.trim().to_string(),
            quantity: self.quantity.unwrap_or(0),
            cost_sc: self.cost_sc.map(Money::from_decimal),
            cost_dunlop: self.cost_dunlop.map(Money::from_decimal),
            cost_online: self.cost_online.map(Money::from_decimal),
            wholesale_price1: self.wholesale_price1.map(Money::from_decimal),
            wholesale_price2: self.wholesale_price2.map(Money::from_decimal),
            price_per_item: self
                .price_per_item
                .map(Money::from_decimal)
                .unwrap_or_default(),
            promotion_id: self.promotion_id,
            year_of_manufacture: self.year_of_manufacture,
        };
        validate_tire(&tire)?;
        Ok(tire)
    }
}

/// One tire as written to an export file, with its promotion and quote.
///
/// The per-item quote is rounded to whole satang and the set-of-four
/// column is four times that rounded price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireExportRow {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub quantity: i64,
    pub cost_sc: Option<Money>,
    pub cost_dunlop: Option<Money>,
    pub cost_online: Option<Money>,
    pub wholesale_price1: Option<Money>,
    pub wholesale_price2: Option<Money>,
    pub price_per_item: Money,
    pub promotion_id: Option<i64>,
    pub promotion_name: Option<String>,
    pub promotion_type: Option<String>,
    pub promotion_value1: Option<Decimal>,
    pub promotion_value2: Option<Decimal>,
    pub promotion_description: Option<String>,
    pub promo_price_per_item: Option<Money>,
    pub promo_price_for_four: Option<Money>,
    pub year_of_manufacture: Option<i32>,
}

impl From<&TireListing> for TireExportRow {
    fn from(listing: &TireListing) -> Self {
        let tire = &listing.tire;
        let promotion = listing.promotion.as_ref();
        let promo_price_per_item = listing.quote.price_per_item().map(|m| m.round_to_cents());
        TireExportRow {
            id: tire.id,
            brand: tire.brand.clone(),
            model: tire.model.clone(),
            size: tire.size.clone(),
            quantity: tire.quantity,
            cost_sc: tire.cost_sc,
            cost_dunlop: tire.cost_dunlop,
            cost_online: tire.cost_online,
            wholesale_price1: tire.wholesale_price1,
            wholesale_price2: tire.wholesale_price2,
            price_per_item: tire.price_per_item,
            promotion_id: tire.promotion_id,
            promotion_name: promotion.map(|p| p.name.clone()),
            promotion_type: promotion.map(|p| p.promo_type.clone()),
            promotion_value1: promotion.and_then(|p| p.value1),
            promotion_value2: promotion.and_then(|p| p.value2),
            promotion_description: listing.quote.description().map(str::to_string),
            promo_price_per_item,
            promo_price_for_four: promo_price_per_item
                .and_then(|m| m.checked_multiply_quantity(QUOTE_SET_SIZE)),
            year_of_manufacture: tire.year_of_manufacture,
        }
    }
}

// =============================================================================
// Wheel Rows
// =============================================================================

/// One wheel as read from an import file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelImportRow {
    pub brand: String,
    pub model: String,
    pub diameter: Option<f64>,
    pub pcd: String,
    pub width: Option<f64>,
    pub et: Option<i64>,
    pub color: Option<String>,
    pub quantity: Option<i64>,
    pub cost: Option<Decimal>,
    pub cost_online: Option<Decimal>,
    pub wholesale_price1: Option<Decimal>,
    pub wholesale_price2: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    pub image_filename: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WheelImportRow {
    /// Normalises and validates the row.
    pub fn into_new_wheel(self) -> ValidationResult<NewWheel> {
        let wheel = NewWheel {
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            diameter: self.diameter.ok_or_else(|| ValidationError::Required {
                field: "diameter".to_string(),
            })?,
            pcd: self.pcd.trim().to_string(),
            width: self.width.ok_or_else(|| ValidationError::Required {
                field: "width".to_string(),
            })?,
            et: self.et,
            color: trimmed(self.color),
            quantity: self.quantity.unwrap_or(0),
            cost: self.cost.map(Money::from_decimal),
            cost_online: self.cost_online.map(Money::from_decimal),
            wholesale_price1: self.wholesale_price1.map(Money::from_decimal),
            wholesale_price2: self.wholesale_price2.map(Money::from_decimal),
            retail_price: self
                .retail_price
                .map(Money::from_decimal)
                .unwrap_or_default(),
            image_filename: trimmed(self.image_filename),
        };
        validate_wheel(&wheel)?;
        Ok(wheel)
    }
}

/// One wheel as written to an export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelExportRow {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub diameter: f64,
    pub pcd: String,
    pub width: f64,
    pub et: Option<i64>,
    pub color: Option<String>,
    pub quantity: i64,
    pub cost: Option<Money>,
    pub cost_online: Option<Money>,
    pub wholesale_price1: Option<Money>,
    pub wholesale_price2: Option<Money>,
    pub retail_price: Money,
    pub image_filename: Option<String>,
}

impl From<&Wheel> for WheelExportRow {
    fn from(wheel: &Wheel) -> Self {
        WheelExportRow {
            id: wheel.id,
            brand: wheel.brand.clone(),
            model: wheel.model.clone(),
            diameter: wheel.diameter,
            pcd: wheel.pcd.clone(),
            width: wheel.width,
            et: wheel.et,
            color: wheel.color.clone(),
            quantity: wheel.quantity,
            cost: wheel.cost,
            cost_online: wheel.cost_online,
            wholesale_price1: wheel.wholesale_price1,
            wholesale_price2: wheel.wholesale_price2,
            retail_price: wheel.retail_price,
            image_filename: wheel.image_filename.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

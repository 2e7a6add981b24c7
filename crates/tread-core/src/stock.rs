//! # Stock Arithmetic
//!
//! Pure quantity rules behind every ledger entry. The database layer reads
//! the current level, calls into here, and writes the result together with
//! the movement record.
//!
//! ```text
//!   current = 5
//!      │
//!      ├── IN 3  ──► 8
//!      ├── OUT 2 ──► 3
//!      └── OUT 9 ──► InsufficientStock { available: 5, requested: 9 }
//! ```

use std::cmp::Ordering;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{MovementType, StockItemKind};
use crate::validation::validate_movement_quantity;

/// Applies a movement to a stock level and returns the new level.
///
/// ## Rules
/// - `quantity` must be positive
/// - `OUT` may not take stock below zero
///
/// ## Example
/// ```rust
/// use tread_core::stock::apply_movement;
/// use tread_core::types::{MovementType, StockItemKind};
///
/// let after = apply_movement(StockItemKind::Tire, 1, 5, MovementType::Out, 2).unwrap();
/// assert_eq!(after, 3);
/// assert!(apply_movement(StockItemKind::Tire, 1, 5, MovementType::Out, 6).is_err());
/// ```
pub fn apply_movement(
    kind: StockItemKind,
    item_id: i64,
    current: i64,
    movement_type: MovementType,
    quantity: i64,
) -> CoreResult<i64> {
    validate_movement_quantity(quantity)?;

    match movement_type {
        MovementType::In => current.checked_add(quantity).ok_or_else(|| {
            CoreError::Validation(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: "1".to_string(),
                max: (i64::MAX - current).to_string(),
            })
        }),
        MovementType::Out => {
            if current < quantity {
                return Err(CoreError::InsufficientStock {
                    kind,
                    id: item_id,
                    available: current,
                    requested: quantity,
                });
            }
            Ok(current - quantity)
        }
    }
}

/// The movement implied by overwriting a stock level during import.
///
/// Returns `None` when the level is unchanged, otherwise the direction and
/// the (positive) size of the change.
pub fn reconcile(old: i64, new: i64) -> Option<(MovementType, i64)> {
    match new.cmp(&old) {
        Ordering::Equal => None,
        Ordering::Greater => Some((MovementType::In, new - old)),
        Ordering::Less => Some((MovementType::Out, old - new)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

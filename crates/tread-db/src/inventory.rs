//! # Inventory Service
//!
//! Operations that change stock levels. Every change to a `quantity`
//! column goes through here, in one transaction with its ledger row.
//!
//! ## Stock Movement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_movement(Tire, 12, OUT, 2, "Sale")                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    SELECT quantity FROM tires WHERE id = 12        → 5                  │
//! │    apply_movement(5, OUT, 2)                       → 3  (or error)      │
//! │    UPDATE tires SET quantity = 3 WHERE id = 12                          │
//! │    INSERT INTO tire_movements (.., 'OUT', 2, 3, 'Sale')                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    for each row:                                                        │
//! │      SAVEPOINT                                                          │
//! │        natural key found?  → update, quantity overwritten,              │
//! │                              ledger row for the difference              │
//! │        not found?          → insert, ledger row for initial stock       │
//! │      RELEASE   (or ROLLBACK TO + RowError on failure)                   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Acquire, SqliteConnection};
use tracing::{debug, info};

use tread_core::import::{
    parse_rows, write_rows, ImportSummary, RowError, TireExportRow, TireImportRow, WheelExportRow,
    WheelImportRow,
};
use tread_core::stock::{apply_movement, reconcile};
use tread_core::{
    CoreError, InventoryFilter, MovementType, NewTire, NewWheel, StockItemKind, StockMovement,
    TireListing, Wheel,
};

use crate::error::{DbError, DbResult, ServiceResult};
use crate::pool::Database;
use crate::repository::{movement, tire, wheel};

/// Ledger note for stock entered with a new item.
pub const NOTE_INITIAL_STOCK: &str = "Initial stock";
pub const NOTE_IMPORT_INITIAL: &str = "Import (initial stock)";
pub const NOTE_IMPORT_UPDATE: &str = "Import (quantity update)";

/// What an import row did.
enum Upsert {
    Created,
    Updated,
}

// =============================================================================
// Kind dispatch
// =============================================================================

async fn fetch_quantity(conn: &mut SqliteConnection, kind: StockItemKind, id: i64) -> DbResult<Option<i64>> {
    match kind {
        StockItemKind::Tire => tire::fetch_quantity(conn, id).await,
        StockItemKind::Wheel => wheel::fetch_quantity(conn, id).await,
    }
}

async fn set_quantity(conn: &mut SqliteConnection, kind: StockItemKind, id: i64, quantity: i64) -> DbResult<()> {
    match kind {
        StockItemKind::Tire => tire::set_quantity(conn, id, quantity).await,
        StockItemKind::Wheel => wheel::set_quantity(conn, id, quantity).await,
    }
}

/// Records the opening balance of a freshly inserted item.
async fn record_initial_stock(
    conn: &mut SqliteConnection,
    kind: StockItemKind,
    id: i64,
    quantity: i64,
    note: &str,
) -> DbResult<()> {
    // Ledger rows need a positive change; an empty shelf has no opening entry.
    if quantity > 0 {
        movement::insert_movement(conn, kind, id, MovementType::In, quantity, quantity, Some(note)).await?;
    }
    Ok(())
}

/// Records the difference when an import overwrites a stock level.
async fn record_reconciliation(
    conn: &mut SqliteConnection,
    kind: StockItemKind,
    id: i64,
    old: i64,
    new: i64,
) -> DbResult<()> {
    if let Some((movement_type, change)) = reconcile(old, new) {
        movement::insert_movement(conn, kind, id, movement_type, change, new, Some(NOTE_IMPORT_UPDATE)).await?;
    }
    Ok(())
}

async fn upsert_tire(conn: &mut SqliteConnection, new: &NewTire) -> DbResult<Upsert> {
    match tire::find_id_by_natural_key(conn, &new.brand, &new.model, &new.size).await? {
        Some((id, old_quantity)) => {
            tire::update_tire(conn, id, new, true).await?;
            record_reconciliation(conn, StockItemKind::Tire, id, old_quantity, new.quantity).await?;
            Ok(Upsert::Updated)
        }
        None => {
            let id = tire::insert_tire(conn, new).await?;
            record_initial_stock(conn, StockItemKind::Tire, id, new.quantity, NOTE_IMPORT_INITIAL).await?;
            Ok(Upsert::Created)
        }
    }
}

async fn upsert_wheel(conn: &mut SqliteConnection, new: &NewWheel) -> DbResult<Upsert> {
    match wheel::find_id_by_natural_key(conn, new).await? {
        Some((id, old_quantity)) => {
            wheel::update_wheel(conn, id, new, true).await?;
            record_reconciliation(conn, StockItemKind::Wheel, id, old_quantity, new.quantity).await?;
            Ok(Upsert::Updated)
        }
        None => {
            let id = wheel::insert_wheel(conn, new).await?;
            record_initial_stock(conn, StockItemKind::Wheel, id, new.quantity, NOTE_IMPORT_INITIAL).await?;
            Ok(Upsert::Created)
        }
    }
}

fn tally(summary: &mut ImportSummary, outcome: Upsert) {
    match outcome {
        Upsert::Created => summary.imported += 1,
        Upsert::Updated => summary.updated += 1,
    }
}

fn clean_notes(notes: Option<&str>) -> Option<&str> {
    notes.map(str::trim).filter(|n| !n.is_empty())
}

// =============================================================================
// Service
// =============================================================================

/// Stock-changing operations over a [`Database`].
///
/// ## Usage
/// ```rust,ignore
/// let inventory = db.inventory();
///
/// let listing = inventory.add_tire(&new_tire).await?;
/// inventory
///     .record_movement(StockItemKind::Tire, listing.tire.id, MovementType::Out, 2, Some("Sale"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Creates a tire and records its starting stock in the ledger.
    pub async fn add_tire(&self, new: &NewTire) -> ServiceResult<TireListing> {
        let mut tx = self.db.pool().begin().await?;

        let id = tire::insert_tire(&mut tx, new).await?;
        record_initial_stock(&mut tx, StockItemKind::Tire, id, new.quantity, NOTE_INITIAL_STOCK).await?;
        let listing = tire::fetch_listing(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Tire", id))?;

        tx.commit().await?;

        info!(tire_id = id, label = %listing.tire.label(), quantity = new.quantity, "Tire added");
        Ok(listing)
    }

    /// Creates a wheel and records its starting stock in the ledger.
    pub async fn add_wheel(&self, new: &NewWheel) -> ServiceResult<Wheel> {
        let mut tx = self.db.pool().begin().await?;

        let id = wheel::insert_wheel(&mut tx, new).await?;
        record_initial_stock(&mut tx, StockItemKind::Wheel, id, new.quantity, NOTE_INITIAL_STOCK).await?;
        let created = wheel::fetch_wheel(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Wheel", id))?;

        tx.commit().await?;

        info!(wheel_id = id, label = %created.label(), quantity = new.quantity, "Wheel added");
        Ok(created)
    }

    /// Moves stock in or out and appends the ledger row.
    ///
    /// ## Errors
    /// * `CoreError::TireNotFound` / `WheelNotFound` - no such item
    /// * `CoreError::Validation` - quantity not positive
    /// * `CoreError::InsufficientStock` - OUT larger than stock on hand
    ///
    /// On error nothing is written.
    pub async fn record_movement(
        &self,
        kind: StockItemKind,
        item_id: i64,
        movement_type: MovementType,
        quantity: i64,
        notes: Option<&str>,
    ) -> ServiceResult<StockMovement> {
        let mut tx = self.db.pool().begin().await?;

        let current = fetch_quantity(&mut tx, kind, item_id)
            .await?
            .ok_or_else(|| CoreError::item_not_found(kind, item_id))?;
        let remaining = apply_movement(kind, item_id, current, movement_type, quantity)?;

        set_quantity(&mut tx, kind, item_id, remaining).await?;
        let recorded = movement::insert_movement(
            &mut tx,
            kind,
            item_id,
            movement_type,
            quantity,
            remaining,
            clean_notes(notes),
        )
        .await?;

        tx.commit().await?;

        info!(
            %kind,
            item_id,
            %movement_type,
            quantity,
            remaining,
            "Stock updated"
        );
        Ok(recorded)
    }

    /// Deletes a tire. Refused while any units are in stock.
    pub async fn delete_tire(&self, id: i64) -> ServiceResult<()> {
        self.delete_item(StockItemKind::Tire, id).await
    }

    /// Deletes a wheel and its fitments. Refused while any units are in stock.
    pub async fn delete_wheel(&self, id: i64) -> ServiceResult<()> {
        self.delete_item(StockItemKind::Wheel, id).await
    }

    async fn delete_item(&self, kind: StockItemKind, id: i64) -> ServiceResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let quantity = fetch_quantity(&mut tx, kind, id)
            .await?
            .ok_or_else(|| CoreError::item_not_found(kind, id))?;
        if quantity > 0 {
            return Err(CoreError::StockRemaining { kind, id, quantity }.into());
        }

        match kind {
            StockItemKind::Tire => tire::delete_tire(&mut tx, id).await?,
            StockItemKind::Wheel => wheel::delete_wheel(&mut tx, id).await?,
        }
        tx.commit().await?;

        info!(%kind, id, "Item deleted");
        Ok(())
    }

    // =========================================================================
    // Bulk import / export
    // =========================================================================

    /// Imports tires from a JSON array, upserting by brand/model/size.
    ///
    /// Bad rows are reported in the summary and skipped; the rest of the
    /// file is still imported. Only a document that is not a JSON array
    /// fails the whole call.
    pub async fn import_tires(&self, json: &str) -> ServiceResult<ImportSummary> {
        let rows = parse_rows::<TireImportRow>(json)?;
        let mut summary = ImportSummary::default();
        let mut tx = self.db.pool().begin().await?;

        for (index, parsed) in rows.into_iter().enumerate() {
            let new = match parsed.and_then(|row| row.into_new_tire().map_err(|e| e.to_string())) {
                Ok(new) => new,
                Err(message) => {
                    summary.errors.push(RowError::at_index(index, message));
                    continue;
                }
            };

            let mut savepoint = tx.begin().await?;
            match upsert_tire(&mut savepoint, &new).await {
                Ok(outcome) => {
                    savepoint.commit().await?;
                    tally(&mut summary, outcome);
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    debug!(row = index, error = %err, "Tire row rejected");
                    summary.errors.push(RowError::at_index(index, err.to_string()));
                }
            }
        }

        tx.commit().await?;

        info!(
            imported = summary.imported,
            updated = summary.updated,
            errors = summary.errors.len(),
            "Tire import finished"
        );
        Ok(summary)
    }

    /// Imports wheels from a JSON array, upserting by the full wheel key.
    pub async fn import_wheels(&self, json: &str) -> ServiceResult<ImportSummary> {
        let rows = parse_rows::<WheelImportRow>(json)?;
        let mut summary = ImportSummary::default();
        let mut tx = self.db.pool().begin().await?;

        for (index, parsed) in rows.into_iter().enumerate() {
            let new = match parsed.and_then(|row| row.into_new_wheel().map_err(|e| e.to_string())) {
                Ok(new) => new,
                Err(message) => {
                    summary.errors.push(RowError::at_index(index, message));
                    continue;
                }
            };

            let mut savepoint = tx.begin().await?;
            match upsert_wheel(&mut savepoint, &new).await {
                Ok(outcome) => {
                    savepoint.commit().await?;
                    tally(&mut summary, outcome);
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    debug!(row = index, error = %err, "Wheel row rejected");
                    summary.errors.push(RowError::at_index(index, err.to_string()));
                }
            }
        }

        tx.commit().await?;

        info!(
            imported = summary.imported,
            updated = summary.updated,
            errors = summary.errors.len(),
            "Wheel import finished"
        );
        Ok(summary)
    }

    /// Tires matching `filter` as a JSON document, with promotion and quote columns.
    pub async fn export_tires(&self, filter: &InventoryFilter) -> ServiceResult<String> {
        let listings = self.db.tires().list(filter).await?;
        let rows: Vec<TireExportRow> = listings.iter().map(TireExportRow::from).collect();

        debug!(count = rows.len(), "Exporting tires");
        Ok(write_rows(&rows)?)
    }

    /// Wheels matching `filter` as a JSON document.
    pub async fn export_wheels(&self, filter: &InventoryFilter) -> ServiceResult<String> {
        let wheels = self.db.wheels().list(filter).await?;
        let rows: Vec<WheelExportRow> = wheels.iter().map(WheelExportRow::from).collect();

        debug!(count = rows.len(), "Exporting wheels");
        Ok(write_rows(&rows)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

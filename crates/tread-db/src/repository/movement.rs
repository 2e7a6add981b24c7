//! # Movement Repository
//!
//! Append-only stock ledgers, one table per item kind.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tire_movements / wheel_movements                                       │
//! │                                                                         │
//! │  id │ item │ timestamp            │ type │ change │ remaining │ notes    │
//! │  ───┼──────┼──────────────────────┼──────┼────────┼───────────┼───────   │
//! │  1  │  7   │ 2024-03-01T09:12:00Z │ IN   │   8    │    8      │ Initial  │
//! │  2  │  7   │ 2024-03-02T14:40:00Z │ OUT  │   4    │    4      │ Sale     │
//! │                                                                         │
//! │  `remaining` of the newest row always equals the item's quantity.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are only ever written by [`crate::InventoryService`], inside the
//! same transaction that changes the stock level. This repository reads.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use tread_core::{MovementHistoryEntry, MovementType, StockItemKind, StockMovement};

use crate::error::DbResult;

/// Default number of entries shown by the history view.
///
/// Ledgers are append-only, so id order is recording order.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Ledger table and its item key column.
const fn ledger(kind: StockItemKind) -> (&'static str, &'static str) {
    match kind {
        StockItemKind::Tire => ("tire_movements", "tire_id"),
        StockItemKind::Wheel => ("wheel_movements", "wheel_id"),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: i64,
    item_id: i64,
    timestamp: DateTime<Utc>,
    movement_type: MovementType,
    quantity_change: i64,
    remaining_quantity: i64,
    notes: Option<String>,
}

impl MovementRow {
    fn into_movement(self, kind: StockItemKind) -> StockMovement {
        StockMovement {
            id: self.id,
            kind,
            item_id: self.item_id,
            timestamp: self.timestamp,
            movement_type: self.movement_type,
            quantity_change: self.quantity_change,
            remaining_quantity: self.remaining_quantity,
            notes: self.notes,
        }
    }
}

/// Ledger row joined with the columns that label its item.
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    #[sqlx(flatten)]
    movement: MovementRow,
    brand: String,
    model: String,
    size: Option<String>,
    diameter: Option<f64>,
    pcd: Option<String>,
}

impl HistoryRow {
    fn into_entry(self, kind: StockItemKind) -> MovementHistoryEntry {
        let detail = match kind {
            StockItemKind::Tire => self.size.unwrap_or_default(),
            StockItemKind::Wheel => format!(
                "{}\" {}",
                self.diameter.unwrap_or_default(),
                self.pcd.unwrap_or_default()
            ),
        };

        MovementHistoryEntry {
            item_label: format!("{} {} {}", self.brand, self.model, detail),
            movement: self.movement.into_movement(kind),
        }
    }
}

fn history_sql(kind: StockItemKind, where_clause: &str) -> String {
    let (table, key) = ledger(kind);
    let (items, label_columns) = match kind {
        StockItemKind::Tire => ("tires", "i.size AS size, NULL AS diameter, NULL AS pcd"),
        StockItemKind::Wheel => ("wheels", "NULL AS size, i.diameter AS diameter, i.pcd AS pcd"),
    };

    format!(
        r#"
        SELECT
            m.id, m.{key} AS item_id, m.timestamp, m.type AS movement_type,
            m.quantity_change, m.remaining_quantity, m.notes,
            i.brand, i.model, {label_columns}
        FROM {table} m
        JOIN {items} i ON i.id = m.{key}
        {where_clause}
        ORDER BY m.id DESC
        LIMIT ?1
        "#
    )
}

/// Appends a ledger row. Callers own the surrounding transaction.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    kind: StockItemKind,
    item_id: i64,
    movement_type: MovementType,
    quantity_change: i64,
    remaining_quantity: i64,
    notes: Option<&str>,
) -> DbResult<StockMovement> {
    let (table, key) = ledger(kind);
    let sql = format!(
        r#"
        INSERT INTO {table} ({key}, timestamp, type, quantity_change, remaining_quantity, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, {key} AS item_id, timestamp, type AS movement_type,
                  quantity_change, remaining_quantity, notes
        "#
    );

    let row = sqlx::query_as::<_, MovementRow>(&sql)
        .bind(item_id)
        .bind(Utc::now())
        .bind(movement_type)
        .bind(quantity_change)
        .bind(remaining_quantity)
        .bind(notes)
        .fetch_one(&mut *conn)
        .await?;

    debug!(
        %kind,
        item_id,
        %movement_type,
        quantity_change,
        remaining_quantity,
        "Stock movement recorded"
    );
    Ok(row.into_movement(kind))
}

/// Read access to one kind's stock ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
    kind: StockItemKind,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool, kind: StockItemKind) -> Self {
        MovementRepository { pool, kind }
    }

    pub fn kind(&self) -> StockItemKind {
        self.kind
    }

    /// The most recent movements across all items, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<MovementHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&history_sql(self.kind, ""))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(kind = %self.kind, count = rows.len(), "Loaded movement history");
        Ok(rows.into_iter().map(|r| r.into_entry(self.kind)).collect())
    }

    /// The most recent movements for one item, newest first.
    pub async fn for_item(&self, item_id: i64, limit: i64) -> DbResult<Vec<MovementHistoryEntry>> {
        let (_, key) = ledger(self.kind);
        let sql = history_sql(self.kind, &format!("WHERE m.{key} = ?2"));

        let rows = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(limit)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_entry(self.kind)).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

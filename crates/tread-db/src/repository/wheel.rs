//! # Wheel Repository
//!
//! Database operations for wheels.
//!
//! Wheels carry no promotion; their retail price is shown as is.
//! The natural key spans every dimension (brand, model, diameter, pcd,
//! width, et, color), and `et`/`color` may be NULL, so lookups compare
//! with `IS` rather than `=`.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use tread_core::validation::validate_wheel;
use tread_core::{InventoryFilter, Money, NewWheel, Wheel};

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, money_from_cents, optional_cents, to_cents};

const SELECT_WHEEL: &str = r#"
    SELECT
        id, brand, model, diameter, pcd, width, et, color, quantity,
        cost_cents, cost_online_cents, wholesale_price1_cents, wholesale_price2_cents,
        retail_price_cents, image_filename
    FROM wheels
"#;

#[derive(Debug, sqlx::FromRow)]
struct WheelRow {
    id: i64,
    brand: String,
    model: String,
    diameter: f64,
    pcd: String,
    width: f64,
    et: Option<i64>,
    color: Option<String>,
    quantity: i64,
    cost_cents: Option<i64>,
    cost_online_cents: Option<i64>,
    wholesale_price1_cents: Option<i64>,
    wholesale_price2_cents: Option<i64>,
    retail_price_cents: i64,
    image_filename: Option<String>,
}

impl From<WheelRow> for Wheel {
    fn from(row: WheelRow) -> Self {
        Wheel {
            id: row.id,
            brand: row.brand,
            model: row.model,
            diameter: row.diameter,
            pcd: row.pcd,
            width: row.width,
            et: row.et,
            color: row.color,
            quantity: row.quantity,
            cost: money_from_cents(row.cost_cents),
            cost_online: money_from_cents(row.cost_online_cents),
            wholesale_price1: money_from_cents(row.wholesale_price1_cents),
            wholesale_price2: money_from_cents(row.wholesale_price2_cents),
            retail_price: Money::from_cents(row.retail_price_cents),
            image_filename: row.image_filename,
        }
    }
}

struct WheelPrices {
    cost: Option<i64>,
    cost_online: Option<i64>,
    wholesale_price1: Option<i64>,
    wholesale_price2: Option<i64>,
    retail_price: i64,
}

impl WheelPrices {
    fn from_new(wheel: &NewWheel) -> DbResult<Self> {
        Ok(WheelPrices {
            cost: optional_cents("cost", wheel.cost)?,
            cost_online: optional_cents("cost_online", wheel.cost_online)?,
            wholesale_price1: optional_cents("wholesale_price1", wheel.wholesale_price1)?,
            wholesale_price2: optional_cents("wholesale_price2", wheel.wholesale_price2)?,
            retail_price: to_cents("retail_price", wheel.retail_price)?,
        })
    }
}

fn duplicate_wheel(err: sqlx::Error, wheel: &NewWheel) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate(
            "wheel",
            format!(
                "{} {} {}x{} {}",
                wheel.brand.trim(),
                wheel.model.trim(),
                wheel.diameter,
                wheel.width,
                wheel.pcd.trim()
            ),
        ),
        other => other,
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Connection-level operations (shared with InventoryService transactions)
// =============================================================================

pub(crate) async fn fetch_wheel(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Wheel>> {
    let row = sqlx::query_as::<_, WheelRow>(&format!("{SELECT_WHEEL} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Wheel::from))
}

pub(crate) async fn fetch_quantity(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<i64>> {
    let quantity = sqlx::query_scalar::<_, i64>("SELECT quantity FROM wheels WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(quantity)
}

/// Looks up `(id, quantity)` by the full natural key.
pub(crate) async fn find_id_by_natural_key(
    conn: &mut SqliteConnection,
    wheel: &NewWheel,
) -> DbResult<Option<(i64, i64)>> {
    let found = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT id, quantity FROM wheels
        WHERE brand = ?1 AND model = ?2 AND diameter = ?3 AND pcd = ?4
          AND width = ?5 AND et IS ?6 AND color IS ?7
        "#,
    )
    .bind(wheel.brand.trim())
    .bind(wheel.model.trim())
    .bind(wheel.diameter)
    .bind(wheel.pcd.trim())
    .bind(wheel.width)
    .bind(wheel.et)
    .bind(trimmed(&wheel.color))
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found)
}

pub(crate) async fn insert_wheel(conn: &mut SqliteConnection, wheel: &NewWheel) -> DbResult<i64> {
    validate_wheel(wheel)?;
    let prices = WheelPrices::from_new(wheel)?;

    let result = sqlx::query(
        r#"
        INSERT INTO wheels (
            brand, model, diameter, pcd, width, et, color, quantity,
            cost_cents, cost_online_cents, wholesale_price1_cents, wholesale_price2_cents,
            retail_price_cents, image_filename
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(wheel.brand.trim())
    .bind(wheel.model.trim())
    .bind(wheel.diameter)
    .bind(wheel.pcd.trim())
    .bind(wheel.width)
    .bind(wheel.et)
    .bind(trimmed(&wheel.color))
    .bind(wheel.quantity)
    .bind(prices.cost)
    .bind(prices.cost_online)
    .bind(prices.wholesale_price1)
    .bind(prices.wholesale_price2)
    .bind(prices.retail_price)
    .bind(trimmed(&wheel.image_filename))
    .execute(&mut *conn)
    .await
    .map_err(|e| duplicate_wheel(e, wheel))?;

    Ok(result.last_insert_rowid())
}

/// Overwrites a wheel's details; the stock level only with `set_quantity`.
pub(crate) async fn update_wheel(
    conn: &mut SqliteConnection,
    id: i64,
    wheel: &NewWheel,
    set_quantity: bool,
) -> DbResult<()> {
    validate_wheel(wheel)?;
    let prices = WheelPrices::from_new(wheel)?;

    let result = sqlx::query(
        r#"
        UPDATE wheels SET
            brand = ?1, model = ?2, diameter = ?3, pcd = ?4, width = ?5, et = ?6, color = ?7,
            quantity = CASE WHEN ?8 THEN ?9 ELSE quantity END,
            cost_cents = ?10, cost_online_cents = ?11,
            wholesale_price1_cents = ?12, wholesale_price2_cents = ?13,
            retail_price_cents = ?14, image_filename = ?15
        WHERE id = ?16
        "#,
    )
    .bind(wheel.brand.trim())
    .bind(wheel.model.trim())
    .bind(wheel.diameter)
    .bind(wheel.pcd.trim())
    .bind(wheel.width)
    .bind(wheel.et)
    .bind(trimmed(&wheel.color))
    .bind(set_quantity)
    .bind(wheel.quantity)
    .bind(prices.cost)
    .bind(prices.cost_online)
    .bind(prices.wholesale_price1)
    .bind(prices.wholesale_price2)
    .bind(prices.retail_price)
    .bind(trimmed(&wheel.image_filename))
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| duplicate_wheel(e, wheel))?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Wheel", id));
    }
    Ok(())
}

pub(crate) async fn set_quantity(conn: &mut SqliteConnection, id: i64, quantity: i64) -> DbResult<()> {
    sqlx::query("UPDATE wheels SET quantity = ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(crate) async fn delete_wheel(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM wheels WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for wheel database operations.
#[derive(Debug, Clone)]
pub struct WheelRepository {
    pool: SqlitePool,
}

impl WheelRepository {
    /// Creates a new WheelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WheelRepository { pool }
    }

    /// Gets a wheel by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Wheel>> {
        let mut conn = self.pool.acquire().await?;
        fetch_wheel(&mut conn, id).await
    }

    /// Lists wheels.
    ///
    /// ## Filtering
    /// - `query`: substring match on brand, model, pcd or color
    /// - `brand`: exact brand (`"all"` or blank lists every brand)
    ///
    /// Ordered by brand, model, diameter.
    pub async fn list(&self, filter: &InventoryFilter) -> DbResult<Vec<Wheel>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_WHEEL);
        qb.push(" WHERE 1 = 1");

        if let Some(query) = filter.query_text() {
            let pattern = like_pattern(query);
            qb.push(" AND (brand LIKE ")
                .push_bind(pattern.clone())
                .push(" OR model LIKE ")
                .push_bind(pattern.clone())
                .push(" OR pcd LIKE ")
                .push_bind(pattern.clone())
                .push(" OR color LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(brand) = filter.brand_filter() {
            qb.push(" AND brand = ").push_bind(brand.to_string());
        }

        qb.push(" ORDER BY brand, model, diameter");

        let rows = qb.build_query_as::<WheelRow>().fetch_all(&self.pool).await?;

        debug!(
            count = rows.len(),
            query = ?filter.query_text(),
            brand = ?filter.brand_filter(),
            "Listed wheels"
        );
        Ok(rows.into_iter().map(Wheel::from).collect())
    }

    /// Distinct wheel brands, alphabetically.
    pub async fn brands(&self) -> DbResult<Vec<String>> {
        let brands = sqlx::query_scalar::<_, String>("SELECT DISTINCT brand FROM wheels ORDER BY brand")
            .fetch_all(&self.pool)
            .await?;
        Ok(brands)
    }

    /// Finds a wheel matching every natural-key column of `wheel`.
    pub async fn find_by_natural_key(&self, wheel: &NewWheel) -> DbResult<Option<Wheel>> {
        let mut conn = self.pool.acquire().await?;
        match find_id_by_natural_key(&mut conn, wheel).await? {
            Some((id, _)) => fetch_wheel(&mut conn, id).await,
            None => Ok(None),
        }
    }

    /// Creates a wheel with the given starting quantity and no ledger entry.
    pub async fn insert(&self, wheel: &NewWheel) -> DbResult<Wheel> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_wheel(&mut conn, wheel).await?;
        debug!(wheel_id = id, brand = %wheel.brand, "Wheel created");

        fetch_wheel(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Wheel", id))
    }

    /// Updates a wheel's details. Stock quantity is never touched here.
    pub async fn update(&self, id: i64, wheel: &NewWheel) -> DbResult<Wheel> {
        let mut conn = self.pool.acquire().await?;
        update_wheel(&mut conn, id, wheel, false).await?;
        debug!(wheel_id = id, "Wheel updated");

        fetch_wheel(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Wheel", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_wheel(brand: &str, model: &str, diameter: f64, color: Option<&str>) -> NewWheel {
        NewWheel {
            brand: brand.to_string(),
            model: model.to_string(),
            diameter,
            pcd: "5x114.3".to_string(),
            width: 8.0,
            et: Some(35),
            color: color.map(str::to_string),
            quantity: 4,
            cost: Some(Money::from_major(3000)),
            cost_online: None,
            wholesale_price1: None,
            wholesale_price2: None,
            retail_price: Money::from_major(5500),
            image_filename: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let wheel = db
            .wheels()
            .insert(&new_wheel("Enkei", "RPF1", 17.0, Some("Silver")))
            .await
            .unwrap();

        let fetched = db.wheels().get_by_id(wheel.id).await.unwrap().unwrap();
        assert_eq!(fetched.model, "RPF1");
        assert_eq!(fetched.diameter, 17.0);
        assert_eq!(fetched.color.as_deref(), Some("Silver"));
        assert_eq!(fetched.retail_price, Money::from_major(5500));
        assert_eq!(fetched.quantity, 4);
    }

    #[tokio::test]
    async fn test_list_ordering_and_search() {
        let db = setup().await;
        let repo = db.wheels();
        repo.insert(&new_wheel("Lenso", "Jager", 18.0, Some("Black"))).await.unwrap();
        repo.insert(&new_wheel("Enkei", "RPF1", 18.0, Some("Silver"))).await.unwrap();
        repo.insert(&new_wheel("Enkei", "RPF1", 17.0, Some("Silver"))).await.unwrap();

        let all = repo.list(&InventoryFilter::default()).await.unwrap();
        let order: Vec<_> = all.iter().map(|w| (w.brand.as_str(), w.diameter)).collect();
        assert_eq!(order, vec![("Enkei", 17.0), ("Enkei", 18.0), ("Lenso", 18.0)]);

        let black = repo.list(&InventoryFilter::search("black")).await.unwrap();
        assert_eq!(black.len(), 1);
        assert_eq!(black[0].brand, "Lenso");

        let enkei = repo
            .list(&InventoryFilter::search("114.3").with_brand("Enkei"))
            .await
            .unwrap();
        assert_eq!(enkei.len(), 2);

        assert_eq!(repo.brands().await.unwrap(), vec!["Enkei", "Lenso"]);
    }

    #[tokio::test]
    async fn test_natural_key_matches_null_color() {
        let db = setup().await;
        let repo = db.wheels();
        let plain = new_wheel("Cosmis", "XT-005R", 18.0, None);
        let inserted = repo.insert(&plain).await.unwrap();

        let found = repo.find_by_natural_key(&plain).await.unwrap().unwrap();
        assert_eq!(found.id, inserted.id);

        let painted = new_wheel("Cosmis", "XT-005R", 18.0, Some("Bronze"));
        assert!(repo.find_by_natural_key(&painted).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_leaves_quantity_alone() {
        let db = setup().await;
        let repo = db.wheels();
        let wheel = repo.insert(&new_wheel("Work", "Emotion", 18.0, None)).await.unwrap();

        let mut changed = new_wheel("Work", "Emotion", 18.0, Some("White"));
        changed.quantity = 40;
        let updated = repo.update(wheel.id, &changed).await.unwrap();

        assert_eq!(updated.color.as_deref(), Some("White"));
        assert_eq!(updated.quantity, 4);
    }
}

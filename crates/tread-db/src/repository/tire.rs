//! # Tire Repository
//!
//! Database operations for tires, including the priced listing every view
//! and export reads from.
//!
//! ## Listing = Row + Promotion + Quote
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tires t LEFT JOIN promotions p ON p.id = t.promotion_id                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TireListingRow ──► Tire + Option<Promotion>                            │
//! │                           │                                             │
//! │                           ▼                                             │
//! │               compute_quote(price_per_item, promotion)                  │
//! │                           │                                             │
//! │                           ▼                                             │
//! │  TireListing { tire, promotion, quote }                                 │
//! │                                                                         │
//! │  A misconfigured promotion still lists; the tire quotes at its base     │
//! │  price and the discarded reason is logged at debug level.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use tread_core::validation::validate_tire;
use tread_core::{evaluate_promotion, InventoryFilter, Money, NewTire, Promotion, Tire, TireListing};

use crate::error::{DbError, DbResult};
use crate::repository::{decimal_from_real, like_pattern, money_from_cents, optional_cents, to_cents};

const SELECT_LISTING: &str = r#"
    SELECT
        t.id, t.brand, t.model, t.size, t.quantity,
        t.cost_sc_cents, t.cost_dunlop_cents, t.cost_online_cents,
        t.wholesale_price1_cents, t.wholesale_price2_cents,
        t.price_per_item_cents, t.promotion_id, t.year_of_manufacture,
        p.name AS promo_name,
        p.type AS promo_type,
        p.value1 AS promo_value1,
        p.value2 AS promo_value2,
        p.is_active AS promo_is_active,
        p.created_at AS promo_created_at
    FROM tires t
    LEFT JOIN promotions p ON p.id = t.promotion_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct TireListingRow {
    id: i64,
    brand: String,
    model: String,
    size: String,
    quantity: i64,
    cost_sc_cents: Option<i64>,
    cost_dunlop_cents: Option<i64>,
    cost_online_cents: Option<i64>,
    wholesale_price1_cents: Option<i64>,
    wholesale_price2_cents: Option<i64>,
    price_per_item_cents: i64,
    promotion_id: Option<i64>,
    year_of_manufacture: Option<i32>,
    promo_name: Option<String>,
    promo_type: Option<String>,
    promo_value1: Option<f64>,
    promo_value2: Option<f64>,
    promo_is_active: Option<bool>,
    promo_created_at: Option<DateTime<Utc>>,
}

impl TireListingRow {
    fn into_listing(self) -> TireListing {
        let promotion = match (
            self.promotion_id,
            self.promo_name,
            self.promo_type,
            self.promo_is_active,
            self.promo_created_at,
        ) {
            (Some(id), Some(name), Some(promo_type), Some(is_active), Some(created_at)) => {
                Some(Promotion {
                    id,
                    name,
                    promo_type,
                    value1: decimal_from_real(self.promo_value1),
                    value2: decimal_from_real(self.promo_value2),
                    is_active,
                    created_at,
                })
            }
            _ => None,
        };

        let tire = Tire {
            id: self.id,
            brand: self.brand,
            model: self.model,
            size: self.size,
            quantity: self.quantity,
            cost_sc: money_from_cents(self.cost_sc_cents),
            cost_dunlop: money_from_cents(self.cost_dunlop_cents),
            cost_online: money_from_cents(self.cost_online_cents),
            wholesale_price1: money_from_cents(self.wholesale_price1_cents),
            wholesale_price2: money_from_cents(self.wholesale_price2_cents),
            price_per_item: Money::from_cents(self.price_per_item_cents),
            promotion_id: self.promotion_id,
            year_of_manufacture: self.year_of_manufacture,
        };

        if let Some(Err(reason)) = evaluate_promotion(tire.price_per_item, promotion.as_ref()) {
            debug!(
                tire_id = tire.id,
                promotion_id = ?tire.promotion_id,
                %reason,
                "Promotion ignored, quoting base price"
            );
        }

        TireListing::new(tire, promotion)
    }
}

/// Satang columns for a tire write.
struct TirePrices {
    cost_sc: Option<i64>,
    cost_dunlop: Option<i64>,
    cost_online: Option<i64>,
    wholesale_price1: Option<i64>,
    wholesale_price2: Option<i64>,
    price_per_item: i64,
}

impl TirePrices {
    fn from_new(tire: &NewTire) -> DbResult<Self> {
        Ok(TirePrices {
            cost_sc: optional_cents("cost_sc", tire.cost_sc)?,
            cost_dunlop: optional_cents("cost_dunlop", tire.cost_dunlop)?,
            cost_online: optional_cents("cost_online", tire.cost_online)?,
            wholesale_price1: optional_cents("wholesale_price1", tire.wholesale_price1)?,
            wholesale_price2: optional_cents("wholesale_price2", tire.wholesale_price2)?,
            price_per_item: to_cents("price_per_item", tire.price_per_item)?,
        })
    }
}

fn duplicate_tire(err: sqlx::Error, tire: &NewTire) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate(
            "tire",
            format!("{} {} {}", tire.brand.trim(), tire.model.trim(), tire.size.trim()),
        ),
        other => other,
    }
}

// =============================================================================
// Connection-level operations (shared with InventoryService transactions)
// =============================================================================

pub(crate) async fn fetch_listing(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<TireListing>> {
    let row = sqlx::query_as::<_, TireListingRow>(&format!("{SELECT_LISTING} WHERE t.id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(TireListingRow::into_listing))
}

pub(crate) async fn fetch_quantity(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<i64>> {
    let quantity = sqlx::query_scalar::<_, i64>("SELECT quantity FROM tires WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(quantity)
}

pub(crate) async fn find_id_by_natural_key(
    conn: &mut SqliteConnection,
    brand: &str,
    model: &str,
    size: &str,
) -> DbResult<Option<(i64, i64)>> {
    let found = sqlx::query_as::<_, (i64, i64)>(
        "SELECT id, quantity FROM tires WHERE brand = ?1 AND model = ?2 AND size = ?3",
    )
    .bind(brand)
    .bind(model)
    .bind(size)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found)
}

/// Inserts a validated tire, including its starting quantity.
pub(crate) async fn insert_tire(conn: &mut SqliteConnection, tire: &NewTire) -> DbResult<i64> {
    validate_tire(tire)?;
    let prices = TirePrices::from_new(tire)?;

    let result = sqlx::query(
        r#"
        INSERT INTO tires (
            brand, model, size, quantity,
            cost_sc_cents, cost_dunlop_cents, cost_online_cents,
            wholesale_price1_cents, wholesale_price2_cents,
            price_per_item_cents, promotion_id, year_of_manufacture
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(tire.brand.trim())
    .bind(tire.model.trim())
    .bind(tire.size.trim())
    .bind(tire.quantity)
    .bind(prices.cost_sc)
    .bind(prices.cost_dunlop)
    .bind(prices.cost_online)
    .bind(prices.wholesale_price1)
    .bind(prices.wholesale_price2)
    .bind(prices.price_per_item)
    .bind(tire.promotion_id)
    .bind(tire.year_of_manufacture)
    .execute(&mut *conn)
    .await
    .map_err(|e| duplicate_tire(e, tire))?;

    Ok(result.last_insert_rowid())
}

/// Overwrites a tire's descriptive fields and prices.
///
/// With `set_quantity`, the stock level is overwritten too (bulk import);
/// otherwise it is left alone.
pub(crate) async fn update_tire(
    conn: &mut SqliteConnection,
    id: i64,
    tire: &NewTire,
    set_quantity: bool,
) -> DbResult<()> {
    validate_tire(tire)?;
    let prices = TirePrices::from_new(tire)?;

    let result = sqlx::query(
        r#"
        UPDATE tires SET
            brand = ?1, model = ?2, size = ?3,
            quantity = CASE WHEN ?4 THEN ?5 ELSE quantity END,
            cost_sc_cents = ?6, cost_dunlop_cents = ?7, cost_online_cents = ?8,
            wholesale_price1_cents = ?9, wholesale_price2_cents = ?10,
            price_per_item_cents = ?11, promotion_id = ?12, year_of_manufacture = ?13
        WHERE id = ?14
        "#,
    )
    .bind(tire.brand.trim())
    .bind(tire.model.trim())
    .bind(tire.size.trim())
    .bind(set_quantity)
    .bind(tire.quantity)
    .bind(prices.cost_sc)
    .bind(prices.cost_dunlop)
    .bind(prices.cost_online)
    .bind(prices.wholesale_price1)
    .bind(prices.wholesale_price2)
    .bind(prices.price_per_item)
    .bind(tire.promotion_id)
    .bind(tire.year_of_manufacture)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| duplicate_tire(e, tire))?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Tire", id));
    }
    Ok(())
}

pub(crate) async fn set_quantity(conn: &mut SqliteConnection, id: i64, quantity: i64) -> DbResult<()> {
    sqlx::query("UPDATE tires SET quantity = ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(crate) async fn delete_tire(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM tires WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for tire database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.tires();
///
/// // Everything from Michelin matching "R16", priced
/// let filter = InventoryFilter::search("R16").with_brand("Michelin");
/// for listing in repo.list(&filter).await? {
///     println!("{} {:?}", listing.tire.label(), listing.quote.price_for_four());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TireRepository {
    pool: SqlitePool,
}

impl TireRepository {
    /// Creates a new TireRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TireRepository { pool }
    }

    /// Gets a tire with its promotion resolved and its quote computed.
    pub async fn get_listing(&self, id: i64) -> DbResult<Option<TireListing>> {
        let mut conn = self.pool.acquire().await?;
        fetch_listing(&mut conn, id).await
    }

    /// Gets a tire without pricing it.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Tire>> {
        Ok(self.get_listing(id).await?.map(|listing| listing.tire))
    }

    /// Lists priced tires.
    ///
    /// ## Filtering
    /// - `query`: substring match on brand, model or size
    /// - `brand`: exact brand (`"all"` or blank lists every brand)
    ///
    /// Ordered by brand, model, size.
    pub async fn list(&self, filter: &InventoryFilter) -> DbResult<Vec<TireListing>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_LISTING);
        qb.push(" WHERE 1 = 1");

        if let Some(query) = filter.query_text() {
            let pattern = like_pattern(query);
            qb.push(" AND (t.brand LIKE ")
                .push_bind(pattern.clone())
                .push(" OR t.model LIKE ")
                .push_bind(pattern.clone())
                .push(" OR t.size LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(brand) = filter.brand_filter() {
            qb.push(" AND t.brand = ").push_bind(brand.to_string());
        }

        qb.push(" ORDER BY t.brand, t.model, t.size");

        let rows = qb
            .build_query_as::<TireListingRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            count = rows.len(),
            query = ?filter.query_text(),
            brand = ?filter.brand_filter(),
            "Listed tires"
        );
        Ok(rows.into_iter().map(TireListingRow::into_listing).collect())
    }

    /// Distinct tire brands, alphabetically.
    pub async fn brands(&self) -> DbResult<Vec<String>> {
        let brands = sqlx::query_scalar::<_, String>("SELECT DISTINCT brand FROM tires ORDER BY brand")
            .fetch_all(&self.pool)
            .await?;
        Ok(brands)
    }

    /// Finds a tire by its natural key.
    pub async fn find_by_natural_key(&self, brand: &str, model: &str, size: &str) -> DbResult<Option<Tire>> {
        let mut conn = self.pool.acquire().await?;
        match find_id_by_natural_key(&mut conn, brand.trim(), model.trim(), size.trim()).await? {
            Some((id, _)) => Ok(fetch_listing(&mut conn, id).await?.map(|l| l.tire)),
            None => Ok(None),
        }
    }

    /// Creates a tire with the given starting quantity and no ledger entry.
    ///
    /// Use [`crate::InventoryService::add_tire`] to record the starting
    /// stock as a movement.
    pub async fn insert(&self, tire: &NewTire) -> DbResult<Tire> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_tire(&mut conn, tire).await?;
        debug!(tire_id = id, brand = %tire.brand, size = %tire.size, "Tire created");

        fetch_listing(&mut conn, id)
            .await?
            .map(|l| l.tire)
            .ok_or_else(|| DbError::not_found("Tire", id))
    }

    /// Updates a tire's details. Stock quantity is never touched here;
    /// it only changes through movements.
    pub async fn update(&self, id: i64, tire: &NewTire) -> DbResult<Tire> {
        let mut conn = self.pool.acquire().await?;
        update_tire(&mut conn, id, tire, false).await?;
        debug!(tire_id = id, "Tire updated");

        fetch_listing(&mut conn, id)
            .await?
            .map(|l| l.tire)
            .ok_or_else(|| DbError::not_found("Tire", id))
    }

    /// Links a tire to a promotion, or unlinks it with `None`.
    pub async fn set_promotion(&self, id: i64, promotion_id: Option<i64>) -> DbResult<()> {
        let result = sqlx::query("UPDATE tires SET promotion_id = ?1 WHERE id = ?2")
            .bind(promotion_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tire", id));
        }
        debug!(tire_id = id, ?promotion_id, "Tire promotion changed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rust_decimal::Decimal;
    use tread_core::{NewPromotion, PromotionType};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_tire(brand: &str, model: &str, size: &str, price: i64) -> NewTire {
        NewTire {
            brand: brand.to_string(),
            model: model.to_string(),
            size: size.to_string(),
            quantity: 4,
            cost_sc: Some(Money::from_major(price / 2)),
            cost_dunlop: None,
            cost_online: None,
            wholesale_price1: None,
            wholesale_price2: None,
            price_per_item: Money::from_major(price),
            promotion_id: None,
            year_of_manufacture: Some(2024),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_listing() {
        let db = setup().await;
        let tire = db
            .tires()
            .insert(&new_tire("Michelin", "Primacy 4", "205/55R16", 1000))
            .await
            .unwrap();

        let listing = db.tires().get_listing(tire.id).await.unwrap().unwrap();
        assert_eq!(listing.tire.brand, "Michelin");
        assert_eq!(listing.tire.quantity, 4);
        assert_eq!(listing.tire.cost_sc, Some(Money::from_major(500)));
        assert_eq!(listing.promotion, None);
        assert_eq!(listing.quote.price_for_four(), Some(Money::from_major(4000)));
    }

    #[tokio::test]
    async fn test_listing_applies_active_promotion() {
        let db = setup().await;
        let promo = db
            .promotions()
            .insert(&NewPromotion {
                name: "Buy 3 get 1".to_string(),
                promo_type: PromotionType::BuyXGetY,
                value1: Decimal::from(3),
                value2: Some(Decimal::from(1)),
                is_active: true,
            })
            .await
            .unwrap();

        let mut input = new_tire("Bridgestone", "Turanza", "215/55R17", 1000);
        input.promotion_id = Some(promo.id);
        let tire = db.tires().insert(&input).await.unwrap();

        let listing = db.tires().get_listing(tire.id).await.unwrap().unwrap();
        assert_eq!(listing.promotion.as_ref().map(|p| p.id), Some(promo.id));
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(750)));
        assert_eq!(listing.quote.price_for_four(), Some(Money::from_major(3000)));
        assert_eq!(listing.quote.description(), Some("Buy 3 get 1 free"));
    }

    #[tokio::test]
    async fn test_listing_ignores_inactive_promotion() {
        let db = setup().await;
        let promo = db
            .promotions()
            .insert(&NewPromotion {
                name: "Paused".to_string(),
                promo_type: PromotionType::PercentageDiscount,
                value1: Decimal::from(25),
                value2: None,
                is_active: false,
            })
            .await
            .unwrap();

        let mut input = new_tire("Dunlop", "SP Sport", "195/60R15", 1000);
        input.promotion_id = Some(promo.id);
        let tire = db.tires().insert(&input).await.unwrap();

        let listing = db.tires().get_listing(tire.id).await.unwrap().unwrap();
        assert!(listing.promotion.is_some());
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(1000)));
        assert_eq!(listing.quote.description(), None);
    }

    #[tokio::test]
    async fn test_listing_falls_back_on_stored_invalid_promotion() {
        let db = setup().await;
        // Written around validation, the way a legacy row might look.
        sqlx::query(
            "INSERT INTO promotions (id, name, type, value1, value2, is_active, created_at)
             VALUES (7, 'Broken', 'percentage_discount', 150, NULL, 1, '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let mut input = new_tire("Goodyear", "Eagle", "225/45R17", 1000);
        input.promotion_id = Some(7);
        let tire = db.tires().insert(&input).await.unwrap();

        let listing = db.tires().get_listing(tire.id).await.unwrap().unwrap();
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(1000)));
        assert_eq!(listing.quote.description(), None);
    }

    #[tokio::test]
    async fn test_list_search_and_brand_filter() {
        let db = setup().await;
        let repo = db.tires();
        repo.insert(&new_tire("Michelin", "Pilot Sport", "225/45R17", 4000)).await.unwrap();
        repo.insert(&new_tire("Michelin", "Energy", "185/65R15", 2000)).await.unwrap();
        repo.insert(&new_tire("Bridgestone", "Ecopia", "185/65R15", 1900)).await.unwrap();

        let all = repo.list(&InventoryFilter::default()).await.unwrap();
        let order: Vec<_> = all.iter().map(|l| l.tire.model.as_str()).collect();
        assert_eq!(order, vec!["Ecopia", "Energy", "Pilot Sport"]);

        let by_size = repo.list(&InventoryFilter::search("R15")).await.unwrap();
        assert_eq!(by_size.len(), 2);

        let filter = InventoryFilter::search("R15").with_brand("Michelin");
        let narrowed = repo.list(&filter).await.unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].tire.model, "Energy");

        let every_brand = InventoryFilter::default().with_brand("all");
        assert_eq!(repo.list(&every_brand).await.unwrap().len(), 3);

        assert_eq!(repo.brands().await.unwrap(), vec!["Bridgestone", "Michelin"]);
    }

    #[tokio::test]
    async fn test_update_leaves_quantity_alone() {
        let db = setup().await;
        let repo = db.tires();
        let tire = repo.insert(&new_tire("Yokohama", "Advan", "235/40R18", 5000)).await.unwrap();

        let mut changed = new_tire("Yokohama", "Advan", "235/40R18", 5200);
        changed.quantity = 99;
        let updated = repo.update(tire.id, &changed).await.unwrap();

        assert_eq!(updated.price_per_item, Money::from_major(5200));
        assert_eq!(updated.quantity, 4);
    }

    #[tokio::test]
    async fn test_duplicate_natural_key() {
        let db = setup().await;
        let repo = db.tires();
        repo.insert(&new_tire("Maxxis", "Victra", "205/45R17", 2500)).await.unwrap();

        let err = repo
            .insert(&new_tire("Maxxis", "Victra", "205/45R17", 2600))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let found = repo
            .find_by_natural_key("Maxxis", "Victra", "205/45R17")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.price_per_item, Money::from_major(2500));
    }

    #[tokio::test]
    async fn test_unknown_promotion_link_rejected() {
        let db = setup().await;
        let mut input = new_tire("Toyo", "Proxes", "225/50R17", 3000);
        input.promotion_id = Some(404);

        let err = db.tires().insert(&input).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_deleting_promotion_unlinks_tires() {
        let db = setup().await;
        let promo = db
            .promotions()
            .insert(&NewPromotion {
                name: "25% off".to_string(),
                promo_type: PromotionType::PercentageDiscount,
                value1: Decimal::from(25),
                value2: None,
                is_active: true,
            })
            .await
            .unwrap();

        let tire = db
            .tires()
            .insert(&new_tire("Falken", "Ziex", "215/60R16", 1000))
            .await
            .unwrap();
        db.tires().set_promotion(tire.id, Some(promo.id)).await.unwrap();
        assert_eq!(db.promotions().linked_tire_count(promo.id).await.unwrap(), 1);

        let unlinked = db.promotions().delete(promo.id).await.unwrap();
        assert_eq!(unlinked, 1);

        let listing = db.tires().get_listing(tire.id).await.unwrap().unwrap();
        assert_eq!(listing.tire.promotion_id, None);
        assert_eq!(listing.quote.price_per_item(), Some(Money::from_major(1000)));
    }
}

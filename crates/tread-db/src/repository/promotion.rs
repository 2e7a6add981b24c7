//! # Promotion Repository
//!
//! Database operations for promotions.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete(promotion 3)                                                    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE tires SET promotion_id = NULL WHERE promotion_id = 3          │
//! │    DELETE FROM promotions WHERE id = 3                                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Tires linked to the promotion go back to their base price; no tire     │
//! │  is ever left pointing at a missing promotion.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use tread_core::validation::validate_promotion;
use tread_core::{NewPromotion, Promotion};

use crate::error::{DbError, DbResult};
use crate::repository::{decimal_from_real, real_from_decimal};

const SELECT_PROMOTION: &str = r#"
    SELECT id, name, type AS promo_type, value1, value2, is_active, created_at
    FROM promotions
"#;

#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: i64,
    name: String,
    promo_type: String,
    value1: Option<f64>,
    value2: Option<f64>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Promotion {
            id: row.id,
            name: row.name,
            promo_type: row.promo_type,
            value1: decimal_from_real(row.value1),
            value2: decimal_from_real(row.value2),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Column values for an insert or update, after validation.
struct PromotionParams {
    value1: f64,
    value2: Option<f64>,
}

impl PromotionParams {
    fn from_new(promotion: &NewPromotion) -> DbResult<Self> {
        validate_promotion(promotion)?;

        // Percentage discounts have no second parameter; drop any stray value.
        let value2 = if promotion.promo_type.uses_value2() {
            promotion
                .value2
                .map(|v| real_from_decimal("value2", v))
                .transpose()?
        } else {
            None
        };

        Ok(PromotionParams {
            value1: real_from_decimal("value1", promotion.value1)?,
            value2,
        })
    }
}

/// Maps a name clash to a readable duplicate error.
fn duplicate_name(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("promotion name", name.trim()),
        other => other,
    }
}

/// Repository for promotion database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.promotions();
///
/// let active = repo.list(false).await?;
/// let promo = repo.get_by_id(3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets a promotion by id, active or not.
    ///
    /// ## Returns
    /// * `Ok(Some(Promotion))` - Promotion found
    /// * `Ok(None)` - Promotion not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Promotion>> {
        let row = sqlx::query_as::<_, PromotionRow>(&format!("{SELECT_PROMOTION} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Promotion::from))
    }

    /// Lists promotions ordered by name.
    ///
    /// Inactive promotions are included only when asked for (the edit
    /// screens show them; pickers for new tires do not).
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Promotion>> {
        let sql = if include_inactive {
            format!("{SELECT_PROMOTION} ORDER BY name")
        } else {
            format!("{SELECT_PROMOTION} WHERE is_active = 1 ORDER BY name")
        };

        let rows = sqlx::query_as::<_, PromotionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), include_inactive, "Listed promotions");
        Ok(rows.into_iter().map(Promotion::from).collect())
    }

    /// Creates a promotion.
    ///
    /// ## Errors
    /// * `DbError::Validation` - parameters out of range for the type
    /// * `DbError::UniqueViolation` - name already used
    pub async fn insert(&self, promotion: &NewPromotion) -> DbResult<Promotion> {
        let params = PromotionParams::from_new(promotion)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO promotions (name, type, value1, value2, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(promotion.name.trim())
        .bind(promotion.promo_type.as_str())
        .bind(params.value1)
        .bind(params.value2)
        .bind(promotion.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &promotion.name))?;

        let id = result.last_insert_rowid();
        debug!(promotion_id = id, promo_type = %promotion.promo_type, "Promotion created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Promotion", id))
    }

    /// Replaces a promotion's name, type, parameters and active flag.
    pub async fn update(&self, id: i64, promotion: &NewPromotion) -> DbResult<Promotion> {
        let params = PromotionParams::from_new(promotion)?;

        let result = sqlx::query(
            r#"
            UPDATE promotions
            SET name = ?1, type = ?2, value1 = ?3, value2 = ?4, is_active = ?5
            WHERE id = ?6
            "#,
        )
        .bind(promotion.name.trim())
        .bind(promotion.promo_type.as_str())
        .bind(params.value1)
        .bind(params.value2)
        .bind(promotion.is_active)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &promotion.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        debug!(promotion_id = id, is_active = promotion.is_active, "Promotion updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Promotion", id))
    }

    /// Deletes a promotion, unlinking it from every tire first.
    ///
    /// ## Returns
    /// The number of tires that were unlinked.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let unlinked = sqlx::query("UPDATE tires SET promotion_id = NULL WHERE promotion_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM promotions WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back the unlink.
            return Err(DbError::not_found("Promotion", id));
        }

        tx.commit().await?;

        debug!(promotion_id = id, unlinked, "Promotion deleted");
        Ok(unlinked)
    }

    /// Number of tires currently linked to the promotion.
    pub async fn linked_tire_count(&self, id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tires WHERE promotion_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
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
    use tread_core::PromotionType;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_promotion(name: &str, promo_type: PromotionType, value1: i64, value2: Option<i64>) -> NewPromotion {
        NewPromotion {
            name: name.to_string(),
            promo_type,
            value1: Decimal::from(value1),
            value2: value2.map(Decimal::from),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.promotions();

        let created = repo
            .insert(&new_promotion("Buy 3 get 1", PromotionType::BuyXGetY, 3, Some(1)))
            .await
            .unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Buy 3 get 1");
        assert_eq!(fetched.promo_type, "buy_x_get_y");
        assert_eq!(fetched.value1, Some(Decimal::from(3)));
        assert_eq!(fetched.value2, Some(Decimal::from(1)));
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_percentage_drops_second_value() {
        let db = setup().await;
        let created = db
            .promotions()
            .insert(&new_promotion("25% off", PromotionType::PercentageDiscount, 25, Some(9)))
            .await
            .unwrap();

        assert_eq!(created.value2, None);
    }

    #[tokio::test]
    async fn test_invalid_promotion_rejected_on_write() {
        let db = setup().await;
        let err = db
            .promotions()
            .insert(&new_promotion("Too generous", PromotionType::PercentageDiscount, 150, None))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = setup().await;
        let repo = db.promotions();
        let promo = new_promotion("Summer", PromotionType::PercentageDiscount, 10, None);

        repo.insert(&promo).await.unwrap();
        let err = repo.insert(&promo).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_inactive() {
        let db = setup().await;
        let repo = db.promotions();

        repo.insert(&new_promotion("B active", PromotionType::PercentageDiscount, 10, None))
            .await
            .unwrap();
        let mut inactive = new_promotion("A inactive", PromotionType::PercentageDiscount, 20, None);
        inactive.is_active = false;
        repo.insert(&inactive).await.unwrap();

        let active = repo.list(false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "B active");

        let all = repo.list(true).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A inactive", "B active"]);
    }

    #[tokio::test]
    async fn test_update() {
        let db = setup().await;
        let repo = db.promotions();
        let created = repo
            .insert(&new_promotion("Bundle", PromotionType::FixedPricePerN, 2900, Some(3)))
            .await
            .unwrap();

        let mut changed = new_promotion("Bundle", PromotionType::FixedPricePerN, 3000, Some(4));
        changed.is_active = false;
        let updated = repo.update(created.id, &changed).await.unwrap();

        assert_eq!(updated.value1, Some(Decimal::from(3000)));
        assert_eq!(updated.value2, Some(Decimal::from(4)));
        assert!(!updated.is_active);
        assert_eq!(updated.created_at, created.created_at);

        let missing = repo.update(9999, &changed).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = setup().await;
        let err = db.promotions().delete(42).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

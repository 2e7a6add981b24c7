//! # Fitment Repository
//!
//! Vehicles each wheel is known to fit. Fitments belong to their wheel and
//! are removed with it (`ON DELETE CASCADE`).

use sqlx::SqlitePool;
use tracing::debug;

use tread_core::validation::validate_fitment;
use tread_core::{NewFitment, WheelFitment};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct FitmentRow {
    id: i64,
    wheel_id: i64,
    brand: String,
    model: String,
    year_start: i32,
    year_end: Option<i32>,
}

impl From<FitmentRow> for WheelFitment {
    fn from(row: FitmentRow) -> Self {
        WheelFitment {
            id: row.id,
            wheel_id: row.wheel_id,
            brand: row.brand,
            model: row.model,
            year_start: row.year_start,
            year_end: row.year_end,
        }
    }
}

/// Repository for wheel fitments.
#[derive(Debug, Clone)]
pub struct FitmentRepository {
    pool: SqlitePool,
}

impl FitmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FitmentRepository { pool }
    }

    /// Adds a fitment to a wheel.
    ///
    /// ## Errors
    /// * `DbError::Validation` - blank make/model or years out of order
    /// * `DbError::ForeignKeyViolation` - the wheel does not exist
    /// * `DbError::UniqueViolation` - the same fitment is already recorded
    pub async fn add(&self, wheel_id: i64, fitment: &NewFitment) -> DbResult<WheelFitment> {
        validate_fitment(fitment)?;

        let row = sqlx::query_as::<_, FitmentRow>(
            r#"
            INSERT INTO wheel_fitments (wheel_id, brand, model, year_start, year_end)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, wheel_id, brand, model, year_start, year_end
            "#,
        )
        .bind(wheel_id)
        .bind(fitment.brand.trim())
        .bind(fitment.model.trim())
        .bind(fitment.year_start)
        .bind(fitment.year_end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(
                "fitment",
                format!("{} {} from {}", fitment.brand.trim(), fitment.model.trim(), fitment.year_start),
            ),
            other => other,
        })?;

        debug!(wheel_id, fitment_id = row.id, "Fitment added");
        Ok(row.into())
    }

    /// Fitments for one wheel, ordered by make, model, first year.
    pub async fn list_for_wheel(&self, wheel_id: i64) -> DbResult<Vec<WheelFitment>> {
        let rows = sqlx::query_as::<_, FitmentRow>(
            r#"
            SELECT id, wheel_id, brand, model, year_start, year_end
            FROM wheel_fitments
            WHERE wheel_id = ?1
            ORDER BY brand, model, year_start
            "#,
        )
        .bind(wheel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WheelFitment::from).collect())
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM wheel_fitments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Fitment", id));
        }

        debug!(fitment_id = id, "Fitment deleted");
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
    use tread_core::{Money, NewWheel};

    async fn setup_with_wheel() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let wheel = db
            .wheels()
            .insert(&NewWheel {
                brand: "Enkei".to_string(),
                model: "RPF1".to_string(),
                diameter: 17.0,
                pcd: "5x114.3".to_string(),
                width: 8.0,
                et: Some(45),
                color: None,
                quantity: 0,
                cost: None,
                cost_online: None,
                wholesale_price1: None,
                wholesale_price2: None,
                retail_price: Money::from_major(6000),
                image_filename: None,
            })
            .await
            .unwrap();
        (db, wheel.id)
    }

    fn fitment(brand: &str, model: &str, start: i32, end: Option<i32>) -> NewFitment {
        NewFitment {
            brand: brand.to_string(),
            model: model.to_string(),
            year_start: start,
            year_end: end,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_ordered() {
        let (db, wheel_id) = setup_with_wheel().await;
        let repo = db.fitments();

        repo.add(wheel_id, &fitment("Toyota", "Camry", 2018, None)).await.unwrap();
        repo.add(wheel_id, &fitment("Honda", "Civic", 2016, Some(2021))).await.unwrap();
        repo.add(wheel_id, &fitment("Honda", "Accord", 2013, Some(2017))).await.unwrap();

        let listed = repo.list_for_wheel(wheel_id).await.unwrap();
        let models: Vec<_> = listed.iter().map(|f| f.model.as_str()).collect();
        assert_eq!(models, vec!["Accord", "Civic", "Camry"]);
        assert!(listed[2].covers_year(2030));
    }

    #[tokio::test]
    async fn test_add_rejects_reversed_years() {
        let (db, wheel_id) = setup_with_wheel().await;
        let err = db
            .fitments()
            .add(wheel_id, &fitment("Honda", "Civic", 2020, Some(2015)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_to_missing_wheel() {
        let (db, _) = setup_with_wheel().await;
        let err = db
            .fitments()
            .add(999, &fitment("Honda", "Civic", 2016, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_fitment() {
        let (db, wheel_id) = setup_with_wheel().await;
        let repo = db.fitments();
        let civic = fitment("Honda", "Civic", 2016, Some(2021));

        repo.add(wheel_id, &civic).await.unwrap();
        let err = repo.add(wheel_id, &civic).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, wheel_id) = setup_with_wheel().await;
        let repo = db.fitments();
        let added = repo.add(wheel_id, &fitment("Mazda", "3", 2019, None)).await.unwrap();

        repo.delete(added.id).await.unwrap();
        assert!(repo.list_for_wheel(wheel_id).await.unwrap().is_empty());
        assert!(repo.delete(added.id).await.unwrap_err().is_not_found());
    }
}

//! Locations repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::postgres::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::location::{CreateLocation, Location},
};

#[async_trait]
pub trait LocationRepository: Send {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Location>>;

    /// All locations ordered by name
    async fn get_all(&mut self) -> AppResult<Vec<Location>>;

    /// Whether a location with this exact (name, building, floor) exists
    async fn exists(&mut self, name: &str, building: &str, floor: &str) -> AppResult<bool>;

    async fn add(&mut self, data: &CreateLocation, now: DateTime<Utc>) -> AppResult<Location>;
}

pub fn duplicate_location(data: &CreateLocation) -> AppError {
    AppError::business_rule(
        "Location already exists",
        format!(
            "Location '{}' already exists in building '{}' on floor '{}'",
            data.location_name, data.building, data.floor
        ),
    )
}

#[async_trait]
impl LocationRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE location_id = $1")
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(row)
    }

    async fn get_all(&mut self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY location_name, location_id")
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn exists(&mut self, name: &str, building: &str, floor: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM locations
                WHERE location_name = $1 AND building = $2 AND floor = $3
            )
            "#,
        )
        .bind(name)
        .bind(building)
        .bind(floor)
        .fetch_one(self.conn())
        .await?;
        Ok(exists)
    }

    async fn add(&mut self, data: &CreateLocation, now: DateTime<Utc>) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (location_name, building, floor, created_date, modified_date)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&data.location_name)
        .bind(&data.building)
        .bind(&data.floor)
        .bind(now)
        .fetch_one(self.conn())
        .await
        .map_err(|e| {
            let error = AppError::from(e);
            if error.is_unique_violation() {
                duplicate_location(data)
            } else {
                error
            }
        })
    }
}

//! Categories repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::postgres::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory},
};

#[async_trait]
pub trait CategoryRepository: Send {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Category>>;

    /// All categories ordered by name
    async fn get_all(&mut self) -> AppResult<Vec<Category>>;

    async fn name_exists(&mut self, name: &str) -> AppResult<bool>;

    async fn add(&mut self, data: &CreateCategory, now: DateTime<Utc>) -> AppResult<Category>;
}

pub fn duplicate_category_name(name: &str) -> AppError {
    AppError::business_rule(
        "Category name already exists",
        format!("Category with name '{}' already exists", name),
    )
}

#[async_trait]
impl CategoryRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE category_id = $1")
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(row)
    }

    async fn get_all(&mut self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY category_name, category_id")
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn name_exists(&mut self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE category_name = $1)")
                .bind(name)
                .fetch_one(self.conn())
                .await?;
        Ok(exists)
    }

    async fn add(&mut self, data: &CreateCategory, now: DateTime<Utc>) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (category_name, description, created_date, modified_date)
            VALUES ($1, $2, $3, $3)
            RETURNING *
            "#,
        )
        .bind(&data.category_name)
        .bind(&data.description)
        .bind(now)
        .fetch_one(self.conn())
        .await
        .map_err(|e| {
            let error = AppError::from(e);
            if error.is_unique_violation() {
                duplicate_category_name(&data.category_name)
            } else {
                error
            }
        })
    }
}

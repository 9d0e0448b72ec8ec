//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Category row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub category_id: i32,
    pub category_name: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Category as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(rename = "categoryID")]
    pub category_id: i32,
    pub category_name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.category_id,
            category_name: category.category_name,
            description: category.description,
        }
    }
}

/// Create category request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"))]
    pub category_name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

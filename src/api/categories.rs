//! Category API endpoints

use axum::extract::State;

use super::{ApiJson, ApiPath, Envelope};
use crate::{
    models::category::{CategoryDto, CreateCategory},
    AppState,
};

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryDto>)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> Envelope<Vec<CategoryDto>> {
    Envelope::ok(state.services.categories.get_all().await)
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryDto),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Envelope<CategoryDto> {
    Envelope::ok(state.services.categories.get_by_id(id).await)
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation failed or name already used")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateCategory>,
) -> Envelope<CategoryDto> {
    Envelope::created(state.services.categories.create(&data).await, |dto| {
        format!("/api/v1/categories/{}", dto.category_id)
    })
}

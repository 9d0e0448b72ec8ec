//! Equipment API endpoints

use axum::extract::State;

use super::{ApiJson, ApiPath, ApiQuery, Envelope};
use crate::{
    models::{
        equipment::{CreateEquipment, EquipmentDto, EquipmentSearchQuery, UpdateEquipment},
        pagination::PagedResult,
    },
    AppState,
};

fn equipment_location(dto: &EquipmentDto) -> String {
    format!("/api/v1/equipments/{}", dto.equipment_id)
}

/// List equipment with pagination, filtering and sorting
#[utoipa::path(
    get,
    path = "/equipments",
    tag = "equipments",
    params(EquipmentSearchQuery),
    responses(
        (status = 200, description = "Page of equipment with paging metadata"),
        (status = 400, description = "Page number or page size out of range"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EquipmentSearchQuery>,
) -> Envelope<PagedResult<EquipmentDto>> {
    Envelope::ok(state.services.equipment.get_all(&query.page_query()).await)
}

/// Search equipment by name or serial, category, status and purchase date range
#[utoipa::path(
    get,
    path = "/equipments/search",
    tag = "equipments",
    params(EquipmentSearchQuery),
    responses(
        (status = 200, description = "Every matching equipment, by name", body = Vec<EquipmentDto>),
        (status = 400, description = "Purchase date range is inverted"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_equipment(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EquipmentSearchQuery>,
) -> Envelope<Vec<EquipmentDto>> {
    Envelope::ok(state.services.equipment.search(&query.filter()).await)
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipments/{id}",
    tag = "equipments",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentDto),
        (status = 400, description = "ID is not positive"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Envelope<EquipmentDto> {
    Envelope::ok(state.services.equipment.get_by_id(id).await)
}

/// List the equipment of one category
#[utoipa::path(
    get,
    path = "/equipments/category/{categoryId}",
    tag = "equipments",
    params(("categoryId" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Equipment in the category", body = Vec<EquipmentDto>),
        (status = 400, description = "ID is not positive"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn list_equipment_by_category(
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
) -> Envelope<Vec<EquipmentDto>> {
    Envelope::ok(state.services.equipment.get_by_category(category_id).await)
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipments",
    tag = "equipments",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentDto),
        (status = 400, description = "Validation failed, duplicate serial number or unknown category/location")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateEquipment>,
) -> Envelope<EquipmentDto> {
    Envelope::created(state.services.equipment.create(&data).await, equipment_location)
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipments/{id}",
    tag = "equipments",
    params(("id" = i32, Path, description = "Equipment ID, must match equipmentID in the body")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentDto),
        (status = 400, description = "ID mismatch, validation failed or business rule violated"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<UpdateEquipment>,
) -> Envelope<EquipmentDto> {
    Envelope::ok(state.services.equipment.update(id, &data).await)
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipments/{id}",
    tag = "equipments",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted, data is true"),
        (status = 400, description = "ID is not positive"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Envelope<bool> {
    Envelope::ok(state.services.equipment.delete(id).await)
}

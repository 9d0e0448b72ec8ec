//! Location API endpoints

use axum::extract::State;

use super::{ApiJson, ApiPath, Envelope};
use crate::{
    models::location::{CreateLocation, LocationDto},
    AppState,
};

/// List all locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    responses(
        (status = 200, description = "Locations ordered by name", body = Vec<LocationDto>)
    )
)]
pub async fn list_locations(State(state): State<AppState>) -> Envelope<Vec<LocationDto>> {
    Envelope::ok(state.services.locations.get_all().await)
}

/// Get location by ID
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "locations",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = LocationDto),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Envelope<LocationDto> {
    Envelope::ok(state.services.locations.get_by_id(id).await)
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = LocationDto),
        (status = 400, description = "Validation failed or location already exists")
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateLocation>,
) -> Envelope<LocationDto> {
    Envelope::created(state.services.locations.create(&data).await, |dto| {
        format!("/api/v1/locations/{}", dto.location_id)
    })
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{categories, equipment, health, locations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Management API",
        version = "1.0.0",
        description = "Equipment inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::list_equipment,
        equipment::search_equipment,
        equipment::get_equipment,
        equipment::list_equipment_by_category,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        // Locations
        locations::list_locations,
        locations::get_location,
        locations::create_location,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::EquipmentDto,
            crate::models::equipment::EquipmentStatus,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Categories
            crate::models::category::CategoryDto,
            crate::models::category::CreateCategory,
            // Locations
            crate::models::location::LocationDto,
            crate::models::location::CreateLocation,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipments", description = "Equipment inventory"),
        (name = "categories", description = "Equipment categories"),
        (name = "locations", description = "Equipment locations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

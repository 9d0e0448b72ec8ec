//! API handlers for the equipment inventory REST endpoints

pub mod categories;
pub mod equipment;
pub mod health;
pub mod locations;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::LOCATION, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::response::ApiResponse, AppState};

fn rejected(detail: String) -> AppError {
    AppError::Validation {
        message: "Validation failed".to_string(),
        errors: vec![detail],
    }
}

/// JSON body extractor whose rejections use the response envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Query string extractor whose rejections use the response envelope
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Path parameter extractor whose rejections use the response envelope
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// Service envelope rendered with the status its outcome calls for.
///
/// Failures take their status from the error kind; successes use the
/// status given at construction.
pub struct Envelope<T> {
    response: ApiResponse<T>,
    status: StatusCode,
    location: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(response: ApiResponse<T>) -> Self {
        Self {
            response,
            status: StatusCode::OK,
            location: None,
        }
    }

    /// 201 with a `Location` header built from the created resource
    pub fn created(response: ApiResponse<T>, location: impl FnOnce(&T) -> String) -> Self {
        let location = response.data.as_ref().map(location);
        Self {
            response,
            status: StatusCode::CREATED,
            location,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self
            .response
            .kind()
            .map(|kind| kind.status_code())
            .unwrap_or(self.status);
        let location = self.location.filter(|_| self.response.success);

        let mut response = (status, Json(self.response)).into_response();
        if let Some(value) = location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response.headers_mut().insert(LOCATION, value);
        }
        response
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Equipment
        .route(
            "/equipments",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route("/equipments/search", get(equipment::search_equipment))
        .route(
            "/equipments/category/:category_id",
            get(equipment::list_equipment_by_category),
        )
        .route(
            "/equipments/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/:id", get(categories::get_category))
        // Locations
        .route(
            "/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route("/locations/:id", get(locations::get_location))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

//! Location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Location row; (name, building, floor) is unique
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Location {
    pub location_id: i32,
    pub location_name: String,
    pub building: String,
    pub floor: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Location as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    #[serde(rename = "locationID")]
    pub location_id: i32,
    pub location_name: String,
    pub building: String,
    pub floor: String,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            location_id: location.location_id,
            location_name: location.location_name,
            building: location.building,
            floor: location.floor,
        }
    }
}

/// Create location request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocation {
    #[validate(length(min = 1, max = 100, message = "Location name must be between 1 and 100 characters"))]
    pub location_name: String,
    #[validate(length(min = 1, max = 100, message = "Building must be between 1 and 100 characters"))]
    pub building: String,
    #[validate(length(min = 1, max = 50, message = "Floor must be between 1 and 50 characters"))]
    pub floor: String,
}

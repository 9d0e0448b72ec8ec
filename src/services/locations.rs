//! Locations service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        location::{CreateLocation, LocationDto},
        response::{ApiResponse, DEFAULT_SUCCESS_MESSAGE},
    },
    repository::{locations::duplicate_location, Repository},
};

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
}

impl LocationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All locations ordered by name
    pub async fn get_all(&self) -> ApiResponse<Vec<LocationDto>> {
        tracing::info!("Fetching all locations");
        let result = self.fetch_all().await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching locations")
    }

    pub async fn get_by_id(&self, id: i32) -> ApiResponse<LocationDto> {
        tracing::info!(location_id = id, "Fetching location");
        let result = self.fetch_one(id).await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching location")
    }

    pub async fn create(&self, data: &CreateLocation) -> ApiResponse<LocationDto> {
        tracing::info!(location_name = %data.location_name, "Creating location");
        let result = self.create_location(data).await;
        ApiResponse::from_result(
            result,
            "Location created successfully",
            "An error occurred while creating location",
        )
    }

    async fn fetch_all(&self) -> AppResult<Vec<LocationDto>> {
        let mut uow = self.repository.begin().await?;
        let rows = uow.locations().get_all().await?;
        uow.commit().await?;
        Ok(rows.into_iter().map(LocationDto::from).collect())
    }

    async fn fetch_one(&self, id: i32) -> AppResult<LocationDto> {
        if id <= 0 {
            return Err(AppError::validation(
                "Invalid location ID",
                "Location ID must be greater than 0",
            ));
        }

        let mut uow = self.repository.begin().await?;
        let location = uow.locations().get_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(format!("Location with ID {} not found", id), "Location not found")
        })?;
        uow.commit().await?;
        Ok(location.into())
    }

    async fn create_location(&self, data: &CreateLocation) -> AppResult<LocationDto> {
        data.validate()?;

        let mut uow = self.repository.begin().await?;
        if uow
            .locations()
            .exists(&data.location_name, &data.building, &data.floor)
            .await?
        {
            return Err(duplicate_location(data));
        }
        let location = uow.locations().add(data, Utc::now()).await?;
        uow.commit().await?;

        tracing::info!(location_id = location.location_id, "Created location");
        Ok(location.into())
    }
}

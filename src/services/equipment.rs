//! Equipment service
//!
//! Every public operation runs in one unit of work and returns an
//! [`ApiResponse`]; failures never escape as raw errors.

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{
            CreateEquipment, Equipment, EquipmentDto, EquipmentFilter, EquipmentPageQuery,
            NewEquipment, UpdateEquipment,
        },
        pagination::{PagedResult, MAX_PAGE_SIZE},
        response::{ApiResponse, DEFAULT_SUCCESS_MESSAGE},
    },
    repository::{equipment::duplicate_serial_number, Repository, UnitOfWork},
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Paged, filtered and sorted listing
    pub async fn get_all(&self, query: &EquipmentPageQuery) -> ApiResponse<PagedResult<EquipmentDto>> {
        tracing::info!(
            page_number = query.page_number,
            page_size = query.page_size,
            "Fetching equipment page"
        );
        let result = self.fetch_page(query).await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching equipment")
    }

    pub async fn get_by_id(&self, id: i32) -> ApiResponse<EquipmentDto> {
        tracing::info!(equipment_id = id, "Fetching equipment");
        let result = self.fetch_one(id).await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching equipment")
    }

    /// Unpaged search, ordered by name
    pub async fn search(&self, filter: &EquipmentFilter) -> ApiResponse<Vec<EquipmentDto>> {
        tracing::info!(search_term = ?filter.search_term, "Searching equipment");
        let result = self.fetch_matches(filter).await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while searching equipment")
    }

    pub async fn get_by_category(&self, category_id: i32) -> ApiResponse<Vec<EquipmentDto>> {
        tracing::info!(category_id, "Fetching equipment by category");
        let result = self.fetch_by_category(category_id).await;
        ApiResponse::from_result(
            result,
            DEFAULT_SUCCESS_MESSAGE,
            "An error occurred while fetching equipment by category",
        )
    }

    pub async fn create(&self, data: &CreateEquipment) -> ApiResponse<EquipmentDto> {
        tracing::info!(equipment_name = %data.equipment_name, "Creating equipment");
        let result = self.create_equipment(data).await;
        ApiResponse::from_result(
            result,
            "Equipment created successfully",
            "An error occurred while creating equipment",
        )
    }

    /// Replace the mutable fields of equipment `id`; `data.equipment_id` must equal `id`
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> ApiResponse<EquipmentDto> {
        tracing::info!(equipment_id = id, "Updating equipment");
        let result = self.update_equipment(id, data).await;
        ApiResponse::from_result(
            result,
            "Equipment updated successfully",
            "An error occurred while updating equipment",
        )
    }

    pub async fn delete(&self, id: i32) -> ApiResponse<bool> {
        tracing::info!(equipment_id = id, "Deleting equipment");
        let result = self.delete_equipment(id).await;
        ApiResponse::from_result(
            result,
            "Equipment deleted successfully",
            "An error occurred while deleting equipment",
        )
    }

    async fn fetch_page(&self, query: &EquipmentPageQuery) -> AppResult<PagedResult<EquipmentDto>> {
        validate_page(query)?;

        let mut uow = self.repository.begin().await?;
        let (rows, total) = uow.equipment().get_paged(query).await?;
        uow.commit().await?;

        tracing::info!(count = rows.len(), total, "Fetched equipment page");
        Ok(PagedResult::new(rows, total, query.page_number, query.page_size).map(EquipmentDto::from))
    }

    async fn fetch_one(&self, id: i32) -> AppResult<EquipmentDto> {
        validate_equipment_id(id)?;

        let mut uow = self.repository.begin().await?;
        let details = uow
            .equipment()
            .get_by_id(id)
            .await?
            .ok_or_else(|| equipment_not_found(id))?;
        uow.commit().await?;

        Ok(details.into())
    }

    async fn fetch_matches(&self, filter: &EquipmentFilter) -> AppResult<Vec<EquipmentDto>> {
        validate_date_range(filter.purchase_date_from, filter.purchase_date_to)?;

        let mut uow = self.repository.begin().await?;
        let rows = uow.equipment().search(filter).await?;
        uow.commit().await?;

        tracing::info!(count = rows.len(), "Equipment search complete");
        Ok(rows.into_iter().map(EquipmentDto::from).collect())
    }

    async fn fetch_by_category(&self, category_id: i32) -> AppResult<Vec<EquipmentDto>> {
        if category_id <= 0 {
            return Err(AppError::validation(
                "Invalid category ID",
                "Category ID must be greater than 0",
            ));
        }

        let mut uow = self.repository.begin().await?;
        if uow.categories().get_by_id(category_id).await?.is_none() {
            return Err(AppError::not_found(
                format!("Category with ID {} not found", category_id),
                "Category not found",
            ));
        }
        let rows = uow.equipment().get_by_category(category_id).await?;
        uow.commit().await?;

        tracing::info!(count = rows.len(), category_id, "Fetched equipment by category");
        Ok(rows.into_iter().map(EquipmentDto::from).collect())
    }

    async fn create_equipment(&self, data: &CreateEquipment) -> AppResult<EquipmentDto> {
        data.validate()?;
        validate_purchase_date(data.purchase_date)?;

        let mut uow = self.repository.begin().await?;

        if uow
            .equipment()
            .serial_number_exists(&data.serial_number, None)
            .await?
        {
            return Err(duplicate_serial_number(&data.serial_number));
        }
        ensure_references(uow.as_mut(), data.category_id, data.location_id).await?;

        let now = Utc::now();
        let id = uow
            .equipment()
            .add(&NewEquipment {
                equipment_name: data.equipment_name.clone(),
                serial_number: data.serial_number.clone(),
                category_id: data.category_id,
                location_id: data.location_id,
                purchase_date: data.purchase_date,
                status: data.status,
                created_date: now,
                modified_date: now,
            })
            .await?;
        let details = uow
            .equipment()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Equipment {} missing after insert", id)))?;
        uow.commit().await?;

        tracing::info!(equipment_id = id, "Created equipment");
        Ok(details.into())
    }

    async fn update_equipment(&self, id: i32, data: &UpdateEquipment) -> AppResult<EquipmentDto> {
        if id != data.equipment_id {
            return Err(AppError::validation(
                "Equipment ID mismatch",
                "ID in URL does not match ID in request body",
            ));
        }
        validate_equipment_id(id)?;
        data.validate()?;
        validate_purchase_date(data.purchase_date)?;

        let mut uow = self.repository.begin().await?;

        let current = uow
            .equipment()
            .get_by_id(id)
            .await?
            .ok_or_else(|| equipment_not_found(id))?
            .equipment;

        if current.serial_number != data.serial_number
            && uow
                .equipment()
                .serial_number_exists(&data.serial_number, Some(id))
                .await?
        {
            return Err(duplicate_serial_number(&data.serial_number));
        }
        ensure_references(uow.as_mut(), data.category_id, data.location_id).await?;

        let updated = Equipment {
            equipment_name: data.equipment_name.clone(),
            serial_number: data.serial_number.clone(),
            category_id: data.category_id,
            location_id: data.location_id,
            purchase_date: data.purchase_date,
            status: data.status,
            modified_date: Utc::now(),
            ..current
        };
        if !uow.equipment().update(&updated).await? {
            return Err(equipment_not_found(id));
        }
        let details = uow
            .equipment()
            .get_by_id(id)
            .await?
            .ok_or_else(|| equipment_not_found(id))?;
        uow.commit().await?;

        tracing::info!(equipment_id = id, "Updated equipment");
        Ok(details.into())
    }

    async fn delete_equipment(&self, id: i32) -> AppResult<bool> {
        validate_equipment_id(id)?;

        let mut uow = self.repository.begin().await?;
        if !uow.equipment().delete(id).await? {
            return Err(equipment_not_found(id));
        }
        uow.commit().await?;

        tracing::info!(equipment_id = id, "Deleted equipment");
        Ok(true)
    }
}

fn equipment_not_found(id: i32) -> AppError {
    AppError::not_found(format!("Equipment with ID {} not found", id), "Equipment not found")
}

fn validate_equipment_id(id: i32) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::validation(
            "Invalid equipment ID",
            "Equipment ID must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_page(query: &EquipmentPageQuery) -> AppResult<()> {
    if query.page_number < 1 {
        return Err(AppError::validation(
            "Page number must be greater than 0",
            "Invalid page number",
        ));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&query.page_size) {
        return Err(AppError::validation(
            "Page size must be between 1 and 100",
            "Invalid page size",
        ));
    }
    Ok(())
}

fn validate_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::validation(
                "Purchase date 'from' cannot be after 'to'",
                "Invalid date range",
            ));
        }
    }
    Ok(())
}

fn validate_purchase_date(purchase_date: NaiveDate) -> AppResult<()> {
    if purchase_date > Utc::now().date_naive() {
        return Err(AppError::validation(
            "Purchase date cannot be in the future",
            "Invalid purchase date",
        ));
    }
    Ok(())
}

/// Both referenced rows must exist
async fn ensure_references(uow: &mut dyn UnitOfWork, category_id: i32, location_id: i32) -> AppResult<()> {
    if uow.categories().get_by_id(category_id).await?.is_none() {
        return Err(AppError::business_rule(
            "Invalid category",
            format!("Category with ID {} does not exist", category_id),
        ));
    }
    if uow.locations().get_by_id(location_id).await?.is_none() {
        return Err(AppError::business_rule(
            "Invalid location",
            format!("Location with ID {} does not exist", location_id),
        ));
    }
    Ok(())
}

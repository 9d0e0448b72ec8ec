//! Categories service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{CategoryDto, CreateCategory},
        response::{ApiResponse, DEFAULT_SUCCESS_MESSAGE},
    },
    repository::{categories::duplicate_category_name, Repository},
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All categories ordered by name
    pub async fn get_all(&self) -> ApiResponse<Vec<CategoryDto>> {
        tracing::info!("Fetching all categories");
        let result = self.fetch_all().await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching categories")
    }

    pub async fn get_by_id(&self, id: i32) -> ApiResponse<CategoryDto> {
        tracing::info!(category_id = id, "Fetching category");
        let result = self.fetch_one(id).await;
        ApiResponse::from_result(result, DEFAULT_SUCCESS_MESSAGE, "An error occurred while fetching category")
    }

    pub async fn create(&self, data: &CreateCategory) -> ApiResponse<CategoryDto> {
        tracing::info!(category_name = %data.category_name, "Creating category");
        let result = self.create_category(data).await;
        ApiResponse::from_result(
            result,
            "Category created successfully",
            "An error occurred while creating category",
        )
    }

    async fn fetch_all(&self) -> AppResult<Vec<CategoryDto>> {
        let mut uow = self.repository.begin().await?;
        let rows = uow.categories().get_all().await?;
        uow.commit().await?;
        Ok(rows.into_iter().map(CategoryDto::from).collect())
    }

    async fn fetch_one(&self, id: i32) -> AppResult<CategoryDto> {
        if id <= 0 {
            return Err(AppError::validation(
                "Invalid category ID",
                "Category ID must be greater than 0",
            ));
        }

        let mut uow = self.repository.begin().await?;
        let category = uow.categories().get_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(format!("Category with ID {} not found", id), "Category not found")
        })?;
        uow.commit().await?;
        Ok(category.into())
    }

    async fn create_category(&self, data: &CreateCategory) -> AppResult<CategoryDto> {
        data.validate()?;

        let mut uow = self.repository.begin().await?;
        if uow.categories().name_exists(&data.category_name).await? {
            return Err(duplicate_category_name(&data.category_name));
        }
        let category = uow.categories().add(data, Utc::now()).await?;
        uow.commit().await?;

        tracing::info!(category_id = category.category_id, "Created category");
        Ok(category.into())
    }
}

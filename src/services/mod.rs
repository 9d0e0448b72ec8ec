//! Business logic services

pub mod categories;
pub mod equipment;
pub mod locations;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub categories: categories::CategoriesService,
    pub locations: locations::LocationsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            locations: locations::LocationsService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

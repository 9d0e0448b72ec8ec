//! Data models for the equipment inventory

pub mod category;
pub mod equipment;
pub mod location;
pub mod pagination;
pub mod response;

// Re-export commonly used types
pub use category::{Category, CategoryDto};
pub use equipment::{Equipment, EquipmentDetails, EquipmentDto, EquipmentStatus};
pub use location::{Location, LocationDto};
pub use pagination::PagedResult;
pub use response::ApiResponse;

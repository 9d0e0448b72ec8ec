//! Equipment model

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::pagination::SortDirection;

/// Operational status of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum EquipmentStatus {
    Active,
    InMaintenance,
    OutOfService,
    Retired,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Active,
        EquipmentStatus::InMaintenance,
        EquipmentStatus::OutOfService,
        EquipmentStatus::Retired,
    ];

    /// Name as stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "Active",
            EquipmentStatus::InMaintenance => "InMaintenance",
            EquipmentStatus::OutOfService => "OutOfService",
            EquipmentStatus::Retired => "Retired",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Status must be Active, InMaintenance, OutOfService, or Retired (got '{}')",
                    s
                )
            })
    }
}

// Stored as text so the column stays readable and sorts by name
impl sqlx::Type<Postgres> for EquipmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for EquipmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EquipmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Equipment row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Equipment {
    pub equipment_id: i32,
    pub equipment_name: String,
    pub serial_number: String,
    pub category_id: i32,
    pub location_id: i32,
    pub purchase_date: NaiveDate,
    pub status: EquipmentStatus,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Equipment row joined with its category and location display fields.
///
/// Display fields are empty strings when the referenced row is missing.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EquipmentDetails {
    #[sqlx(flatten)]
    pub equipment: Equipment,
    pub category_name: String,
    pub location_name: String,
    pub building: String,
    pub floor: String,
}

/// Values for a row about to be inserted
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub equipment_name: String,
    pub serial_number: String,
    pub category_id: i32,
    pub location_id: i32,
    pub purchase_date: NaiveDate,
    pub status: EquipmentStatus,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Equipment as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDto {
    #[serde(rename = "equipmentID")]
    pub equipment_id: i32,
    pub equipment_name: String,
    pub serial_number: String,
    #[serde(rename = "categoryID")]
    pub category_id: i32,
    pub category_name: String,
    #[serde(rename = "locationID")]
    pub location_id: i32,
    pub location_name: String,
    pub building: String,
    pub floor: String,
    pub purchase_date: NaiveDate,
    pub status: EquipmentStatus,
}

impl From<EquipmentDetails> for EquipmentDto {
    fn from(details: EquipmentDetails) -> Self {
        let EquipmentDetails {
            equipment,
            category_name,
            location_name,
            building,
            floor,
        } = details;
        Self {
            equipment_id: equipment.equipment_id,
            equipment_name: equipment.equipment_name,
            serial_number: equipment.serial_number,
            category_id: equipment.category_id,
            category_name,
            location_id: equipment.location_id,
            location_name,
            building,
            floor,
            purchase_date: equipment.purchase_date,
            status: equipment.status,
        }
    }
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 3, max = 200, message = "Equipment name must be between 3 and 200 characters"))]
    pub equipment_name: String,
    #[validate(length(min = 5, max = 100, message = "Serial number must be between 5 and 100 characters"))]
    pub serial_number: String,
    #[serde(rename = "categoryID", alias = "categoryId")]
    #[validate(range(min = 1, message = "Category ID must be a positive number"))]
    pub category_id: i32,
    #[serde(rename = "locationID", alias = "locationId")]
    #[validate(range(min = 1, message = "Location ID must be a positive number"))]
    pub location_id: i32,
    /// Must not be after today
    pub purchase_date: NaiveDate,
    pub status: EquipmentStatus,
}

/// Update equipment request; every mutable field is replaced
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    /// Must match the id in the request path
    #[serde(rename = "equipmentID", alias = "equipmentId")]
    pub equipment_id: i32,
    #[validate(length(min = 3, max = 200, message = "Equipment name must be between 3 and 200 characters"))]
    pub equipment_name: String,
    #[validate(length(min = 5, max = 100, message = "Serial number must be between 5 and 100 characters"))]
    pub serial_number: String,
    #[serde(rename = "categoryID", alias = "categoryId")]
    #[validate(range(min = 1, message = "Category ID must be a positive number"))]
    pub category_id: i32,
    #[serde(rename = "locationID", alias = "locationId")]
    #[validate(range(min = 1, message = "Location ID must be a positive number"))]
    pub location_id: i32,
    pub purchase_date: NaiveDate,
    pub status: EquipmentStatus,
}

/// Column the paged listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquipmentSortKey {
    #[default]
    EquipmentName,
    PurchaseDate,
    Status,
    CategoryName,
}

impl EquipmentSortKey {
    /// Case-insensitive match against the allowed keys; `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "equipmentname" => Some(EquipmentSortKey::EquipmentName),
            "purchasedate" => Some(EquipmentSortKey::PurchaseDate),
            "status" => Some(EquipmentSortKey::Status),
            "categoryname" => Some(EquipmentSortKey::CategoryName),
            _ => None,
        }
    }
}

/// Resolved ordering for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquipmentSort {
    pub key: EquipmentSortKey,
    pub direction: SortDirection,
}

impl EquipmentSort {
    /// Unknown keys fall back to name ascending, whatever direction was asked for.
    pub fn parse(sort_by: Option<&str>, sort_direction: Option<&str>) -> Self {
        match sort_by.and_then(EquipmentSortKey::parse) {
            Some(key) => Self {
                key,
                direction: SortDirection::parse(sort_direction),
            },
            None => Self::default(),
        }
    }
}

/// Predicate shared by the paged listing and the unpaged search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentFilter {
    pub search_term: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<EquipmentStatus>,
    /// Inclusive lower bound (unpaged search only)
    pub purchase_date_from: Option<NaiveDate>,
    /// Inclusive upper bound (unpaged search only)
    pub purchase_date_to: Option<NaiveDate>,
}

impl EquipmentFilter {
    /// Search term to apply; blank terms impose no restriction.
    pub fn search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }
}

/// Input of the paged listing query
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentPageQuery {
    pub filter: EquipmentFilter,
    pub page_number: i64,
    pub page_size: i64,
    pub sort: EquipmentSort,
}

fn default_page_number() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Treat missing and blank query values alike
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Query string of the listing and search endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EquipmentSearchQuery {
    /// Substring of the equipment name or serial number
    pub search_term: Option<String>,
    /// Exact category match
    #[serde(rename = "categoryID", alias = "categoryId", default, deserialize_with = "empty_as_none")]
    pub category_id: Option<i32>,
    /// Inclusive lower purchase date bound (search only)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub purchase_date_from: Option<NaiveDate>,
    /// Inclusive upper purchase date bound (search only)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub purchase_date_to: Option<NaiveDate>,
    /// Active, InMaintenance, OutOfService or Retired
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<EquipmentStatus>,
    /// Page number (default: 1)
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    /// Items per page, 1 to 100 (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// EquipmentName, PurchaseDate, Status or CategoryName
    pub sort_by: Option<String>,
    /// ASC or DESC
    pub sort_direction: Option<String>,
}

impl Default for EquipmentSearchQuery {
    fn default() -> Self {
        Self {
            search_term: None,
            category_id: None,
            purchase_date_from: None,
            purchase_date_to: None,
            status: None,
            page_number: default_page_number(),
            page_size: default_page_size(),
            sort_by: None,
            sort_direction: None,
        }
    }
}

impl EquipmentSearchQuery {
    pub fn filter(&self) -> EquipmentFilter {
        EquipmentFilter {
            search_term: self.search_term.clone(),
            category_id: self.category_id,
            status: self.status,
            purchase_date_from: self.purchase_date_from,
            purchase_date_to: self.purchase_date_to,
        }
    }

    /// Paged listing input; the date range does not apply to the listing.
    pub fn page_query(&self) -> EquipmentPageQuery {
        EquipmentPageQuery {
            filter: EquipmentFilter {
                purchase_date_from: None,
                purchase_date_to: None,
                ..self.filter()
            },
            page_number: self.page_number,
            page_size: self.page_size,
            sort: EquipmentSort::parse(self.sort_by.as_deref(), self.sort_direction.as_deref()),
        }
    }
}

//! In-process store
//!
//! Mirrors the PostgreSQL schema closely enough for the services to be
//! exercised without a database: generated ids, the unique constraints, the
//! foreign keys, and the left-join display fields. A unit of work holds the
//! store lock and edits a private copy of the tables, written back on commit.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    categories::duplicate_category_name, equipment::duplicate_serial_number,
    locations::duplicate_location, CategoryRepository, EquipmentRepository, LocationRepository,
    Store, UnitOfWork,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory},
        equipment::{
            Equipment, EquipmentDetails, EquipmentFilter, EquipmentPageQuery, EquipmentSort,
            EquipmentSortKey, NewEquipment,
        },
        location::{CreateLocation, Location},
        pagination::{page_offset, SortDirection},
    },
};

#[derive(Debug, Clone, Default)]
struct Tables {
    equipment: BTreeMap<i32, Equipment>,
    categories: BTreeMap<i32, Category>,
    locations: BTreeMap<i32, Location>,
    equipment_seq: i32,
    category_seq: i32,
    location_seq: i32,
}

impl Tables {
    fn details(&self, equipment: &Equipment) -> EquipmentDetails {
        let category = self.categories.get(&equipment.category_id);
        let location = self.locations.get(&equipment.location_id);
        EquipmentDetails {
            equipment: equipment.clone(),
            category_name: category.map(|c| c.category_name.clone()).unwrap_or_default(),
            location_name: location.map(|l| l.location_name.clone()).unwrap_or_default(),
            building: location.map(|l| l.building.clone()).unwrap_or_default(),
            floor: location.map(|l| l.floor.clone()).unwrap_or_default(),
        }
    }

    /// Matching rows in id order
    fn select(&self, filter: &EquipmentFilter) -> Vec<EquipmentDetails> {
        self.equipment
            .values()
            .filter(|e| matches(filter, e))
            .map(|e| self.details(e))
            .collect()
    }

    fn check_references(&self, category_id: i32, location_id: i32) -> AppResult<()> {
        if !self.categories.contains_key(&category_id) {
            return Err(AppError::Internal(format!(
                "foreign key violation: category {} does not exist",
                category_id
            )));
        }
        if !self.locations.contains_key(&location_id) {
            return Err(AppError::Internal(format!(
                "foreign key violation: location {} does not exist",
                location_id
            )));
        }
        Ok(())
    }

    fn serial_taken(&self, serial_number: &str, exclude_id: Option<i32>) -> bool {
        self.equipment
            .values()
            .any(|e| e.serial_number == serial_number && Some(e.equipment_id) != exclude_id)
    }
}

fn matches(filter: &EquipmentFilter, equipment: &Equipment) -> bool {
    if let Some(term) = filter.search_term() {
        let term = term.to_lowercase();
        if !equipment.equipment_name.to_lowercase().contains(&term)
            && !equipment.serial_number.to_lowercase().contains(&term)
        {
            return false;
        }
    }
    if filter.category_id.is_some_and(|id| id != equipment.category_id) {
        return false;
    }
    if filter.status.is_some_and(|status| status != equipment.status) {
        return false;
    }
    if filter.purchase_date_from.is_some_and(|from| equipment.purchase_date < from) {
        return false;
    }
    if filter.purchase_date_to.is_some_and(|to| equipment.purchase_date > to) {
        return false;
    }
    true
}

fn compare(sort: EquipmentSort, a: &EquipmentDetails, b: &EquipmentDetails) -> Ordering {
    let ordering = match sort.key {
        EquipmentSortKey::EquipmentName => a.equipment.equipment_name.cmp(&b.equipment.equipment_name),
        EquipmentSortKey::PurchaseDate => a.equipment.purchase_date.cmp(&b.equipment.purchase_date),
        EquipmentSortKey::Status => a.equipment.status.as_str().cmp(b.equipment.status.as_str()),
        EquipmentSortKey::CategoryName => a.category_name.cmp(&b.category_name),
    };
    let ordering = match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    };
    ordering.then(a.equipment.equipment_id.cmp(&b.equipment.equipment_id))
}

/// Store kept in process memory; clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `begin` and `ping` fail, as an unreachable database would
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(AppError::Internal("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.check_online()?;
        let guard = self.tables.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_online()
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn equipment(&mut self) -> &mut dyn EquipmentRepository {
        self
    }

    fn categories(&mut self) -> &mut dyn CategoryRepository {
        self
    }

    fn locations(&mut self) -> &mut dyn LocationRepository {
        self
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl EquipmentRepository for MemoryUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<EquipmentDetails>> {
        Ok(self.working.equipment.get(&id).map(|e| self.working.details(e)))
    }

    async fn get_paged(&mut self, query: &EquipmentPageQuery) -> AppResult<(Vec<EquipmentDetails>, i64)> {
        let mut rows = self.working.select(&query.filter);
        let total = rows.len() as i64;
        rows.sort_by(|a, b| compare(query.sort, a, b));
        let offset = usize::try_from(page_offset(query.page_number, query.page_size).max(0)).unwrap_or(usize::MAX);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(query.page_size.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn search(&mut self, filter: &EquipmentFilter) -> AppResult<Vec<EquipmentDetails>> {
        let mut rows = self.working.select(filter);
        rows.sort_by(|a, b| compare(EquipmentSort::default(), a, b));
        Ok(rows)
    }

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<EquipmentDetails>> {
        let filter = EquipmentFilter {
            category_id: Some(category_id),
            ..Default::default()
        };
        self.search(&filter).await
    }

    async fn serial_number_exists(&mut self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        Ok(self.working.serial_taken(serial_number, exclude_id))
    }

    async fn add(&mut self, data: &NewEquipment) -> AppResult<i32> {
        self.working.check_references(data.category_id, data.location_id)?;
        if self.working.serial_taken(&data.serial_number, None) {
            return Err(duplicate_serial_number(&data.serial_number));
        }
        self.working.equipment_seq += 1;
        let id = self.working.equipment_seq;
        self.working.equipment.insert(
            id,
            Equipment {
                equipment_id: id,
                equipment_name: data.equipment_name.clone(),
                serial_number: data.serial_number.clone(),
                category_id: data.category_id,
                location_id: data.location_id,
                purchase_date: data.purchase_date,
                status: data.status,
                created_date: data.created_date,
                modified_date: data.modified_date,
            },
        );
        Ok(id)
    }

    async fn update(&mut self, equipment: &Equipment) -> AppResult<bool> {
        if !self.working.equipment.contains_key(&equipment.equipment_id) {
            return Ok(false);
        }
        self.working.check_references(equipment.category_id, equipment.location_id)?;
        if self.working.serial_taken(&equipment.serial_number, Some(equipment.equipment_id)) {
            return Err(duplicate_serial_number(&equipment.serial_number));
        }
        if let Some(row) = self.working.equipment.get_mut(&equipment.equipment_id) {
            // created_date is never rewritten
            *row = Equipment {
                created_date: row.created_date,
                ..equipment.clone()
            };
        }
        Ok(true)
    }

    async fn delete(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.working.equipment.remove(&id).is_some())
    }
}

#[async_trait]
impl CategoryRepository for MemoryUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn get_all(&mut self) -> AppResult<Vec<Category>> {
        let mut rows: Vec<Category> = self.working.categories.values().cloned().collect();
        rows.sort_by(|a, b| a.category_name.cmp(&b.category_name).then(a.category_id.cmp(&b.category_id)));
        Ok(rows)
    }

    async fn name_exists(&mut self, name: &str) -> AppResult<bool> {
        Ok(self.working.categories.values().any(|c| c.category_name == name))
    }

    async fn add(&mut self, data: &CreateCategory, now: DateTime<Utc>) -> AppResult<Category> {
        if CategoryRepository::name_exists(self, &data.category_name).await? {
            return Err(duplicate_category_name(&data.category_name));
        }
        self.working.category_seq += 1;
        let category = Category {
            category_id: self.working.category_seq,
            category_name: data.category_name.clone(),
            description: data.description.clone(),
            created_date: now,
            modified_date: now,
        };
        self.working.categories.insert(category.category_id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl LocationRepository for MemoryUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Location>> {
        Ok(self.working.locations.get(&id).cloned())
    }

    async fn get_all(&mut self) -> AppResult<Vec<Location>> {
        let mut rows: Vec<Location> = self.working.locations.values().cloned().collect();
        rows.sort_by(|a, b| a.location_name.cmp(&b.location_name).then(a.location_id.cmp(&b.location_id)));
        Ok(rows)
    }

    async fn exists(&mut self, name: &str, building: &str, floor: &str) -> AppResult<bool> {
        Ok(self
            .working
            .locations
            .values()
            .any(|l| l.location_name == name && l.building == building && l.floor == floor))
    }

    async fn add(&mut self, data: &CreateLocation, now: DateTime<Utc>) -> AppResult<Location> {
        if LocationRepository::exists(self, &data.location_name, &data.building, &data.floor).await? {
            return Err(duplicate_location(data));
        }
        self.working.location_seq += 1;
        let location = Location {
            location_id: self.working.location_seq,
            location_name: data.location_name.clone(),
            building: data.building.clone(),
            floor: data.floor.clone(),
            created_date: now,
            modified_date: now,
        };
        self.working.locations.insert(location.location_id, location.clone());
        Ok(location)
    }
}

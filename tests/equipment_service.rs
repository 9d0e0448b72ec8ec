//! Service-level tests against the in-process store

use chrono::{Duration, NaiveDate, Utc};

use equipment_server::{
    error::ErrorKind,
    models::{
        category::CreateCategory,
        equipment::{
            CreateEquipment, EquipmentDto, EquipmentFilter, EquipmentPageQuery, EquipmentSort, EquipmentStatus,
            UpdateEquipment,
        },
        location::CreateLocation,
    },
    repository::{memory::MemoryStore, Repository},
    services::Services,
};

struct Fixture {
    services: Services,
    store: MemoryStore,
    category_id: i32,
    location_id: i32,
}

async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let services = Services::new(Repository::from_store(store.clone()));

    let category = services
        .categories
        .create(&CreateCategory {
            category_name: "Laptops".to_string(),
            description: Some("Portable computers".to_string()),
        })
        .await;
    let location = services
        .locations
        .create(&CreateLocation {
            location_name: "IT Storage".to_string(),
            building: "HQ".to_string(),
            floor: "B1".to_string(),
        })
        .await;

    Fixture {
        services,
        store,
        category_id: category.data.unwrap().category_id,
        location_id: location.data.unwrap().location_id,
    }
}

fn create_request(fx: &Fixture, name: &str, serial: &str) -> CreateEquipment {
    CreateEquipment {
        equipment_name: name.to_string(),
        serial_number: serial.to_string(),
        category_id: fx.category_id,
        location_id: fx.location_id,
        purchase_date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
        status: EquipmentStatus::Active,
    }
}

fn names(items: &[EquipmentDto]) -> Vec<String> {
    items.iter().map(|e| e.equipment_name.clone()).collect()
}

fn page(page_number: i64, page_size: i64) -> EquipmentPageQuery {
    EquipmentPageQuery {
        filter: EquipmentFilter::default(),
        page_number,
        page_size,
        sort: EquipmentSort::default(),
    }
}

async fn seed_many(fx: &Fixture, count: usize) {
    for i in 0..count {
        let response = fx
            .services
            .equipment
            .create(&create_request(fx, &format!("Laptop {:02}", i), &format!("SN-{:04}", i)))
            .await;
        assert!(response.success, "{:?}", response.errors);
    }
}

#[tokio::test]
async fn test_create_populates_display_fields() {
    let fx = fixture().await;

    let response = fx
        .services
        .equipment
        .create(&create_request(&fx, "Dell XPS", "DL-001"))
        .await;

    assert!(response.success);
    assert_eq!(response.message, "Equipment created successfully");
    let dto = response.data.unwrap();
    assert_eq!(dto.category_name, "Laptops");
    assert_eq!(dto.location_name, "IT Storage");
    assert_eq!(dto.building, "HQ");
    assert_eq!(dto.floor, "B1");
    assert_eq!(dto.status, EquipmentStatus::Active);
}

#[tokio::test]
async fn test_twenty_five_rows_make_three_pages() {
    let fx = fixture().await;
    seed_many(&fx, 25).await;

    let last = fx.services.equipment.get_all(&page(3, 10)).await.data.unwrap();
    assert_eq!(last.total_count, 25);
    assert_eq!(last.total_pages, 3);
    assert_eq!(last.items.len(), 5);
    assert!(!last.has_next_page);
    assert!(last.has_previous_page);

    let first = fx.services.equipment.get_all(&page(1, 10)).await.data.unwrap();
    assert_eq!(first.items.len(), 10);
    assert!(first.has_next_page);
    assert!(!first.has_previous_page);
    assert_eq!(first.items[0].equipment_name, "Laptop 00");
}

#[tokio::test]
async fn test_total_count_ignores_paging() {
    let fx = fixture().await;
    seed_many(&fx, 12).await;

    for (page_number, page_size) in [(1, 1), (2, 5), (3, 5), (1, 100), (7, 3)] {
        let result = fx
            .services
            .equipment
            .get_all(&page(page_number, page_size))
            .await
            .data
            .unwrap();
        assert_eq!(result.total_count, 12);
        assert!(result.items.len() as i64 <= page_size);
    }
}

#[tokio::test]
async fn test_page_bounds_are_validated() {
    let fx = fixture().await;

    let response = fx.services.equipment.get_all(&page(0, 10)).await;
    assert!(!response.success);
    assert_eq!(response.kind(), Some(ErrorKind::Validation));
    assert_eq!(response.message, "Page number must be greater than 0");
    assert_eq!(response.errors, vec!["Invalid page number"]);

    let response = fx.services.equipment.get_all(&page(1, 101)).await;
    assert_eq!(response.message, "Page size must be between 1 and 100");
    assert_eq!(response.errors, vec!["Invalid page size"]);
}

#[tokio::test]
async fn test_bogus_sort_key_matches_name_ascending() {
    let fx = fixture().await;
    for (name, serial) in [("Zebra printer", "ZP-001"), ("Apple iPad", "AI-001"), ("Monitor", "MN-001")] {
        fx.services.equipment.create(&create_request(&fx, name, serial)).await;
    }

    let with_sort = |sort_by: &str, direction: &str| EquipmentPageQuery {
        sort: EquipmentSort::parse(Some(sort_by), Some(direction)),
        ..page(1, 10)
    };
    let bogus = fx.services.equipment.get_all(&with_sort("bogus", "DESC")).await.data.unwrap();
    let by_name = fx
        .services
        .equipment
        .get_all(&with_sort("EquipmentName", "ASC"))
        .await
        .data
        .unwrap();

    assert_eq!(names(&bogus.items), names(&by_name.items));
    assert_eq!(names(&bogus.items), vec!["Apple iPad", "Monitor", "Zebra printer"]);

    let descending = fx
        .services
        .equipment
        .get_all(&with_sort("equipmentname", "desc"))
        .await
        .data
        .unwrap();
    assert_eq!(descending.items[0].equipment_name, "Zebra printer");
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let fx = fixture().await;
    seed_many(&fx, 3).await;

    let response = fx.services.equipment.get_all(&page(i64::MAX, 100)).await;

    assert!(response.success, "{:?}", response.errors);
    let result = response.data.unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 3);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.page_number, i64::MAX);
    assert!(result.has_previous_page);
    assert!(!result.has_next_page);
}

/// Four rows spread over two categories, with a shared purchase date on ids 3 and 4
async fn seed_sortable(fx: &Fixture) {
    let monitors = fx
        .services
        .categories
        .create(&CreateCategory {
            category_name: "Monitors".to_string(),
            description: None,
        })
        .await
        .data
        .unwrap()
        .category_id;

    let rows = [
        ("Alpha", "SRT-001", fx.category_id, (2021, 3, 1), EquipmentStatus::Retired),
        ("Bravo", "SRT-002", monitors, (2023, 6, 15), EquipmentStatus::Active),
        ("Charlie", "SRT-003", fx.category_id, (2022, 1, 20), EquipmentStatus::InMaintenance),
        ("Delta", "SRT-004", monitors, (2022, 1, 20), EquipmentStatus::OutOfService),
    ];
    for (name, serial, category_id, (y, m, d), status) in rows {
        let response = fx
            .services
            .equipment
            .create(&CreateEquipment {
                category_id,
                purchase_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                status,
                ..create_request(fx, name, serial)
            })
            .await;
        assert!(response.success, "{:?}", response.errors);
    }
}

async fn sorted_names(fx: &Fixture, sort_by: &str, direction: &str) -> Vec<String> {
    let query = EquipmentPageQuery {
        sort: EquipmentSort::parse(Some(sort_by), Some(direction)),
        ..page(1, 10)
    };
    names(&fx.services.equipment.get_all(&query).await.data.unwrap().items)
}

#[tokio::test]
async fn test_sort_by_purchase_date() {
    let fx = fixture().await;
    seed_sortable(&fx).await;

    // equal dates keep id order in both directions
    assert_eq!(
        sorted_names(&fx, "purchasedate", "ASC").await,
        vec!["Alpha", "Charlie", "Delta", "Bravo"]
    );
    assert_eq!(
        sorted_names(&fx, "PurchaseDate", "desc").await,
        vec!["Bravo", "Charlie", "Delta", "Alpha"]
    );
}

#[tokio::test]
async fn test_sort_by_status() {
    let fx = fixture().await;
    seed_sortable(&fx).await;

    assert_eq!(
        sorted_names(&fx, "status", "asc").await,
        vec!["Bravo", "Charlie", "Delta", "Alpha"]
    );
    assert_eq!(
        sorted_names(&fx, "STATUS", "Desc").await,
        vec!["Alpha", "Delta", "Charlie", "Bravo"]
    );
}

#[tokio::test]
async fn test_sort_by_category_name() {
    let fx = fixture().await;
    seed_sortable(&fx).await;

    // two rows per category, so each pair falls back to id order
    assert_eq!(
        sorted_names(&fx, "CategoryName", "ASC").await,
        vec!["Alpha", "Charlie", "Bravo", "Delta"]
    );
    assert_eq!(
        sorted_names(&fx, "categoryname", "DESC").await,
        vec!["Bravo", "Delta", "Alpha", "Charlie"]
    );
}

#[tokio::test]
async fn test_equal_names_come_back_in_id_order() {
    let fx = fixture().await;
    for serial in ["TWIN-003", "TWIN-001", "TWIN-002"] {
        fx.services.equipment.create(&create_request(&fx, "Twin", serial)).await;
    }

    for direction in ["ASC", "DESC"] {
        let query = EquipmentPageQuery {
            sort: EquipmentSort::parse(Some("equipmentname"), Some(direction)),
            ..page(1, 10)
        };
        let items = fx.services.equipment.get_all(&query).await.data.unwrap().items;
        let ids: Vec<i32> = items.iter().map(|e| e.equipment_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(items[0].serial_number, "TWIN-003");
    }
}

#[tokio::test]
async fn test_filters_combine() {
    let fx = fixture().await;
    fx.services.equipment.create(&create_request(&fx, "Dell XPS 13", "DL-001")).await;
    fx.services.equipment.create(&create_request(&fx, "Dell Latitude", "DL-002")).await;
    fx.services
        .equipment
        .create(&CreateEquipment {
            status: EquipmentStatus::Retired,
            ..create_request(&fx, "Lenovo ThinkPad", "LN-XPS-9")
        })
        .await;

    let query = |term: &str, status: Option<EquipmentStatus>| EquipmentPageQuery {
        filter: EquipmentFilter {
            search_term: Some(term.to_string()),
            status,
            ..Default::default()
        },
        ..page(1, 10)
    };

    // name or serial
    let xps = fx.services.equipment.get_all(&query("xps", None)).await.data.unwrap();
    assert_eq!(xps.total_count, 2);

    let retired = fx
        .services
        .equipment
        .get_all(&query("xps", Some(EquipmentStatus::Retired)))
        .await
        .data
        .unwrap();
    assert_eq!(retired.total_count, 1);
    assert_eq!(retired.items[0].serial_number, "LN-XPS-9");

    let blank = fx.services.equipment.get_all(&query("   ", None)).await.data.unwrap();
    assert_eq!(blank.total_count, 3);
}

#[tokio::test]
async fn test_duplicate_serial_persists_nothing() {
    let fx = fixture().await;
    assert!(fx.services.equipment.create(&create_request(&fx, "Dell XPS", "DL-001")).await.success);

    let response = fx
        .services
        .equipment
        .create(&create_request(&fx, "Another laptop", "DL-001"))
        .await;
    assert!(!response.success);
    assert_eq!(response.kind(), Some(ErrorKind::BusinessRule));
    assert_eq!(response.message, "Serial number already exists");
    assert_eq!(
        response.errors,
        vec!["Equipment with serial number 'DL-001' already exists"]
    );

    let all = fx.services.equipment.get_all(&page(1, 10)).await.data.unwrap();
    assert_eq!(all.total_count, 1);

    // exact match only
    assert!(fx.services.equipment.create(&create_request(&fx, "Lowercase", "dl-001")).await.success);
}

#[tokio::test]
async fn test_unknown_references_are_business_errors() {
    let fx = fixture().await;

    let response = fx
        .services
        .equipment
        .create(&CreateEquipment {
            category_id: 99,
            ..create_request(&fx, "Dell XPS", "DL-001")
        })
        .await;
    assert_eq!(response.kind(), Some(ErrorKind::BusinessRule));
    assert_eq!(response.message, "Invalid category");
    assert_eq!(response.errors, vec!["Category with ID 99 does not exist"]);

    let response = fx
        .services
        .equipment
        .create(&CreateEquipment {
            location_id: 42,
            ..create_request(&fx, "Dell XPS", "DL-001")
        })
        .await;
    assert_eq!(response.message, "Invalid location");
    assert_eq!(response.errors, vec!["Location with ID 42 does not exist"]);
}

#[tokio::test]
async fn test_future_purchase_date_is_rejected() {
    let fx = fixture().await;
    let tomorrow = Utc::now().date_naive() + Duration::days(1);

    let response = fx
        .services
        .equipment
        .create(&CreateEquipment {
            purchase_date: tomorrow,
            ..create_request(&fx, "Dell XPS", "DL-001")
        })
        .await;
    assert_eq!(response.kind(), Some(ErrorKind::Validation));
    assert_eq!(response.message, "Purchase date cannot be in the future");

    let created = fx
        .services
        .equipment
        .create(&create_request(&fx, "Dell XPS", "DL-001"))
        .await
        .data
        .unwrap();
    let response = fx
        .services
        .equipment
        .update(
            created.equipment_id,
            &UpdateEquipment {
                equipment_id: created.equipment_id,
                equipment_name: created.equipment_name.clone(),
                serial_number: created.serial_number.clone(),
                category_id: created.category_id,
                location_id: created.location_id,
                purchase_date: tomorrow,
                status: created.status,
            },
        )
        .await;
    assert_eq!(response.kind(), Some(ErrorKind::Validation));
}

#[tokio::test]
async fn test_update_keeps_own_serial() {
    let fx = fixture().await;
    let created = fx
        .services
        .equipment
        .create(&create_request(&fx, "Dell XPS", "DL-001"))
        .await
        .data
        .unwrap();

    let response = fx
        .services
        .equipment
        .update(
            created.equipment_id,
            &UpdateEquipment {
                equipment_id: created.equipment_id,
                equipment_name: "Dell XPS 15".to_string(),
                serial_number: "DL-001".to_string(),
                category_id: fx.category_id,
                location_id: fx.location_id,
                purchase_date: created.purchase_date,
                status: EquipmentStatus::InMaintenance,
            },
        )
        .await;

    assert!(response.success, "{:?}", response.errors);
    assert_eq!(response.message, "Equipment updated successfully");
    let dto = response.data.unwrap();
    assert_eq!(dto.equipment_name, "Dell XPS 15");
    assert_eq!(dto.status, EquipmentStatus::InMaintenance);
}

#[tokio::test]
async fn test_update_to_taken_serial_fails() {
    let fx = fixture().await;
    fx.services.equipment.create(&create_request(&fx, "Dell XPS", "DL-001")).await;
    let second = fx
        .services
        .equipment
        .create(&create_request(&fx, "Dell Latitude", "DL-002"))
        .await
        .data
        .unwrap();

    let response = fx
        .services
        .equipment
        .update(
            second.equipment_id,
            &UpdateEquipment {
                equipment_id: second.equipment_id,
                equipment_name: second.equipment_name.clone(),
                serial_number: "DL-001".to_string(),
                category_id: second.category_id,
                location_id: second.location_id,
                purchase_date: second.purchase_date,
                status: second.status,
            },
        )
        .await;
    assert_eq!(response.kind(), Some(ErrorKind::BusinessRule));

    let unchanged = fx.services.equipment.get_by_id(second.equipment_id).await.data.unwrap();
    assert_eq!(unchanged.serial_number, "DL-002");
}

#[tokio::test]
async fn test_update_id_mismatch_and_missing() {
    let fx = fixture().await;
    let request = UpdateEquipment {
        equipment_id: 5,
        equipment_name: "Dell XPS".to_string(),
        serial_number: "DL-001".to_string(),
        category_id: fx.category_id,
        location_id: fx.location_id,
        purchase_date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
        status: EquipmentStatus::Active,
    };

    let response = fx.services.equipment.update(4, &request).await;
    assert_eq!(response.kind(), Some(ErrorKind::Validation));
    assert_eq!(response.message, "Equipment ID mismatch");

    let response = fx.services.equipment.update(5, &request).await;
    assert_eq!(response.kind(), Some(ErrorKind::NotFound));
    assert_eq!(response.message, "Equipment with ID 5 not found");
}

#[tokio::test]
async fn test_delete() {
    let fx = fixture().await;
    let created = fx
        .services
        .equipment
        .create(&create_request(&fx, "Dell XPS", "DL-001"))
        .await
        .data
        .unwrap();

    let response = fx.services.equipment.delete(created.equipment_id).await;
    assert!(response.success);
    assert_eq!(response.data, Some(true));
    assert_eq!(response.message, "Equipment deleted successfully");

    let response = fx.services.equipment.delete(created.equipment_id).await;
    assert!(!response.success);
    assert_eq!(response.kind(), Some(ErrorKind::NotFound));
    assert_eq!(response.errors, vec!["Equipment not found"]);

    let response = fx.services.equipment.get_by_id(created.equipment_id).await;
    assert_eq!(response.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_search_by_date_range() {
    let fx = fixture().await;
    for (serial, date) in [("OLD-001", (2020, 3, 1)), ("MID-001", (2022, 7, 1)), ("NEW-001", (2024, 1, 5))] {
        fx.services
            .equipment
            .create(&CreateEquipment {
                purchase_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                ..create_request(&fx, &format!("Unit {}", serial), serial)
            })
            .await;
    }

    let filter = EquipmentFilter {
        purchase_date_from: NaiveDate::from_ymd_opt(2022, 7, 1),
        purchase_date_to: NaiveDate::from_ymd_opt(2024, 1, 5),
        ..Default::default()
    };
    let found = fx.services.equipment.search(&filter).await.data.unwrap();
    let serials: Vec<_> = found.iter().map(|e| e.serial_number.as_str()).collect();
    assert_eq!(serials, vec!["MID-001", "NEW-001"]);

    let inverted = EquipmentFilter {
        purchase_date_from: filter.purchase_date_to,
        purchase_date_to: filter.purchase_date_from,
        ..Default::default()
    };
    let response = fx.services.equipment.search(&inverted).await;
    assert_eq!(response.kind(), Some(ErrorKind::Validation));
    assert_eq!(response.message, "Purchase date 'from' cannot be after 'to'");
    assert_eq!(response.errors, vec!["Invalid date range"]);
}

#[tokio::test]
async fn test_by_category() {
    let fx = fixture().await;
    fx.services.equipment.create(&create_request(&fx, "Dell XPS", "DL-001")).await;

    let found = fx.services.equipment.get_by_category(fx.category_id).await.data.unwrap();
    assert_eq!(found.len(), 1);

    let response = fx.services.equipment.get_by_category(77).await;
    assert_eq!(response.kind(), Some(ErrorKind::NotFound));
    assert_eq!(response.message, "Category with ID 77 not found");
    assert_eq!(response.errors, vec!["Category not found"]);
}

#[tokio::test]
async fn test_store_failure_is_generic() {
    let fx = fixture().await;
    fx.store.set_offline(true);

    let response = fx.services.equipment.get_all(&page(1, 10)).await;
    assert!(!response.success);
    assert_eq!(response.kind(), Some(ErrorKind::Internal));
    assert_eq!(response.message, "An error occurred while fetching equipment");
    assert_eq!(response.errors, vec!["Internal server error"]);
    assert!(fx.services.ping().await.is_err());
}

#[tokio::test]
async fn test_categories_and_locations() {
    let fx = fixture().await;

    let duplicate = fx
        .services
        .categories
        .create(&CreateCategory {
            category_name: "Laptops".to_string(),
            description: None,
        })
        .await;
    assert_eq!(duplicate.kind(), Some(ErrorKind::BusinessRule));
    assert_eq!(duplicate.message, "Category name already exists");

    fx.services
        .categories
        .create(&CreateCategory {
            category_name: "Audio".to_string(),
            description: None,
        })
        .await;
    let names: Vec<_> = fx
        .services
        .categories
        .get_all()
        .await
        .data
        .unwrap()
        .into_iter()
        .map(|c| c.category_name)
        .collect();
    assert_eq!(names, vec!["Audio", "Laptops"]);

    let same_name_other_floor = fx
        .services
        .locations
        .create(&CreateLocation {
            location_name: "IT Storage".to_string(),
            building: "HQ".to_string(),
            floor: "2".to_string(),
        })
        .await;
    assert!(same_name_other_floor.success);

    let missing = fx.services.locations.get_by_id(500).await;
    assert_eq!(missing.kind(), Some(ErrorKind::NotFound));
    assert_eq!(fx.services.locations.get_all().await.data.unwrap().len(), 2);
}

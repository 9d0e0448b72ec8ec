//! API integration tests against a running server and database

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Serial numbers must be unique across runs against the same database
fn unique_serial(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Helper to get the first category and location ids, creating them if missing
async fn reference_ids(client: &Client) -> (i64, i64) {
    let categories: Value = client
        .get(format!("{}/categories", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let category_id = match categories["data"][0]["categoryID"].as_i64() {
        Some(id) => id,
        None => {
            let created: Value = client
                .post(format!("{}/categories", BASE_URL))
                .json(&json!({ "categoryName": "Laptops" }))
                .send()
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse response");
            created["data"]["categoryID"].as_i64().expect("No category id")
        }
    };

    let locations: Value = client
        .get(format!("{}/locations", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let location_id = match locations["data"][0]["locationID"].as_i64() {
        Some(id) => id,
        None => {
            let created: Value = client
                .post(format!("{}/locations", BASE_URL))
                .json(&json!({ "locationName": "IT Storage", "building": "HQ", "floor": "B1" }))
                .send()
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse response");
            created["data"]["locationID"].as_i64().expect("No location id")
        }
    };

    (category_id, location_id)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_with_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_equipment_lifecycle() {
    let client = Client::new();
    let (category_id, location_id) = reference_ids(&client).await;
    let serial = unique_serial("IT");

    let response = client
        .post(format!("{}/equipments", BASE_URL))
        .json(&json!({
            "equipmentName": "Integration laptop",
            "serialNumber": serial,
            "categoryID": category_id,
            "locationID": location_id,
            "purchaseDate": "2023-06-15",
            "status": "Active"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    assert!(response.headers().get("location").is_some());

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["data"]["equipmentID"].as_i64().expect("No equipment id");

    let response = client
        .get(format!("{}/equipments?searchTerm={}", BASE_URL, serial))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["totalCount"], 1);

    let response = client
        .put(format!("{}/equipments/{}", BASE_URL, id))
        .json(&json!({
            "equipmentID": id,
            "equipmentName": "Integration laptop",
            "serialNumber": serial,
            "categoryID": category_id,
            "locationID": location_id,
            "purchaseDate": "2023-06-15",
            "status": "Retired"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/equipments/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/equipments/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_serial_rejected() {
    let client = Client::new();
    let (category_id, location_id) = reference_ids(&client).await;
    let body = json!({
        "equipmentName": "Duplicate check",
        "serialNumber": unique_serial("DUP"),
        "categoryID": category_id,
        "locationID": location_id,
        "purchaseDate": "2022-01-01",
        "status": "Active"
    });

    let first = client
        .post(format!("{}/equipments", BASE_URL))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/equipments", BASE_URL))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 400);

    let envelope: Value = second.json().await.expect("Failed to parse response");
    assert_eq!(envelope["message"], "Serial number already exists");
}

#[tokio::test]
#[ignore]
async fn test_invalid_page_size() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipments?pageSize=101", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

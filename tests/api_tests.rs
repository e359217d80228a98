//! API integration tests.
//!
//! These run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Register a throwaway user and return its bearer token
async fn get_auth_token(client: &Client) -> String {
    let suffix = unique_suffix();
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": format!("test-{}@example.org", suffix),
            "password": "testpass123",
            "password_confirmation": "testpass123"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    let body: Value = response.json().await.expect("Failed to parse register response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book with the given stock and return its id
async fn create_book(client: &Client, token: &str, stock: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author": "Test Author",
            "isbn": format!("isbn-{}", unique_suffix()),
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["book"]["id"].as_i64().expect("No book ID")
}

async fn get_book(client: &Client, token: &str, id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send get book request");

    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

/// Borrow a book, returning the raw response
async fn borrow_book(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "borrow_date": "2026-01-01T00:00:00Z",
            "due_date": "2026-01-15T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
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
async fn test_readiness_check_probes_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_register_and_me() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Test User");
    assert!(body["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.org",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_book_starts_fully_available() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 5).await;
    let book = get_book(&client, &token, book_id).await;

    assert_eq!(book["stock"], 5);
    assert_eq!(book["available"], 5);
    assert!(book["borrowings"].as_array().expect("no borrowings array").is_empty());
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_duplicate_isbn() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let isbn = format!("isbn-{}", unique_suffix());
    let payload = json!({
        "title": "Test Book",
        "author": "Test Author",
        "isbn": isbn,
        "stock": 1
    });

    let first = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_borrow_until_exhausted_then_return() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 5).await;

    // Borrow all five copies
    let mut last_borrowing_id = 0;
    for expected_remaining in (0..5).rev() {
        let response = borrow_book(&client, &token, book_id).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse response");
        last_borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

        let book = get_book(&client, &token, book_id).await;
        assert_eq!(book["available"], expected_remaining);
    }

    // Sixth borrow fails with no mutation
    let response = borrow_book(&client, &token, book_id).await;
    assert_eq!(response.status(), 400);
    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 0);

    // Return one copy
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, last_borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowing"]["status"], "returned");
    assert!(!body["borrowing"]["return_date"].is_null());

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_double_return_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 1).await;

    let response = borrow_book(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

    let first = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(first.status().is_success());

    let second = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(second.status(), 400);

    // Availability unchanged by the rejected second return
    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_delete_active_borrowing_restores_availability() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 2).await;

    let response = borrow_book(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 1);

    let response = client
        .delete(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert!(response.status().is_success());

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_delete_returned_borrowing_keeps_availability() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 1).await;

    let response = borrow_book(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

    client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");

    let response = client
        .delete(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert!(response.status().is_success());

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_stock_edit_recomputes_availability() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 3).await;

    // Two active borrowings
    borrow_book(&client, &token, book_id).await;
    borrow_book(&client, &token, book_id).await;

    // Raise stock: available = 10 - 2
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "stock": 10 }))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["available"], 8);

    // Cut stock below the active count: floored at zero
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "stock": 1 }))
        .send()
        .await
        .expect("Failed to send update request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_blocked_by_active_borrowing() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 3).await;

    let response = borrow_book(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

    // Delete is rejected while the borrowing is active
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 400);

    // After the return, the delete goes through
    client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert!(response.status().is_success());

    // The returned borrowing row goes with the book
    let response = client
        .get(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send get request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrowing_rejects_bad_dates() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 1).await;

    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "borrow_date": "2026-01-15T00:00:00Z",
            "due_date": "2026-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 422);

    // No copy was consumed
    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_overdue_label_does_not_touch_availability() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, 1).await;

    let response = borrow_book(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().expect("No borrowing ID");

    let response = client
        .put(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "overdue" }))
        .send()
        .await
        .expect("Failed to send update request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowing"]["status"], "overdue");

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_dashboard_stats_shape() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/dashboard/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["stats"]["total_books"].is_number());
    assert!(body["stats"]["total_users"].is_number());
    assert!(body["stats"]["active_borrowings"].is_number());
    assert!(body["stats"]["total_borrowings"].is_number());
    assert!(body["recent_borrowings"].is_array());
    assert!(body["popular_books"].is_array());
    assert!(body["recent_borrowings"].as_array().map(|a| a.len() <= 5).unwrap_or(false));
    assert!(body["popular_books"].as_array().map(|a| a.len() <= 5).unwrap_or(false));
}

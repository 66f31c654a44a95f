//! Error envelope shape, request validation and health endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::json;

use shoplist_integration_tests::{AWID, TestApp, error_key};

#[tokio::test]
async fn test_validation_reports_every_field() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .user("alex")
        .post("shopping-list/create", json!({ "name": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(error_key(&body), "shoppingList/create/validationError");

    let entry = &body["uuAppErrorMap"]["shoppingList/create/validationError"];
    let fields: Vec<&str> = entry["paramMap"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"awid"));
    assert!(fields.contains(&"name"));
}

#[tokio::test]
async fn test_overlong_name_rejected() {
    let app = TestApp::spawn().await;
    let name = "x".repeat(101);

    let (status, body) = app
        .user("alex")
        .post("shopping-list/create", json!({ "awid": AWID, "name": name }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingList/create/validationError");
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .user("alex")
        .post_raw("shopping-list/create", "{\"awid\": ")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingList/create/validationError");
}

#[tokio::test]
async fn test_bad_query_values() {
    let app = TestApp::spawn().await;
    let alex = app.user("alex");

    let (status, body) = alex
        .get(&format!("shopping-list/get?awid={AWID}&id=not-a-uuid"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingList/get/validationError");

    let (status, body) = alex
        .get(&format!("shopping-list/list?awid={AWID}&filter=deleted"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingList/list/validationError");
}

#[tokio::test]
async fn test_item_quantity_must_be_positive() {
    let app = TestApp::spawn().await;
    let alex = app.user("alex");
    let list_id = alex.create_list("Groceries").await;

    let (status, body) = alex
        .post(
            "shopping-list-item/create",
            json!({
                "awid": AWID,
                "shoppingListId": list_id,
                "name": "Eggs",
                "quantity": 0,
                "measure": "pcs",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingListItem/create/validationError");
}

#[tokio::test]
async fn test_unknown_list_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .user("alex")
        .post(
            "shopping-list/archive",
            json!({ "awid": AWID, "id": "6f1c1f0e-8a53-4d1e-9a55-2d0c7d3f0b11" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_key(&body), "shoppingList/archive/listNotFound");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    let live = app.get_raw("/health").await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "ok");

    let ready = app.get_raw("/health/ready").await;
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let app = TestApp::spawn().await;

    let response = app.get_raw("/health").await;
    let request_id = response.headers().get("x-request-id");
    assert!(request_id.is_some_and(|v| !v.is_empty()));
}

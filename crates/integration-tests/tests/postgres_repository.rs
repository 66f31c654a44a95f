//! The list API over a real `PostgreSQL` database.
//!
//! These tests require a database reachable at `SHOPLIST_TEST_DATABASE_URL`.
//! Migrations are applied on startup.
//!
//! Run with: cargo test -p shoplist-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;

use shoplist_api::db::{PgListRepository, create_pool};
use shoplist_integration_tests::{AWID, TestApp};

async fn postgres_app() -> TestApp {
    let url = std::env::var("SHOPLIST_TEST_DATABASE_URL")
        .expect("SHOPLIST_TEST_DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../api/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    TestApp::spawn_with(Arc::new(PgListRepository::new(pool))).await
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_list_round_trips_through_postgres() {
    let app = postgres_app().await;
    let owner = format!("pg-owner-{}", std::process::id());
    let alex = app.user(&owner);

    let list_id = alex.create_list("Groceries").await;
    let (status, _) = alex
        .post(
            "shopping-list-item/create",
            json!({
                "awid": AWID,
                "shoppingListId": list_id,
                "name": "Bread",
                "quantity": 1,
                "measure": "loaf",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = alex
        .get(&format!("shopping-list/get?awid={AWID}&id={list_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"][0]["name"], "Bread");
    assert_eq!(list["ownerUuIdentity"], owner.as_str());

    let (_, page) = alex.get(&format!("shopping-list/list?awid={AWID}")).await;
    assert!(page["pageInfo"]["total"].as_u64().unwrap() >= 1);

    let (status, _) = alex
        .post("shopping-list/delete", json!({ "awid": AWID, "id": list_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_readiness_checks_database() {
    let app = postgres_app().await;

    let ready = app.get_raw("/health/ready").await;
    assert_eq!(ready.status(), StatusCode::OK);
}

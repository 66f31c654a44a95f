//! Access gate behavior as seen by HTTP clients.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::json;

use shoplist_integration_tests::{AWID, TestApp, error_key};

#[tokio::test]
async fn test_missing_identity_is_unauthenticated() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .anonymous()
        .post(
            "shopping-list/create",
            json!({ "awid": AWID, "name": "Groceries" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(error_key(&body), "shoppingList/create/authenticationError");
}

#[tokio::test]
async fn test_invalid_body_is_reported_before_authentication() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .anonymous()
        .post("shopping-list/create", json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingList/create/validationError");

    let (status, body) = app
        .anonymous()
        .post("shopping-list-member/leave", json!({ "awid": AWID }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingListMember/leave/validationError");
}

#[tokio::test]
async fn test_unauthenticated_wins_over_missing_list() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .anonymous()
        .post(
            "shopping-list/archive",
            json!({ "awid": AWID, "id": "6f1c1f0e-8a53-4d1e-9a55-2d0c7d3f0b11" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_key(&body), "shoppingList/archive/authenticationError");
}

#[tokio::test]
async fn test_identity_without_profile_is_unauthorized() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .without_profile("alex")
        .get(&format!("shopping-list/list?awid={AWID}"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_key(&body), "shoppingList/list/authorizationError");
}

#[tokio::test]
async fn test_member_cannot_run_owner_commands() {
    let app = TestApp::spawn().await;
    let alex = app.user("alex");
    let kate = app.user("kate");
    let list_id = alex.create_list("Groceries").await;
    alex.post(
        "shopping-list-member/addMember",
        json!({ "awid": AWID, "id": list_id, "memberUuIdentity": "kate" }),
    )
    .await;

    let (status, body) = kate
        .post(
            "shopping-list/archive",
            json!({ "awid": AWID, "id": list_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_key(&body), "shoppingList/archive/accessDenied");

    for (command, body) in [
        ("shopping-list/update", json!({ "awid": AWID, "id": list_id, "name": "Mine" })),
        ("shopping-list/delete", json!({ "awid": AWID, "id": list_id })),
        (
            "shopping-list-member/addMember",
            json!({ "awid": AWID, "id": list_id, "memberUuIdentity": "ben" }),
        ),
    ] {
        let (status, _) = kate.post(command, body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{command}");
    }

    // The list is untouched.
    let (_, list) = alex
        .get(&format!("shopping-list/get?awid={AWID}&id={list_id}"))
        .await;
    assert_eq!(list["state"], "active");
    assert_eq!(list["name"], "Groceries");
    assert_eq!(list["memberCount"], 2);
}

#[tokio::test]
async fn test_stranger_cannot_touch_items() {
    let app = TestApp::spawn().await;
    let alex = app.user("alex");
    let list_id = alex.create_list("Groceries").await;

    let (status, body) = app
        .user("mallory")
        .post(
            "shopping-list-item/create",
            json!({
                "awid": AWID,
                "shoppingListId": list_id,
                "name": "Candy",
                "quantity": 1,
                "measure": "pcs",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_key(&body), "shoppingListItem/create/notMember");
}

#[tokio::test]
async fn test_membership_conflicts() {
    let app = TestApp::spawn().await;
    let alex = app.user("alex");
    let list_id = alex.create_list("Groceries").await;
    let add_kate = json!({ "awid": AWID, "id": list_id, "memberUuIdentity": "kate" });

    let (status, _) = alex
        .post("shopping-list-member/addMember", add_kate.clone())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = alex
        .post("shopping-list-member/addMember", add_kate)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_key(&body), "shoppingListMember/addMember/memberExists");

    let (status, body) = alex
        .post(
            "shopping-list-member/removeMember",
            json!({ "awid": AWID, "id": list_id, "memberUuIdentity": "alex" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_key(&body),
        "shoppingListMember/removeMember/cannotRemoveOwner"
    );

    let (status, body) = alex
        .post(
            "shopping-list-member/leave",
            json!({ "awid": AWID, "id": list_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_key(&body), "shoppingListMember/leave/ownerCannotLeave");

    let (status, members) = alex
        .post(
            "shopping-list-member/removeMember",
            json!({ "awid": AWID, "id": list_id, "memberUuIdentity": "kate" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members["memberCount"], 1);
}

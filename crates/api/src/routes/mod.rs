//! HTTP route handlers for the list API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (repository)
//!
//! # Lists
//! POST /api/shopping-list/create                - Create a list
//! GET  /api/shopping-list/get                   - Load one list
//! GET  /api/shopping-list/list                  - Caller's lists, paged
//! POST /api/shopping-list/update                - Rename (owner)
//! POST /api/shopping-list/delete                - Delete (owner)
//! POST /api/shopping-list/archive               - Archive (owner)
//! POST /api/shopping-list/unarchive             - Unarchive (owner)
//!
//! # Members
//! POST /api/shopping-list-member/addMember      - Add a member (owner)
//! POST /api/shopping-list-member/removeMember   - Remove a member (owner)
//! POST /api/shopping-list-member/leave          - Leave a list (member)
//!
//! # Items (owner or member)
//! POST /api/shopping-list-item/create
//! POST /api/shopping-list-item/update
//! POST /api/shopping-list-item/delete
//! POST /api/shopping-list-item/toggleResolved
//! ```

pub mod dto;
pub mod shopping_list;
pub mod shopping_list_item;
pub mod shopping_list_member;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use shoplist_core::{Caller, Denial, access};

use crate::state::AppState;

/// Authentication and profile check, run once the input is valid and before
/// any list is loaded.
fn admitted(caller: &Caller) -> Result<(), Denial> {
    access::admit(caller).map(|_| ())
}

/// Create the list routes router.
pub fn shopping_list_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(shopping_list::create))
        .route("/get", get(shopping_list::get))
        .route("/list", get(shopping_list::list))
        .route("/update", post(shopping_list::update))
        .route("/delete", post(shopping_list::delete))
        .route("/archive", post(shopping_list::archive))
        .route("/unarchive", post(shopping_list::unarchive))
}

/// Create the membership routes router.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/addMember", post(shopping_list_member::add_member))
        .route("/removeMember", post(shopping_list_member::remove_member))
        .route("/leave", post(shopping_list_member::leave))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(shopping_list_item::create))
        .route("/update", post(shopping_list_item::update))
        .route("/delete", post(shopping_list_item::delete))
        .route("/toggleResolved", post(shopping_list_item::toggle_resolved))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/shopping-list", shopping_list_routes())
        .nest("/api/shopping-list-member", member_routes())
        .nest("/api/shopping-list-item", item_routes())
}

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the repository is not reachable or
/// does not answer within the request deadline.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

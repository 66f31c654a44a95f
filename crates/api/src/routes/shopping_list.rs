//! `/api/shopping-list/*` commands.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::admitted;
use super::dto::{
    CreateListRequest, Deleted, Envelope, GetListQuery, ListListsQuery, ListPage, ListRefRequest,
    ListView, RenameListRequest,
};
use crate::error::{Result, ResultExt};
use crate::middleware::CurrentCaller;
use crate::state::AppState;

/// Create a list owned by the caller.
///
/// POST /api/shopping-list/create
///
/// # Errors
///
/// Returns `ApiError` for invalid input or an unauthenticated caller.
pub async fn create(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<CreateListRequest>, JsonRejection>,
) -> Result<Json<Envelope<ListView>>> {
    const COMMAND: &str = "shoppingList/create";
    let Json(body) = body.during(COMMAND)?;
    let (awid, name) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .create(&caller, &awid, name)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ListView::from(&list))))
}

/// Load one list.
///
/// GET /api/shopping-list/get?awid&id
///
/// # Errors
///
/// Returns `ApiError` if the list is missing or the caller is not a member.
pub async fn get(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    query: std::result::Result<Query<GetListQuery>, QueryRejection>,
) -> Result<Json<Envelope<ListView>>> {
    const COMMAND: &str = "shoppingList/get";
    let Query(query) = query.during(COMMAND)?;
    let (awid, id) = ListRefRequest::from(query).validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .get(&caller, &awid, id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ListView::from(&list))))
}

/// Lists the caller owns or is a member of.
///
/// GET /api/shopping-list/list?awid&filter&pageIndex&pageSize
///
/// # Errors
///
/// Returns `ApiError` for invalid input or an unauthenticated caller.
pub async fn list(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    query: std::result::Result<Query<ListListsQuery>, QueryRejection>,
) -> Result<Json<Envelope<ListPage>>> {
    const COMMAND: &str = "shoppingList/list";
    let Query(query) = query.during(COMMAND)?;
    let command = query.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let store = state.store();
    let page = store.page_request(command.page_index, command.page_size);
    let lists = store
        .list(&caller, &command.awid, command.state, page)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(command.awid, ListPage::from(lists))))
}

/// Rename a list.
///
/// POST /api/shopping-list/update
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or a non-owner.
pub async fn update(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<RenameListRequest>, JsonRejection>,
) -> Result<Json<Envelope<ListView>>> {
    const COMMAND: &str = "shoppingList/update";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id, name) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .rename(&caller, &awid, id, name)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ListView::from(&list))))
}

/// Delete a list permanently.
///
/// POST /api/shopping-list/delete
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or a non-owner.
pub async fn delete(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ListRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<Deleted>>> {
    const COMMAND: &str = "shoppingList/delete";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    state
        .store()
        .delete(&caller, &awid, id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, Deleted { id, deleted: true })))
}

/// Archive a list.
///
/// POST /api/shopping-list/archive
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or a non-owner.
pub async fn archive(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ListRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<ListView>>> {
    const COMMAND: &str = "shoppingList/archive";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .archive(&caller, &awid, id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ListView::from(&list))))
}

/// Return an archived list to active.
///
/// POST /api/shopping-list/unarchive
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or a non-owner.
pub async fn unarchive(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ListRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<ListView>>> {
    const COMMAND: &str = "shoppingList/unarchive";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .unarchive(&caller, &awid, id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ListView::from(&list))))
}

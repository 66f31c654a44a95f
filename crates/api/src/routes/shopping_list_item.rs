//! `/api/shopping-list-item/*` commands. Open to the owner and members.

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use super::admitted;
use super::dto::{CreateItemRequest, Envelope, ItemRefRequest, ItemView, UpdateItemRequest};
use crate::error::{Result, ResultExt};
use crate::middleware::CurrentCaller;
use crate::state::AppState;

/// POST /api/shopping-list-item/create
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or a non-member.
pub async fn create(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<Json<Envelope<ItemView>>> {
    const COMMAND: &str = "shoppingListItem/create";
    let Json(body) = body.during(COMMAND)?;
    let (awid, list_id, item) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let (list, item) = state
        .store()
        .create_item(&caller, &awid, list_id, item)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ItemView::new(&list, item))))
}

/// POST /api/shopping-list-item/update
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or item, or a
/// non-member.
pub async fn update(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Envelope<ItemView>>> {
    const COMMAND: &str = "shoppingListItem/update";
    let Json(body) = body.during(COMMAND)?;
    let command = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let (list, item) = state
        .store()
        .update_item(
            &caller,
            &command.awid,
            command.list_id,
            command.item_id,
            command.patch,
        )
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(command.awid, ItemView::new(&list, item))))
}

/// POST /api/shopping-list-item/delete
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or item, or a
/// non-member.
pub async fn delete(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ItemRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<ItemView>>> {
    const COMMAND: &str = "shoppingListItem/delete";
    let Json(body) = body.during(COMMAND)?;
    let (awid, list_id, item_id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let (list, item) = state
        .store()
        .delete_item(&caller, &awid, list_id, item_id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ItemView::new(&list, item))))
}

/// POST /api/shopping-list-item/toggleResolved
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a missing list or item, or a
/// non-member.
pub async fn toggle_resolved(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ItemRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<ItemView>>> {
    const COMMAND: &str = "shoppingListItem/toggleResolved";
    let Json(body) = body.during(COMMAND)?;
    let (awid, list_id, item_id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let (list, item) = state
        .store()
        .toggle_resolved(&caller, &awid, list_id, item_id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, ItemView::new(&list, item))))
}

//! `/api/shopping-list-member/*` commands.

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use super::admitted;
use super::dto::{Envelope, ListRefRequest, MemberRequest, MembersView};
use crate::error::{Result, ResultExt};
use crate::middleware::CurrentCaller;
use crate::state::AppState;

/// Add a member. Owner only.
///
/// POST /api/shopping-list-member/addMember
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a non-owner or an existing member.
pub async fn add_member(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<MemberRequest>, JsonRejection>,
) -> Result<Json<Envelope<MembersView>>> {
    const COMMAND: &str = "shoppingListMember/addMember";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id, member) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .add_member(&caller, &awid, id, member)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, MembersView::from(&list))))
}

/// Remove a member. Owner only.
///
/// POST /api/shopping-list-member/removeMember
///
/// # Errors
///
/// Returns `ApiError` for invalid input, a non-owner or the owner as target.
pub async fn remove_member(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<MemberRequest>, JsonRejection>,
) -> Result<Json<Envelope<MembersView>>> {
    const COMMAND: &str = "shoppingListMember/removeMember";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id, member) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .remove_member(&caller, &awid, id, &member)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, MembersView::from(&list))))
}

/// Leave a list the caller is a member of.
///
/// POST /api/shopping-list-member/leave
///
/// # Errors
///
/// Returns `ApiError` for invalid input, the owner, or a non-member.
pub async fn leave(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: std::result::Result<Json<ListRefRequest>, JsonRejection>,
) -> Result<Json<Envelope<MembersView>>> {
    const COMMAND: &str = "shoppingListMember/leave";
    let Json(body) = body.during(COMMAND)?;
    let (awid, id) = body.validate().during(COMMAND)?;
    admitted(&caller).during(COMMAND)?;

    let list = state
        .store()
        .leave(&caller, &awid, id)
        .await
        .during(COMMAND)?;
    Ok(Json(Envelope::new(awid, MembersView::from(&list))))
}

//! Request and response bodies for the list API.
//!
//! Requests are deserialized loosely (every field optional, quantities as raw
//! JSON) and then validated field by field, so one response can report every
//! problem in `paramMap.errors`. Responses echo the workspace `awid` and carry an
//! empty `uuAppErrorMap`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoplist_core::{
    Awid, Identity, Item, ItemId, ItemName, ItemPatch, ListId, ListName, ListState, Measure,
    Member, NewItem, Page, Progress, Quantity, QuantityError, ShoppingList, TextError,
};

use crate::error::{AppError, FieldError};

// =============================================================================
// Validation
// =============================================================================

/// Collects field errors while converting raw request values.
///
/// Every accessor returns `None` exactly when it recorded an error, so once
/// all values are `Some` the request is valid.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// A required text field.
    pub fn text<T>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        parse: fn(&str) -> Result<T, TextError>,
    ) -> Option<T> {
        let Some(raw) = raw else {
            self.reject(field, format!("{field} is required"));
            return None;
        };
        parse(raw).map_err(|e| self.reject(field, e.to_string())).ok()
    }

    /// An optional text field. `Some(None)` when absent.
    pub fn optional_text<T>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        parse: fn(&str) -> Result<T, TextError>,
    ) -> Option<Option<T>> {
        match raw {
            None => Some(None),
            Some(raw) => self.text(field, Some(raw), parse).map(Some),
        }
    }

    /// A required UUID field.
    pub fn id<T>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        parse: fn(&str) -> Result<T, uuid::Error>,
    ) -> Option<T> {
        let Some(raw) = raw else {
            self.reject(field, format!("{field} is required"));
            return None;
        };
        parse(raw)
            .map_err(|_| self.reject(field, format!("{field} must be a valid id")))
            .ok()
    }

    /// A required quantity.
    pub fn quantity(&mut self, field: &str, raw: Option<&Value>) -> Option<Quantity> {
        match raw {
            None | Some(Value::Null) => {
                self.reject(field, format!("{field} is required"));
                None
            }
            Some(raw) => self.parse_quantity(field, raw),
        }
    }

    /// An optional quantity. `Some(None)` when absent.
    pub fn optional_quantity(
        &mut self,
        field: &str,
        raw: Option<&Value>,
    ) -> Option<Option<Quantity>> {
        match raw {
            None | Some(Value::Null) => Some(None),
            Some(raw) => self.parse_quantity(field, raw).map(Some),
        }
    }

    fn parse_quantity(&mut self, field: &str, raw: &Value) -> Option<Quantity> {
        let Some(number) = raw.as_i64() else {
            if raw.as_u64().is_some() {
                let err = QuantityError::TooLarge { max: Quantity::MAX };
                self.reject(field, err.to_string());
            } else {
                self.reject(field, format!("{field} must be a whole number"));
            }
            return None;
        };
        Quantity::try_from(number)
            .map_err(|e| self.reject(field, e.to_string()))
            .ok()
    }

    /// An optional number, e.g. a page index.
    pub fn optional_number(&mut self, field: &str, raw: Option<&str>) -> Option<Option<u32>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Some(None),
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| self.reject(field, format!("{field} must be a non-negative integer")))
                .ok()
                .map(Some),
        }
    }

    /// An optional list state filter.
    pub fn optional_state(&mut self, field: &str, raw: Option<&str>) -> Option<Option<ListState>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Some(None),
            Some(raw) => raw
                .parse::<ListState>()
                .map_err(|_| self.reject(field, format!("{field} must be active or archived")))
                .ok()
                .map(Some),
        }
    }

    /// The collected errors as an [`AppError`].
    #[must_use]
    pub fn into_error(self) -> AppError {
        if self.errors.is_empty() {
            AppError::invalid("body", "invalid request")
        } else {
            AppError::Validation(self.errors)
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// `POST /api/shopping-list/create`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub awid: Option<String>,
    pub name: Option<String>,
}

impl CreateListRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListName), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let name = v.text("name", self.name.as_deref(), ListName::parse);
        match (awid, name) {
            (Some(awid), Some(name)) => Ok((awid, name)),
            _ => Err(v.into_error()),
        }
    }
}

/// `GET /api/shopping-list/get` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetListQuery {
    pub awid: Option<String>,
    pub id: Option<String>,
}

/// Body shared by commands that address one list: `delete`, `archive`,
/// `unarchive` and `leave`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRefRequest {
    pub awid: Option<String>,
    pub id: Option<String>,
}

impl ListRefRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListId), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let id = v.id("id", self.id.as_deref(), ListId::parse);
        match (awid, id) {
            (Some(awid), Some(id)) => Ok((awid, id)),
            _ => Err(v.into_error()),
        }
    }
}

impl From<GetListQuery> for ListRefRequest {
    fn from(query: GetListQuery) -> Self {
        Self {
            awid: query.awid,
            id: query.id,
        }
    }
}

/// `GET /api/shopping-list/list` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListListsQuery {
    pub awid: Option<String>,
    pub filter: Option<String>,
    pub page_index: Option<String>,
    pub page_size: Option<String>,
}

/// Validated `list` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListListsCommand {
    pub awid: Awid,
    pub state: Option<ListState>,
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListListsQuery {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<ListListsCommand, AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let state = v.optional_state("filter", self.filter.as_deref());
        let page_index = v.optional_number("pageIndex", self.page_index.as_deref());
        let page_size = v.optional_number("pageSize", self.page_size.as_deref());
        match (awid, state, page_index, page_size) {
            (Some(awid), Some(state), Some(page_index), Some(page_size)) => Ok(ListListsCommand {
                awid,
                state,
                page_index,
                page_size,
            }),
            _ => Err(v.into_error()),
        }
    }
}

/// `POST /api/shopping-list/update`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameListRequest {
    pub awid: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl RenameListRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListId, ListName), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let id = v.id("id", self.id.as_deref(), ListId::parse);
        let name = v.text("name", self.name.as_deref(), ListName::parse);
        match (awid, id, name) {
            (Some(awid), Some(id), Some(name)) => Ok((awid, id, name)),
            _ => Err(v.into_error()),
        }
    }
}

/// `POST /api/shopping-list-member/addMember` and `removeMember`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub awid: Option<String>,
    pub id: Option<String>,
    pub member_uu_identity: Option<String>,
}

impl MemberRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListId, Identity), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let id = v.id("id", self.id.as_deref(), ListId::parse);
        let member = v.text(
            "memberUuIdentity",
            self.member_uu_identity.as_deref(),
            Identity::parse,
        );
        match (awid, id, member) {
            (Some(awid), Some(id), Some(member)) => Ok((awid, id, member)),
            _ => Err(v.into_error()),
        }
    }
}

/// `POST /api/shopping-list-item/create`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub awid: Option<String>,
    pub shopping_list_id: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<Value>,
    pub measure: Option<String>,
}

impl CreateItemRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListId, NewItem), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let list_id = v.id("shoppingListId", self.shopping_list_id.as_deref(), ListId::parse);
        let name = v.text("name", self.name.as_deref(), ItemName::parse);
        let quantity = v.quantity("quantity", self.quantity.as_ref());
        let measure = v.text("measure", self.measure.as_deref(), Measure::parse);
        match (awid, list_id, name, quantity, measure) {
            (Some(awid), Some(list_id), Some(name), Some(quantity), Some(measure)) => Ok((
                awid,
                list_id,
                NewItem {
                    name,
                    quantity,
                    measure,
                },
            )),
            _ => Err(v.into_error()),
        }
    }
}

/// `POST /api/shopping-list-item/update`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub awid: Option<String>,
    pub shopping_list_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<Value>,
    pub measure: Option<String>,
}

/// Validated item update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItemCommand {
    pub awid: Awid,
    pub list_id: ListId,
    pub item_id: ItemId,
    pub patch: ItemPatch,
}

impl UpdateItemRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<UpdateItemCommand, AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let list_id = v.id("shoppingListId", self.shopping_list_id.as_deref(), ListId::parse);
        let item_id = v.id("id", self.id.as_deref(), ItemId::parse);
        let name = v.optional_text("name", self.name.as_deref(), ItemName::parse);
        let quantity = v.optional_quantity("quantity", self.quantity.as_ref());
        let measure = v.optional_text("measure", self.measure.as_deref(), Measure::parse);
        match (awid, list_id, item_id, name, quantity, measure) {
            (Some(awid), Some(list_id), Some(item_id), Some(name), Some(quantity), Some(measure)) => {
                Ok(UpdateItemCommand {
                    awid,
                    list_id,
                    item_id,
                    patch: ItemPatch {
                        name,
                        quantity,
                        measure,
                    },
                })
            }
            _ => Err(v.into_error()),
        }
    }
}

/// `POST /api/shopping-list-item/delete` and `toggleResolved`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRefRequest {
    pub awid: Option<String>,
    pub shopping_list_id: Option<String>,
    pub id: Option<String>,
}

impl ItemRefRequest {
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every invalid field.
    pub fn validate(&self) -> Result<(Awid, ListId, ItemId), AppError> {
        let mut v = Validator::default();
        let awid = v.text("awid", self.awid.as_deref(), Awid::parse);
        let list_id = v.id("shoppingListId", self.shopping_list_id.as_deref(), ListId::parse);
        let item_id = v.id("id", self.id.as_deref(), ItemId::parse);
        match (awid, list_id, item_id) {
            (Some(awid), Some(list_id), Some(item_id)) => Ok((awid, list_id, item_id)),
            _ => Err(v.into_error()),
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Always serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmptyErrorMap {}

/// Success envelope: the command's payload plus `awid` and `uuAppErrorMap`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub awid: Awid,
    #[serde(flatten)]
    pub body: T,
    pub uu_app_error_map: EmptyErrorMap,
}

impl<T> Envelope<T> {
    pub const fn new(awid: Awid, body: T) -> Self {
        Self {
            awid,
            body,
            uu_app_error_map: EmptyErrorMap {},
        }
    }
}

/// A full list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub id: ListId,
    pub name: ListName,
    pub state: ListState,
    #[serde(rename = "ownerUuIdentity")]
    pub owner_identity: Identity,
    pub members: Vec<Member>,
    pub member_count: usize,
    pub items: Vec<Item>,
    pub progress: Progress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ShoppingList> for ListView {
    fn from(list: &ShoppingList) -> Self {
        Self {
            id: list.id(),
            name: list.name().clone(),
            state: list.state(),
            owner_identity: list.owner().clone(),
            members: list.members().to_vec(),
            member_count: list.member_count(),
            items: list.items().to_vec(),
            progress: list.progress(),
            created_at: list.created_at(),
            updated_at: list.updated_at(),
        }
    }
}

/// A list as shown in the overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: ListId,
    pub name: ListName,
    pub state: ListState,
    #[serde(rename = "ownerUuIdentity")]
    pub owner_identity: Identity,
    pub member_count: usize,
    pub progress: Progress,
    pub updated_at: DateTime<Utc>,
}

impl From<&ShoppingList> for ListSummary {
    fn from(list: &ShoppingList) -> Self {
        Self {
            id: list.id(),
            name: list.name().clone(),
            state: list.state(),
            owner_identity: list.owner().clone(),
            member_count: list.member_count(),
            progress: list.progress(),
            updated_at: list.updated_at(),
        }
    }
}

/// Paging information of a `list` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page_index: u32,
    pub page_size: u32,
    pub total: u64,
}

/// `list` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub item_list: Vec<ListSummary>,
    pub page_info: PageInfo,
}

impl From<Page<ShoppingList>> for ListPage {
    fn from(page: Page<ShoppingList>) -> Self {
        Self {
            page_info: PageInfo {
                page_index: page.request.page_index,
                page_size: page.request.page_size,
                total: page.total,
            },
            item_list: page.items.iter().map(ListSummary::from).collect(),
        }
    }
}

/// `delete` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: ListId,
    pub deleted: bool,
}

/// Membership response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersView {
    pub id: ListId,
    pub members: Vec<Member>,
    pub member_count: usize,
}

impl From<&ShoppingList> for MembersView {
    fn from(list: &ShoppingList) -> Self {
        Self {
            id: list.id(),
            members: list.members().to_vec(),
            member_count: list.member_count(),
        }
    }
}

/// Item command response body: the item plus the list's new progress.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub shopping_list_id: ListId,
    #[serde(flatten)]
    pub item: Item,
    pub progress: Progress,
}

impl ItemView {
    #[must_use]
    pub fn new(list: &ShoppingList, item: Item) -> Self {
        Self {
            shopping_list_id: list.id(),
            item,
            progress: list.progress(),
        }
    }
}

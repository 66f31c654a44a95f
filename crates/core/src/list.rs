//! The shopping list aggregate.
//!
//! A [`ShoppingList`] owns its members and items and is the unit of
//! consistency: every mutation goes through a method here, so the owner and
//! uniqueness invariants hold after each call and progress can never drift
//! from the items it is derived from.
//!
//! Relationship rules (who may call what) live in [`crate::access`]. The
//! aggregate still refuses mutations that would break its own invariants,
//! whoever the caller is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Awid, Identity, ItemId, ItemName, ListId, ListName, ListState, Measure, Quantity};

/// Errors raised by aggregate mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// The identity is already a member.
    #[error("member already exists")]
    MemberExists,
    /// The owner cannot be removed from their own list.
    #[error("cannot remove owner")]
    CannotRemoveOwner,
    /// The owner cannot leave their own list.
    #[error("owner cannot leave the list")]
    OwnerCannotLeave,
    /// The identity is not a member of the list.
    #[error("user is not a member of this list")]
    NotMember,
    /// No item with this id on the list.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    /// A stored document violates an aggregate invariant.
    #[error("invalid list document: {0}")]
    InvalidDocument(&'static str),
}

/// A list member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "uuIdentity")]
    pub identity: Identity,
    pub is_owner: bool,
}

/// An item on a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: ItemName,
    pub quantity: Quantity,
    pub measure: Measure,
    #[serde(default)]
    pub resolved: bool,
}

/// Fields for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: ItemName,
    pub quantity: Quantity,
    pub measure: Measure,
}

/// Partial update of an item. `None` leaves the field unchanged.
///
/// There is deliberately no `resolved` field: resolution only changes through
/// [`ShoppingList::toggle_resolved`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<ItemName>,
    pub quantity: Option<Quantity>,
    pub measure: Option<Measure>,
}

impl ItemPatch {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.measure.is_none()
    }
}

/// Completed and total item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Derive progress from a set of items.
    #[must_use]
    pub fn of(items: &[Item]) -> Self {
        Self {
            completed: items.iter().filter(|i| i.resolved).count(),
            total: items.len(),
        }
    }
}

/// A shopping list with its members and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ListDocument", into = "ListDocument")]
pub struct ShoppingList {
    id: ListId,
    awid: Awid,
    name: ListName,
    state: ListState,
    owner: Identity,
    members: Vec<Member>,
    items: Vec<Item>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShoppingList {
    /// Create an active list whose only member is its owner.
    #[must_use]
    pub fn new(id: ListId, awid: Awid, name: ListName, owner: Identity, now: DateTime<Utc>) -> Self {
        Self {
            id,
            awid,
            name,
            state: ListState::Active,
            members: vec![Member {
                identity: owner.clone(),
                is_owner: true,
            }],
            owner,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ListId {
        self.id
    }

    #[must_use]
    pub const fn awid(&self) -> &Awid {
        &self.awid
    }

    #[must_use]
    pub const fn name(&self) -> &ListName {
        &self.name
    }

    #[must_use]
    pub const fn state(&self) -> ListState {
        self.state
    }

    #[must_use]
    pub const fn owner(&self) -> &Identity {
        &self.owner
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Progress derived from the current items.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::of(&self.items)
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_owner(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }

    /// Whether the identity is on the member list. The owner always is.
    #[must_use]
    pub fn is_member(&self, identity: &Identity) -> bool {
        self.members.iter().any(|m| &m.identity == identity)
    }

    /// Identities of all members, owner first.
    pub fn member_identities(&self) -> impl Iterator<Item = &Identity> {
        self.members.iter().map(|m| &m.identity)
    }

    pub fn rename(&mut self, name: ListName, now: DateTime<Utc>) {
        self.name = name;
        self.touch(now);
    }

    /// Set the lifecycle state. Setting the current state again is accepted
    /// and still refreshes `updated_at`.
    pub fn set_state(&mut self, state: ListState, now: DateTime<Utc>) {
        self.state = state;
        self.touch(now);
    }

    /// Append a non-owner member.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::MemberExists`] if the identity is already a member.
    pub fn add_member(&mut self, identity: Identity, now: DateTime<Utc>) -> Result<(), ListError> {
        if self.is_member(&identity) {
            return Err(ListError::MemberExists);
        }
        self.members.push(Member {
            identity,
            is_owner: false,
        });
        self.touch(now);
        Ok(())
    }

    /// Remove a member. Removing an identity that is not a member changes
    /// nothing and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::CannotRemoveOwner`] for the owner.
    pub fn remove_member(
        &mut self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<bool, ListError> {
        if self.is_owner(identity) {
            return Err(ListError::CannotRemoveOwner);
        }
        let before = self.members.len();
        self.members.retain(|m| &m.identity != identity);
        let removed = self.members.len() != before;
        if removed {
            self.touch(now);
        }
        Ok(removed)
    }

    /// Remove the identity as a voluntary departure.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::OwnerCannotLeave`] for the owner and
    /// [`ListError::NotMember`] for an identity not on the list.
    pub fn leave(&mut self, identity: &Identity, now: DateTime<Utc>) -> Result<(), ListError> {
        if self.is_owner(identity) {
            return Err(ListError::OwnerCannotLeave);
        }
        if !self.is_member(identity) {
            return Err(ListError::NotMember);
        }
        self.members.retain(|m| &m.identity != identity);
        self.touch(now);
        Ok(())
    }

    /// Append an unresolved item and return a copy of it.
    pub fn add_item(&mut self, id: ItemId, item: NewItem, now: DateTime<Utc>) -> Item {
        let item = Item {
            id,
            name: item.name,
            quantity: item.quantity,
            measure: item.measure,
            resolved: false,
        };
        self.items.push(item.clone());
        self.touch(now);
        item
    }

    /// Apply a partial update to an item.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::ItemNotFound`] if there is no such item.
    pub fn update_item(
        &mut self,
        id: ItemId,
        patch: ItemPatch,
        now: DateTime<Utc>,
    ) -> Result<&Item, ListError> {
        let item = self.item_mut(id, now)?;
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(measure) = patch.measure {
            item.measure = measure;
        }
        Ok(item)
    }

    /// Remove an item and return it.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::ItemNotFound`] if there is no such item.
    pub fn remove_item(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<Item, ListError> {
        let index = self.item_index(id)?;
        self.touch(now);
        Ok(self.items.remove(index))
    }

    /// Flip the resolved flag of an item.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::ItemNotFound`] if there is no such item.
    pub fn toggle_resolved(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<&Item, ListError> {
        let item = self.item_mut(id, now)?;
        item.resolved = !item.resolved;
        Ok(item)
    }

    /// Find an item for mutation, refreshing `updated_at` only when it exists.
    fn item_mut(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<&mut Item, ListError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(ListError::ItemNotFound(id))?;
        self.updated_at = now;
        Ok(item)
    }

    fn item_index(&self, id: ItemId) -> Result<usize, ListError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(ListError::ItemNotFound(id))
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Storage shape of a [`ShoppingList`].
///
/// Decoding goes through `TryFrom`, so a document that breaks an invariant is
/// rejected instead of becoming a live aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocument {
    pub id: ListId,
    pub awid: Awid,
    pub name: ListName,
    #[serde(default)]
    pub state: ListState,
    #[serde(rename = "ownerUuIdentity")]
    pub owner_identity: Identity,
    pub members: Vec<Member>,
    #[serde(default)]
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ListDocument> for ShoppingList {
    type Error = ListError;

    fn try_from(doc: ListDocument) -> Result<Self, Self::Error> {
        let mut owners = doc.members.iter().filter(|m| m.is_owner);
        match (owners.next(), owners.next()) {
            (Some(owner), None) if owner.identity == doc.owner_identity => {}
            (None, _) => return Err(ListError::InvalidDocument("list has no owner member")),
            (Some(_), Some(_)) => {
                return Err(ListError::InvalidDocument("list has more than one owner member"));
            }
            (Some(_), None) => {
                return Err(ListError::InvalidDocument("owner member does not match owner identity"));
            }
        }

        for (i, member) in doc.members.iter().enumerate() {
            if doc.members.iter().take(i).any(|m| m.identity == member.identity) {
                return Err(ListError::InvalidDocument("duplicate member identity"));
            }
        }
        for (i, item) in doc.items.iter().enumerate() {
            if doc.items.iter().take(i).any(|other| other.id == item.id) {
                return Err(ListError::InvalidDocument("duplicate item id"));
            }
        }

        Ok(Self {
            id: doc.id,
            awid: doc.awid,
            name: doc.name,
            state: doc.state,
            owner: doc.owner_identity,
            members: doc.members,
            items: doc.items,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

impl From<ShoppingList> for ListDocument {
    fn from(list: ShoppingList) -> Self {
        Self {
            id: list.id,
            awid: list.awid,
            name: list.name,
            state: list.state,
            owner_identity: list.owner,
            members: list.members,
            items: list.items,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn ident(s: &str) -> Identity {
        Identity::parse(s).unwrap()
    }

    fn groceries(now: DateTime<Utc>) -> ShoppingList {
        ShoppingList::new(
            ListId::generate(),
            Awid::parse("awid-1").unwrap(),
            ListName::parse("Groceries").unwrap(),
            ident("alice"),
            now,
        )
    }

    fn milk() -> NewItem {
        NewItem {
            name: ItemName::parse("Milk").unwrap(),
            quantity: Quantity::new(2).unwrap(),
            measure: Measure::parse("liters").unwrap(),
        }
    }

    fn assert_owner_invariant(list: &ShoppingList) {
        let owners: Vec<_> = list.members().iter().filter(|m| m.is_owner).collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(&owners[0].identity, list.owner());
    }

    fn assert_progress_matches(list: &ShoppingList) {
        let progress = list.progress();
        assert_eq!(progress.total, list.items().len());
        assert_eq!(
            progress.completed,
            list.items().iter().filter(|i| i.resolved).count()
        );
    }

    #[test]
    fn test_new_list_has_owner_as_only_member() {
        let list = groceries(Utc::now());
        assert_eq!(list.state(), ListState::Active);
        assert_eq!(list.member_count(), 1);
        assert!(list.members()[0].is_owner);
        assert_eq!(list.progress(), Progress::default());
        assert_owner_invariant(&list);
    }

    #[test]
    fn test_add_member_twice_is_rejected() {
        let mut list = groceries(Utc::now());
        list.add_member(ident("bob"), Utc::now()).unwrap();
        assert_eq!(
            list.add_member(ident("bob"), Utc::now()),
            Err(ListError::MemberExists)
        );
        assert_eq!(list.member_count(), 2);
        assert_owner_invariant(&list);
    }

    #[test]
    fn test_owner_cannot_be_added_again() {
        let mut list = groceries(Utc::now());
        assert_eq!(
            list.add_member(ident("alice"), Utc::now()),
            Err(ListError::MemberExists)
        );
    }

    #[test]
    fn test_remove_owner_rejected_without_change() {
        let mut list = groceries(Utc::now());
        list.add_member(ident("bob"), Utc::now()).unwrap();
        let before = list.clone();
        assert_eq!(
            list.remove_member(&ident("alice"), Utc::now()),
            Err(ListError::CannotRemoveOwner)
        );
        assert_eq!(list, before);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let start = Utc::now();
        let mut list = groceries(start);
        let removed = list
            .remove_member(&ident("carol"), start + Duration::seconds(5))
            .unwrap();
        assert!(!removed);
        assert_eq!(list.updated_at(), start);
    }

    #[test]
    fn test_leave() {
        let mut list = groceries(Utc::now());
        list.add_member(ident("bob"), Utc::now()).unwrap();
        assert_eq!(
            list.leave(&ident("alice"), Utc::now()),
            Err(ListError::OwnerCannotLeave)
        );
        assert_eq!(
            list.leave(&ident("carol"), Utc::now()),
            Err(ListError::NotMember)
        );
        list.leave(&ident("bob"), Utc::now()).unwrap();
        assert!(!list.is_member(&ident("bob")));
        assert_owner_invariant(&list);
    }

    #[test]
    fn test_progress_tracks_item_mutations() {
        let mut list = groceries(Utc::now());
        let milk_id = ItemId::generate();
        let bread_id = ItemId::generate();
        list.add_item(milk_id, milk(), Utc::now());
        list.add_item(
            bread_id,
            NewItem {
                name: ItemName::parse("Bread").unwrap(),
                quantity: Quantity::new(1).unwrap(),
                measure: Measure::parse("pcs").unwrap(),
            },
            Utc::now(),
        );
        assert_progress_matches(&list);
        assert_eq!(list.progress(), Progress { completed: 0, total: 2 });

        list.toggle_resolved(milk_id, Utc::now()).unwrap();
        assert_eq!(list.progress(), Progress { completed: 1, total: 2 });

        list.remove_item(milk_id, Utc::now()).unwrap();
        assert_eq!(list.progress(), Progress { completed: 0, total: 1 });
        assert_progress_matches(&list);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut list = groceries(Utc::now());
        let id = ItemId::generate();
        list.add_item(id, milk(), Utc::now());
        assert!(list.toggle_resolved(id, Utc::now()).unwrap().resolved);
        assert!(!list.toggle_resolved(id, Utc::now()).unwrap().resolved);
    }

    #[test]
    fn test_update_item_leaves_unset_fields_and_resolution() {
        let mut list = groceries(Utc::now());
        let id = ItemId::generate();
        list.add_item(id, milk(), Utc::now());
        list.toggle_resolved(id, Utc::now()).unwrap();

        let later = Utc::now() + Duration::minutes(1);
        let item = list
            .update_item(
                id,
                ItemPatch {
                    quantity: Some(Quantity::new(3).unwrap()),
                    ..ItemPatch::default()
                },
                later,
            )
            .unwrap()
            .clone();
        assert_eq!(item.quantity.get(), 3);
        assert_eq!(item.name.as_str(), "Milk");
        assert!(item.resolved);
        assert_eq!(list.updated_at(), later);
    }

    #[test]
    fn test_missing_item() {
        let mut list = groceries(Utc::now());
        let id = ItemId::generate();
        assert_eq!(
            list.toggle_resolved(id, Utc::now()).unwrap_err(),
            ListError::ItemNotFound(id)
        );
        assert!(list.remove_item(id, Utc::now()).is_err());
    }

    #[test]
    fn test_set_state_again_refreshes_timestamp() {
        let start = Utc::now();
        let mut list = groceries(start);
        list.set_state(ListState::Archived, start + Duration::seconds(1));
        list.set_state(ListState::Archived, start + Duration::seconds(2));
        assert_eq!(list.state(), ListState::Archived);
        assert_eq!(list.updated_at(), start + Duration::seconds(2));
    }

    #[test]
    fn test_document_round_trip_keeps_aggregate() {
        let mut list = groceries(Utc::now());
        list.add_member(ident("bob"), Utc::now()).unwrap();
        list.add_item(ItemId::generate(), milk(), Utc::now());

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["ownerUuIdentity"], "alice");
        assert_eq!(json["members"][0]["uuIdentity"], "alice");
        let decoded: ShoppingList = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_document_without_owner_member_rejected() {
        let list = groceries(Utc::now());
        let mut doc = ListDocument::from(list);
        doc.members[0].is_owner = false;
        assert!(matches!(
            ShoppingList::try_from(doc),
            Err(ListError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_document_with_foreign_owner_rejected() {
        let list = groceries(Utc::now());
        let mut doc = ListDocument::from(list);
        doc.owner_identity = ident("mallory");
        assert!(ShoppingList::try_from(doc).is_err());
    }

    #[test]
    fn test_document_with_duplicate_member_rejected() {
        let list = groceries(Utc::now());
        let mut doc = ListDocument::from(list);
        doc.members.push(Member {
            identity: ident("alice"),
            is_owner: false,
        });
        assert!(ShoppingList::try_from(doc).is_err());
    }
}

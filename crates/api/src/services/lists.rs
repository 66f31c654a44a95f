//! Shopping list store.
//!
//! Every command follows the same path: admit the caller (authentication and
//! profile), load the list, check the caller's relationship to it, mutate the
//! aggregate, save. Each repository round trip runs under the configured
//! deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shoplist_core::access::{self, Caller, Denial, Operation};
use shoplist_core::{
    Awid, Identity, Item, ItemId, ItemPatch, ListError, ListId, ListName, ListState, NewItem,
    Page, PageRequest, ShoppingList,
};

use crate::config::PagingConfig;
use crate::db::{ListQuery, ListRepository, RepositoryError};

/// Errors returned by [`ListStore`] commands.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The access gate refused the command.
    #[error(transparent)]
    Denied(#[from] Denial),

    /// No list with this id in the caller's workspace.
    #[error("shopping list {0} not found")]
    ListNotFound(ListId),

    /// The aggregate refused the mutation.
    #[error(transparent)]
    List(#[from] ListError),

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Storage did not answer within the deadline.
    #[error("storage did not respond within {0:?}")]
    Timeout(Duration),
}

/// Shopping list commands over an injected repository.
#[derive(Clone)]
pub struct ListStore {
    repo: Arc<dyn ListRepository>,
    deadline: Duration,
    paging: PagingConfig,
}

impl ListStore {
    #[must_use]
    pub fn new(repo: Arc<dyn ListRepository>, deadline: Duration, paging: PagingConfig) -> Self {
        Self {
            repo,
            deadline,
            paging,
        }
    }

    /// Check that the repository answers within the deadline.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if storage is unreachable, or
    /// `StoreError::Timeout` if it does not answer in time.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.within(self.repo.health_check()).await
    }

    /// Build a page request from optional query values, applying the
    /// configured default and maximum page size.
    #[must_use]
    pub fn page_request(&self, page_index: Option<u32>, page_size: Option<u32>) -> PageRequest {
        let size = page_size
            .unwrap_or(self.paging.default_page_size)
            .min(self.paging.max_page_size);
        PageRequest::new(page_index.unwrap_or(0), size)
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Create a list owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Denied` if the caller is not admitted.
    pub async fn create(
        &self,
        caller: &Caller,
        awid: &Awid,
        name: ListName,
    ) -> Result<ShoppingList, StoreError> {
        let owner = admit(caller)?;
        let list = ShoppingList::new(ListId::generate(), awid.clone(), name, owner.clone(), Utc::now());
        self.within(self.repo.save(&list)).await?;
        tracing::info!(list_id = %list.id(), identity = %owner, "Shopping list created");
        Ok(list)
    }

    /// Load a list the caller owns or is a member of.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn get(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
    ) -> Result<ShoppingList, StoreError> {
        admit(caller)?;
        let list = self.load(awid, id).await?;
        authorize(caller, &list, Operation::Read)?;
        Ok(list)
    }

    /// Lists in the workspace the caller owns or is a member of, most
    /// recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Denied` if the caller is not admitted.
    pub async fn list(
        &self,
        caller: &Caller,
        awid: &Awid,
        state: Option<ListState>,
        page: PageRequest,
    ) -> Result<Page<ShoppingList>, StoreError> {
        let member = admit(caller)?.clone();
        let query = ListQuery {
            awid: awid.clone(),
            member,
            state,
            page,
        };
        self.within(self.repo.find(&query)).await
    }

    /// Rename a list. Owner only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn rename(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
        name: ListName,
    ) -> Result<ShoppingList, StoreError> {
        let (list, ()) = self
            .mutate(caller, awid, id, Operation::Rename, |list, now| {
                list.rename(name, now);
                Ok(())
            })
            .await?;
        Ok(list)
    }

    /// Archive a list. Owner only; archiving an archived list succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn archive(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
    ) -> Result<ShoppingList, StoreError> {
        self.set_state(caller, awid, id, Operation::Archive, ListState::Archived)
            .await
    }

    /// Return a list to the active state. Owner only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn unarchive(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
    ) -> Result<ShoppingList, StoreError> {
        self.set_state(caller, awid, id, Operation::Unarchive, ListState::Active)
            .await
    }

    async fn set_state(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
        operation: Operation<'_>,
        state: ListState,
    ) -> Result<ShoppingList, StoreError> {
        let (list, ()) = self
            .mutate(caller, awid, id, operation, |list, now| {
                list.set_state(state, now);
                Ok(())
            })
            .await?;
        Ok(list)
    }

    /// Delete a list permanently. Owner only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn delete(&self, caller: &Caller, awid: &Awid, id: ListId) -> Result<(), StoreError> {
        let identity = admit(caller)?;
        let list = self.load(awid, id).await?;
        authorize(caller, &list, Operation::Delete)?;
        if !self.within(self.repo.delete_by_id(id)).await? {
            return Err(StoreError::ListNotFound(id));
        }
        tracing::info!(list_id = %id, identity = %identity, "Shopping list deleted");
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Add a member. Owner only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Denied` with [`Denial::AlreadyMember`] for an
    /// existing member.
    pub async fn add_member(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
        member: Identity,
    ) -> Result<ShoppingList, StoreError> {
        let target = member.clone();
        let (list, ()) = self
            .mutate(caller, awid, id, Operation::AddMember(&target), |list, now| {
                list.add_member(member, now)
            })
            .await?;
        Ok(list)
    }

    /// Remove a member. Owner only; removing a non-member changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Denied` with [`Denial::CannotRemoveOwner`] for
    /// the owner.
    pub async fn remove_member(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
        member: &Identity,
    ) -> Result<ShoppingList, StoreError> {
        admit(caller)?;
        let mut list = self.load(awid, id).await?;
        authorize(caller, &list, Operation::RemoveMember(member))?;
        if list.remove_member(member, Utc::now())? {
            self.within(self.repo.save(&list)).await?;
            tracing::info!(list_id = %id, member = %member, "Member removed");
        }
        Ok(list)
    }

    /// Remove the caller from a list they are a member of.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Denied` for the owner or a non-member.
    pub async fn leave(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
    ) -> Result<ShoppingList, StoreError> {
        let (list, ()) = self
            .mutate(caller, awid, id, Operation::Leave, |list, now| {
                // admitted, so the identity is present
                match caller.identity() {
                    Some(identity) => list.leave(identity, now),
                    None => Err(ListError::NotMember),
                }
            })
            .await?;
        Ok(list)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Append an item. Owner or member.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ListNotFound` or `StoreError::Denied`.
    pub async fn create_item(
        &self,
        caller: &Caller,
        awid: &Awid,
        list_id: ListId,
        item: NewItem,
    ) -> Result<(ShoppingList, Item), StoreError> {
        self.mutate(caller, awid, list_id, Operation::MutateItems, |list, now| {
            Ok(list.add_item(ItemId::generate(), item, now))
        })
        .await
    }

    /// Partially update an item. Owner or member.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::List` with [`ListError::ItemNotFound`] if the
    /// item is not on the list.
    pub async fn update_item(
        &self,
        caller: &Caller,
        awid: &Awid,
        list_id: ListId,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<(ShoppingList, Item), StoreError> {
        self.mutate(caller, awid, list_id, Operation::MutateItems, |list, now| {
            list.update_item(item_id, patch, now).cloned()
        })
        .await
    }

    /// Remove an item. Owner or member.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::List` with [`ListError::ItemNotFound`] if the
    /// item is not on the list.
    pub async fn delete_item(
        &self,
        caller: &Caller,
        awid: &Awid,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<(ShoppingList, Item), StoreError> {
        self.mutate(caller, awid, list_id, Operation::MutateItems, |list, now| {
            list.remove_item(item_id, now)
        })
        .await
    }

    /// Flip an item's resolved flag. Owner or member.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::List` with [`ListError::ItemNotFound`] if the
    /// item is not on the list.
    pub async fn toggle_resolved(
        &self,
        caller: &Caller,
        awid: &Awid,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<(ShoppingList, Item), StoreError> {
        self.mutate(caller, awid, list_id, Operation::MutateItems, |list, now| {
            list.toggle_resolved(item_id, now).cloned()
        })
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Admit, load, authorize, apply `change`, save.
    async fn mutate<T>(
        &self,
        caller: &Caller,
        awid: &Awid,
        id: ListId,
        operation: Operation<'_>,
        change: impl FnOnce(&mut ShoppingList, DateTime<Utc>) -> Result<T, ListError>,
    ) -> Result<(ShoppingList, T), StoreError> {
        let identity = admit(caller)?;
        let mut list = self.load(awid, id).await?;
        authorize(caller, &list, operation)?;
        let output = change(&mut list, Utc::now())?;
        self.within(self.repo.save(&list)).await?;
        tracing::info!(
            list_id = %id,
            identity = %identity,
            operation = ?operation,
            "Shopping list updated"
        );
        Ok((list, output))
    }

    /// Load a list; one stored under another workspace is reported as missing.
    async fn load(&self, awid: &Awid, id: ListId) -> Result<ShoppingList, StoreError> {
        self.within(self.repo.find_by_id(id))
            .await?
            .filter(|list| list.awid() == awid)
            .ok_or(StoreError::ListNotFound(id))
    }

    async fn within<T>(
        &self,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "Repository call timed out");
                Err(StoreError::Timeout(self.deadline))
            }
        }
    }
}

fn admit(caller: &Caller) -> Result<&Identity, StoreError> {
    access::admit(caller).map_err(|reason| {
        tracing::debug!(reason = %reason, "Caller not admitted");
        StoreError::Denied(reason)
    })
}

fn authorize(caller: &Caller, list: &ShoppingList, operation: Operation<'_>) -> Result<(), StoreError> {
    access::check(caller, list, operation)
        .into_result()
        .map_err(|reason| {
            tracing::debug!(
                list_id = %list.id(),
                identity = ?caller.identity().map(Identity::as_str),
                reason = %reason,
                "Access denied"
            );
            StoreError::Denied(reason)
        })
}

//! In-memory list repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shoplist_core::{ListId, Page, ShoppingList};

use super::{ListQuery, ListRepository, RepositoryError};

/// Repository holding lists in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryListRepository {
    lists: RwLock<HashMap<ListId, ShoppingList>>,
}

impl InMemoryListRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored lists.
    pub async fn len(&self) -> usize {
        self.lists.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lists.read().await.is_empty()
    }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn find_by_id(&self, id: ListId) -> Result<Option<ShoppingList>, RepositoryError> {
        Ok(self.lists.read().await.get(&id).cloned())
    }

    async fn find(&self, query: &ListQuery) -> Result<Page<ShoppingList>, RepositoryError> {
        let mut matching: Vec<ShoppingList> = self
            .lists
            .read()
            .await
            .values()
            .filter(|list| query.matches(list))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(Page::slice(matching, query.page))
    }

    async fn save(&self, list: &ShoppingList) -> Result<(), RepositoryError> {
        self.lists.write().await.insert(list.id(), list.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: ListId) -> Result<bool, RepositoryError> {
        Ok(self.lists.write().await.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

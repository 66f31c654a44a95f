//! Persistence for shopping lists.
//!
//! Handlers never talk to storage directly: the store in
//! [`crate::services::lists`] holds an `Arc<dyn ListRepository>` and the
//! backend is picked at startup from `SHOPLIST_STORAGE`.
//!
//! # Backends
//!
//! - [`PgListRepository`] - `shoplist.shopping_list` table, one JSONB document
//!   per list plus indexed lookup columns
//! - [`InMemoryListRepository`] - process-local map used by tests and the
//!   `memory` backend
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p shoplist-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod seed;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shoplist_core::{Awid, Identity, ListId, ListState, Page, PageRequest, ShoppingList};

pub use memory::InMemoryListRepository;
pub use postgres::PgListRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Filter for [`ListRepository::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Workspace the lists belong to.
    pub awid: Awid,
    /// Only lists this identity owns or is a member of.
    pub member: Identity,
    /// Only lists in this state, if set.
    pub state: Option<ListState>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Whether a list satisfies the filter (paging aside).
    #[must_use]
    pub fn matches(&self, list: &ShoppingList) -> bool {
        list.awid() == &self.awid
            && list.is_member(&self.member)
            && self.state.is_none_or(|state| list.state() == state)
    }
}

/// Storage for list aggregates.
///
/// Results of `find` are ordered by `updated_at` descending, ties broken by
/// id ascending.
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Load one list.
    async fn find_by_id(&self, id: ListId) -> Result<Option<ShoppingList>, RepositoryError>;

    /// Load one page of lists matching `query`, with the total match count.
    async fn find(&self, query: &ListQuery) -> Result<Page<ShoppingList>, RepositoryError>;

    /// Insert or replace a list.
    async fn save(&self, list: &ShoppingList) -> Result<(), RepositoryError>;

    /// Delete a list. Returns `false` if it did not exist.
    async fn delete_by_id(&self, id: ListId) -> Result<bool, RepositoryError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

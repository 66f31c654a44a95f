//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::ListRepository;
use crate::services::ListStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// list store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: ListStore,
}

impl AppState {
    /// Create a new application state over the given repository.
    #[must_use]
    pub fn new(config: ApiConfig, repository: Arc<dyn ListRepository>) -> Self {
        let store = ListStore::new(repository, config.request_timeout, config.paging);
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the list store.
    #[must_use]
    pub fn store(&self) -> &ListStore {
        &self.inner.store
    }
}

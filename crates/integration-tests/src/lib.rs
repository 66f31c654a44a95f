//! Integration tests for Shoplist.
//!
//! Each test boots the real router on an ephemeral port and talks to it over
//! HTTP, with caller identity supplied through the gateway headers.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory storage, no external services
//! cargo test -p shoplist-integration-tests
//!
//! # PostgreSQL-backed tests
//! SHOPLIST_TEST_DATABASE_URL=postgres://localhost/shoplist_test \
//!     cargo test -p shoplist-integration-tests -- --ignored
//! ```

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shoplist_api::config::ApiConfig;
use shoplist_api::db::{InMemoryListRepository, ListRepository};
use shoplist_api::middleware::identity::{AUTHORITIES_HEADER, IDENTITY_HEADER};
use shoplist_api::state::AppState;

/// Workspace used by most tests.
pub const AWID: &str = "awid-test";

/// A running API server.
pub struct TestApp {
    base_url: String,
    client: Client,
    server: JoinHandle<()>,
}

impl TestApp {
    /// Start a server over an empty in-memory repository.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(InMemoryListRepository::new())).await
    }

    /// Start a server over the given repository.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn_with(repository: Arc<dyn ListRepository>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = shoplist_api::app(AppState::new(ApiConfig::in_memory(), repository));

        // Serve errors show up as failed requests in the test itself.
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            server,
        }
    }

    /// A caller holding the regular user profile.
    #[must_use]
    pub fn user(&self, identity: &str) -> Caller<'_> {
        Caller {
            app: self,
            identity: Some(identity.to_string()),
            profiles: Some("Operatives".to_string()),
        }
    }

    /// A caller with an identity but no profile.
    #[must_use]
    pub fn without_profile(&self, identity: &str) -> Caller<'_> {
        Caller {
            app: self,
            identity: Some(identity.to_string()),
            profiles: None,
        }
    }

    /// A caller with no identity at all.
    #[must_use]
    pub const fn anonymous(&self) -> Caller<'_> {
        Caller {
            app: self,
            identity: None,
            profiles: None,
        }
    }

    /// Plain GET without any identity headers.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get_raw(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("Failed to send request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Sends commands on behalf of one caller.
pub struct Caller<'a> {
    app: &'a TestApp,
    identity: Option<String>,
    profiles: Option<String>,
}

impl Caller<'_> {
    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.identity {
            Some(identity) => request.header(IDENTITY_HEADER, identity),
            None => request,
        };
        match &self.profiles {
            Some(profiles) => request.header(AUTHORITIES_HEADER, profiles),
            None => request,
        }
    }

    /// POST a JSON command, e.g. `post("shopping-list/create", json!({..}))`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn post(&self, command: &str, body: Value) -> (StatusCode, Value) {
        let request = self
            .app
            .client
            .post(format!("{}/api/{command}", self.app.base_url))
            .json(&body);
        read(self.with_headers(request).send().await).await
    }

    /// POST a raw body with a JSON content type.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn post_raw(&self, command: &str, body: &'static str) -> (StatusCode, Value) {
        let request = self
            .app
            .client
            .post(format!("{}/api/{command}", self.app.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        read(self.with_headers(request).send().await).await
    }

    /// GET a query command, e.g. `get("shopping-list/get?awid=a&id=..")`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn get(&self, command: &str) -> (StatusCode, Value) {
        let request = self
            .app
            .client
            .get(format!("{}/api/{command}", self.app.base_url));
        read(self.with_headers(request).send().await).await
    }

    /// Create a list in [`AWID`] and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the list cannot be created.
    pub async fn create_list(&self, name: &str) -> String {
        let (status, body) = self
            .post(
                "shopping-list/create",
                serde_json::json!({ "awid": AWID, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body.get("id")
            .and_then(Value::as_str)
            .expect("Created list has no id")
            .to_string()
    }
}

async fn read(response: reqwest::Result<reqwest::Response>) -> (StatusCode, Value) {
    let response = response.expect("Failed to send request");
    let status = response.status();
    let body = response
        .json::<Value>()
        .await
        .expect("Response is not JSON");
    (status, body)
}

/// The single `uuAppErrorMap` key of an error response.
///
/// # Panics
///
/// Panics if the body has no error entry.
#[must_use]
pub fn error_key(body: &Value) -> String {
    body.get("uuAppErrorMap")
        .and_then(Value::as_object)
        .and_then(|map| map.keys().next().cloned())
        .expect("Response has no uuAppErrorMap entry")
}

//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, ApiError>`: an [`AppError`] tagged with
//! the command that failed. The response body carries a `uuAppErrorMap` keyed
//! `"<command>/<code>"`, each entry holding a `message` and a `paramMap`.
//! Server errors are captured to Sentry before responding.

use std::time::Duration;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use shoplist_core::{Denial, ItemId, ListError, ListId};

use crate::db::RepositoryError;
use crate::services::StoreError;

/// One invalid request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the list API.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields are invalid. Never empty.
    #[error("{}", first_message(.0))]
    Validation(Vec<FieldError>),

    /// The access gate refused the request.
    #[error(transparent)]
    Denied(#[from] Denial),

    /// Shopping list does not exist in this workspace.
    #[error("shopping list {0} not found")]
    ListNotFound(ListId),

    /// Item does not exist on the list.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Storage did not answer in time.
    #[error("storage did not respond within {0:?}")]
    Timeout(Duration),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A single-field validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Tag the error with the command that produced it.
    #[must_use]
    pub const fn during(self, command: &'static str) -> ApiError {
        ApiError {
            command,
            error: self,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Denied(denial) => match denial {
                Denial::Unauthenticated => StatusCode::UNAUTHORIZED,
                Denial::Unauthorized
                | Denial::NotOwner
                | Denial::NotMember
                | Denial::OwnerCannotLeave => StatusCode::FORBIDDEN,
                Denial::AlreadyMember | Denial::CannotRemoveOwner => StatusCode::BAD_REQUEST,
            },
            Self::ListNotFound(_) | Self::ItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error code, the last segment of the `uuAppErrorMap` key.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validationError",
            Self::Denied(denial) => match denial {
                Denial::Unauthenticated => "authenticationError",
                Denial::Unauthorized => "authorizationError",
                Denial::NotOwner => "accessDenied",
                Denial::NotMember => "notMember",
                Denial::AlreadyMember => "memberExists",
                Denial::CannotRemoveOwner => "cannotRemoveOwner",
                Denial::OwnerCannotLeave => "ownerCannotLeave",
            },
            Self::ListNotFound(_) => "listNotFound",
            Self::ItemNotFound(_) => "itemNotFound",
            Self::Timeout(_) => "timeout",
            Self::Repository(_) | Self::Internal(_) => "unexpectedError",
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Internal(_))
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn params(&self) -> Value {
        match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::ListNotFound(id) => json!({ "id": id }),
            Self::ItemNotFound(id) => json!({ "id": id }),
            Self::Timeout(deadline) => json!({ "retryAfterSeconds": retry_after_secs(*deadline) }),
            _ => json!({}),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Denied(denial) => Self::Denied(denial),
            StoreError::ListNotFound(id) => Self::ListNotFound(id),
            StoreError::List(err) => err.into(),
            StoreError::Repository(err) => Self::Repository(err),
            StoreError::Timeout(deadline) => Self::Timeout(deadline),
        }
    }
}

impl From<ListError> for AppError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::MemberExists => Self::Denied(Denial::AlreadyMember),
            ListError::CannotRemoveOwner => Self::Denied(Denial::CannotRemoveOwner),
            ListError::OwnerCannotLeave => Self::Denied(Denial::OwnerCannotLeave),
            ListError::NotMember => Self::Denied(Denial::NotMember),
            ListError::ItemNotFound(id) => Self::ItemNotFound(id),
            ListError::InvalidDocument(reason) => Self::Internal(reason.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid("query", rejection.body_text())
    }
}

/// An [`AppError`] raised while running a named command.
#[derive(Debug, Error)]
#[error("{command}: {error}")]
pub struct ApiError {
    pub command: &'static str,
    #[source]
    pub error: AppError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self { command, error } = self;

        // Capture server errors to Sentry
        if error.is_server_error() {
            let event_id = sentry::capture_error(&error);
            tracing::error!(
                command,
                error = %error,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = error.status();
        let message = error.public_message();
        let mut error_map = serde_json::Map::new();
        error_map.insert(
            format!("{command}/{}", error.code()),
            json!({ "message": message, "paramMap": error.params() }),
        );
        let body = json!({
            "status": status.as_u16(),
            "error": message,
            "uuAppErrorMap": error_map,
        });

        let mut response = (status, Json(body)).into_response();
        if let AppError::Timeout(deadline) = error {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(deadline)));
        }
        response
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Attach a command name to any error convertible into [`AppError`].
pub trait ResultExt<T> {
    /// # Errors
    ///
    /// Returns the original error wrapped in an [`ApiError`].
    fn during(self, command: &'static str) -> Result<T>;
}

impl<T, E: Into<AppError>> ResultExt<T> for std::result::Result<T, E> {
    fn during(self, command: &'static str) -> Result<T> {
        self.map_err(|e| e.into().during(command))
    }
}

/// Set the Sentry user context from the caller's identity.
pub fn set_sentry_user(identity: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity.to_string()),
            ..Default::default()
        }));
    });
}

fn first_message(errors: &[FieldError]) -> &str {
    errors.first().map_or("invalid request", |e| e.message.as_str())
}

fn retry_after_secs(deadline: Duration) -> u64 {
    deadline.as_secs().max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.during("shoppingList/get").into_response().status()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::invalid("name", "name is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(Denial::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(Denial::Unauthorized.into()), StatusCode::FORBIDDEN);
        assert_eq!(get_status(Denial::NotOwner.into()), StatusCode::FORBIDDEN);
        assert_eq!(get_status(Denial::NotMember.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(Denial::AlreadyMember.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(Denial::OwnerCannotLeave.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::ListNotFound(ListId::generate())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Timeout(Duration::from_secs(10))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_list_errors_map_to_conflict_codes() {
        assert_eq!(AppError::from(ListError::MemberExists).code(), "memberExists");
        assert_eq!(
            AppError::from(ListError::CannotRemoveOwner).code(),
            "cannotRemoveOwner"
        );
        assert_eq!(
            AppError::from(ListError::OwnerCannotLeave).code(),
            "ownerCannotLeave"
        );
        assert_eq!(
            AppError::from(ListError::ItemNotFound(ItemId::generate())).code(),
            "itemNotFound"
        );
    }

    #[tokio::test]
    async fn test_error_map_keyed_by_command() {
        let response = AppError::Validation(vec![
            FieldError::new("name", "name is required"),
            FieldError::new("awid", "awid is required"),
        ])
        .during("shoppingList/create")
        .into_response();
        let body = body_json(response).await;

        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "name is required");
        let entry = &body["uuAppErrorMap"]["shoppingList/create/validationError"];
        assert_eq!(entry["message"], "name is required");
        assert_eq!(entry["paramMap"]["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("connection refused on 10.0.0.3".to_string())
            .during("shoppingList/get")
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("10.0.0.3"));
        assert!(body["uuAppErrorMap"]["shoppingList/get/unexpectedError"].is_object());
    }

    #[test]
    fn test_timeout_sets_retry_after() {
        let response = AppError::Timeout(Duration::from_secs(10))
            .during("shoppingList/list")
            .into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "10");
    }
}

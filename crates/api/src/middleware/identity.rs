//! Caller identity extraction.
//!
//! The service sits behind a gateway that authenticates users and forwards
//! who they are in two headers:
//!
//! - `x-uu-identity` - the caller's identity
//! - `x-authorities` - comma-separated profiles (`Authorities`, `Operatives`)
//!
//! Missing or malformed values yield an anonymous caller; the access gate
//! turns that into an authentication error for the command being run.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use shoplist_core::{Caller, Identity, Profile};

use crate::error::set_sentry_user;

/// Header carrying the caller's identity.
pub const IDENTITY_HEADER: &str = "x-uu-identity";

/// Header carrying the caller's comma-separated profiles.
pub const AUTHORITIES_HEADER: &str = "x-authorities";

/// Extractor for the calling user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentCaller(caller): CurrentCaller) -> impl IntoResponse {
///     format!("{:?}", caller.identity())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller);

impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let identity = header(IDENTITY_HEADER).and_then(|raw| Identity::parse(&raw).ok());
        let profiles = header(AUTHORITIES_HEADER)
            .map(|raw| parse_profiles(&raw))
            .unwrap_or_default();

        if let Some(identity) = &identity {
            Span::current().record("identity", identity.as_str());
            set_sentry_user(identity.as_str());
        }

        Ok(Self(Caller::new(identity, profiles)))
    }
}

/// Parse a comma-separated profile list, skipping unknown names.
fn parse_profiles(raw: &str) -> Vec<Profile> {
    raw.split(',')
        .filter_map(|p| p.parse::<Profile>().ok())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(headers: &[(&str, &str)]) -> Caller {
        let mut builder = Request::builder().uri("/api/shopping-list/list");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        let CurrentCaller(caller) = CurrentCaller::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        caller
    }

    #[tokio::test]
    async fn test_no_headers_is_anonymous() {
        assert_eq!(extract(&[]).await, Caller::anonymous());
    }

    #[tokio::test]
    async fn test_identity_and_profiles() {
        let caller = extract(&[
            (IDENTITY_HEADER, "alice"),
            (AUTHORITIES_HEADER, "Operatives, Authorities"),
        ])
        .await;
        assert_eq!(caller.identity().unwrap().as_str(), "alice");
        assert_eq!(caller.profiles().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_identity_is_anonymous() {
        let caller = extract(&[(IDENTITY_HEADER, "   "), (AUTHORITIES_HEADER, "Operatives")]).await;
        assert!(caller.identity().is_none());
    }

    #[test]
    fn test_unknown_profiles_skipped() {
        assert_eq!(
            parse_profiles("Operatives,Visitors,,"),
            vec![Profile::Operatives]
        );
    }
}

//! Authentication extractors.
//!
//! The gateway keeps no sessions. Each request carries the bearer token the
//! profile service issued at login, and handlers forward it to the backends.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use cybermart_core::{BearerToken, CredentialError};

use crate::error::AppError;

/// Read the bearer credential from the `Authorization` header.
fn bearer_from_parts(parts: &Parts) -> Result<BearerToken, CredentialError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::Missing)?
        .to_str()
        .map_err(|_| CredentialError::WrongScheme)?;
    BearerToken::from_header(header)
}

/// Extractor that requires a bearer credential.
///
/// Responds `401 { "error": ... }` if the header is missing or malformed.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     State(state): State<AppState>,
///     RequireAuth(token): RequireAuth,
/// ) -> Result<Json<UserProfile>> {
///     Ok(Json(state.marketplace().profile().profile(&token).await?))
/// }
/// ```
pub struct RequireAuth(pub BearerToken);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_from_parts(parts)
            .map(Self)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}

/// Extractor that optionally gets the bearer credential.
///
/// Unlike `RequireAuth`, a missing or malformed header is simply `None`.
pub struct OptionalAuth(pub Option<BearerToken>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_from_parts(parts).ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_require_auth() {
        let mut ok = parts(Some("Bearer tok-1"));
        let RequireAuth(token) = RequireAuth::from_request_parts(&mut ok, &()).await.unwrap();
        assert_eq!(token.expose(), "tok-1");

        let mut missing = parts(None);
        let err = RequireAuth::from_request_parts(&mut missing, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let mut basic = parts(Some("Basic abc"));
        assert!(RequireAuth::from_request_parts(&mut basic, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_optional_auth() {
        let mut missing = parts(None);
        let OptionalAuth(token) = OptionalAuth::from_request_parts(&mut missing, &()).await.unwrap();
        assert!(token.is_none());

        let mut ok = parts(Some("bearer tok-2"));
        let OptionalAuth(token) = OptionalAuth::from_request_parts(&mut ok, &()).await.unwrap();
        assert_eq!(token.unwrap().expose(), "tok-2");
    }
}

//! Bearer credential passed to every marketplace backend.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors parsing an `Authorization` header value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No token was supplied.
    #[error("missing bearer token")]
    Missing,
    /// The header did not use the `Bearer` scheme.
    #[error("authorization header must use the Bearer scheme")]
    WrongScheme,
}

/// An opaque bearer token issued by the profile service at login.
///
/// The token is held as a [`SecretString`] so it never shows up in `Debug`
/// output or tracing fields.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] for a blank token.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Missing);
        }
        Ok(Self(SecretString::from(trimmed.to_owned())))
    }

    /// Parse an `Authorization` header value (`Bearer <token>`).
    ///
    /// The scheme is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme is not `Bearer` or the token is blank.
    pub fn from_header(value: &str) -> Result<Self, CredentialError> {
        let value = value.trim();
        let (scheme, token) = value.split_once(' ').ok_or_else(|| {
            if value.eq_ignore_ascii_case("bearer") || value.is_empty() {
                CredentialError::Missing
            } else {
                CredentialError::WrongScheme
            }
        })?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(CredentialError::WrongScheme);
        }
        Self::new(token)
    }

    /// The raw token, for building outgoing headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// The full `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for BearerToken {}

impl std::hash::Hash for BearerToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.expose().hash(state);
    }
}

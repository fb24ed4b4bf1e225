//! CLI command implementations.
//!
//! Each command talks to the marketplace backends through the same clients
//! and state machines the storefront gateway uses, then prints JSON.

pub mod account;
pub mod catalog;
pub mod sales;
pub mod shop;

use cybermart_core::{BearerToken, CredentialError};
use cybermart_storefront::backend::{BackendError, Marketplace};
use cybermart_storefront::checkout::CheckoutError;
use cybermart_storefront::config::{ConfigError, StorefrontConfig};
use cybermart_storefront::membership::MembershipError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs a token and none was given.
    #[error("Not logged in: pass --token or set CYBERMART_TOKEN")]
    MissingToken,

    /// The token could not be used.
    #[error("Invalid token: {0}")]
    Token(#[from] CredentialError),

    /// Environment configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command argument was rejected before any request.
    #[error("{0}")]
    Invalid(String),

    /// A backend call failed.
    #[error("{}", .0.user_message())]
    Backend(#[from] BackendError),

    /// The checkout flow failed.
    #[error("{}", .0.user_message())]
    Checkout(#[from] CheckoutError),

    /// A wishlist change failed.
    #[error("{}", .0.user_message())]
    Membership(#[from] MembershipError),

    /// Output could not be encoded.
    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading from the terminal failed.
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),
}

/// What every command needs: configuration, backend clients and the token.
pub struct Context {
    pub config: StorefrontConfig,
    pub marketplace: Marketplace,
    token: Option<BearerToken>,
}

impl Context {
    /// Load configuration and build the backend clients.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration or a blank token.
    pub fn new(token: Option<&str>) -> Result<Self, CliError> {
        let config = StorefrontConfig::from_env()?;
        let marketplace = Marketplace::new(&config.services, config.catalog_cache_ttl)?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .map(BearerToken::new)
            .transpose()?;
        Ok(Self {
            config,
            marketplace,
            token,
        })
    }

    /// The token, for commands that require one.
    ///
    /// # Errors
    ///
    /// Returns `CliError::MissingToken` if none was given.
    pub fn token(&self) -> Result<&BearerToken, CliError> {
        self.token.as_ref().ok_or(CliError::MissingToken)
    }

    /// The token, for commands that work anonymously too.
    pub fn optional_token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

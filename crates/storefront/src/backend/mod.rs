//! Clients for the three marketplace backends.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest` 0.13, one shared connection pool
//! - The backends are the source of truth; nothing here is persisted
//! - Catalog reads are cached in memory via `moka` (5 minute TTL)
//! - Every remote failure collapses to one user-facing string via
//!   [`BackendError::user_message`]
//!
//! # Services
//!
//! ## Profile
//! - Login/signup, own profile, public seller profiles
//!
//! ## Catalog
//! - Products, categories, search, seller product management
//! - Wishlist entries and cart writes (`PUT /cart` upsert-or-remove)
//!
//! ## Cart/order
//! - Cart reads, payment intents, orders, seller sales
//!
//! The state machines in [`crate::checkout`] and [`crate::membership`] only see
//! the [`CartBackend`], [`OrderBackend`] and [`MembershipBackend`] traits, so
//! they can be driven by in-memory fakes in tests.

mod cache;
mod catalog;
mod conversions;
mod orders;
mod profile;
pub mod types;
mod wire;

pub use catalog::CatalogClient;
pub use orders::OrderClient;
pub use profile::ProfileClient;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cybermart_core::{BearerToken, ProductId};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::cart::Cart;
use crate::config::ServiceEndpoints;

/// Fallback message when a failure carries nothing readable.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when talking to a marketplace backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A 2xx response whose body carried an `error` string.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON, but not the shape this endpoint promises.
    #[error("Unexpected response: {0}")]
    UnexpectedShape(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl BackendError {
    /// The single string shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => {
                "The marketplace took too long to respond. Please try again.".to_string()
            }
            Self::Http(_) => "Could not reach the marketplace. Please try again.".to_string(),
            Self::Status { message, .. } | Self::Rejected(message) if !message.trim().is_empty() => {
                message.clone()
            }
            Self::NotFound(what) => format!("{what} not found"),
            Self::Parse(_) | Self::UnexpectedShape(_) => {
                "Unexpected response from the marketplace".to_string()
            }
            Self::Status { .. } | Self::Rejected(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// HTTP status reported by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Whether the backend refused the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

// =============================================================================
// RestClient
// =============================================================================

/// JSON-over-HTTP plumbing shared by the service clients.
///
/// Holds one base URL; paths are joined relative to it.
#[derive(Clone)]
pub(crate) struct RestClient {
    http: reqwest::Client,
    base: Url,
    service: &'static str,
}

impl RestClient {
    pub(crate) const fn new(http: reqwest::Client, base: Url, service: &'static str) -> Self {
        Self {
            http,
            base,
            service,
        }
    }

    /// Resolve a path beneath the base URL.
    ///
    /// Every segment is percent-encoded so ids and search text cannot escape
    /// the path they are placed in. No segments yields the base itself,
    /// trailing slash included.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if segments.is_empty() {
            return url;
        }
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer credential when given.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.header_value()),
            None => builder,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&BearerToken>,
    ) -> Result<T, BackendError> {
        self.execute(self.request(Method::GET, self.url(segments), token))
            .await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&BearerToken>,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, self.url(segments), token).json(body))
            .await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&BearerToken>,
    ) -> Result<T, BackendError> {
        self.execute(self.request(Method::DELETE, self.url(segments), token))
            .await
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty body decodes as JSON `null`, so `IgnoredAny` and `Option<_>`
    /// targets accept bodiless responses.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(service = self.service, error = %e, "Backend request failed");
        })?;

        let status = response.status();

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                service = self.service,
                status = %status,
                body = %truncate(&response_text, 500),
                "Backend returned non-success status"
            );
            return Err(match error_message(&response_text) {
                None if status == StatusCode::NOT_FOUND => {
                    BackendError::NotFound("Resource".to_string())
                }
                message => BackendError::Status {
                    status: status.as_u16(),
                    message: message
                        .unwrap_or_else(|| fallback_status_message(status, &response_text)),
                },
            });
        }

        let value: serde_json::Value = if response_text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    service = self.service,
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse backend response"
                );
                BackendError::Parse(e)
            })?
        };

        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            tracing::debug!(service = self.service, message, "Backend rejected request");
            return Err(BackendError::Rejected(message.to_string()));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!(
                service = self.service,
                error = %e,
                "Backend response did not match the expected shape"
            );
            BackendError::Parse(e)
        })
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message", "msg"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
}

fn fallback_status_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        // HTML error pages are useless to the shopper
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        truncate(body, 200)
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// =============================================================================
// Marketplace
// =============================================================================

/// All three backend clients behind one cheap-to-clone handle.
#[derive(Clone)]
pub struct Marketplace {
    inner: Arc<MarketplaceInner>,
}

struct MarketplaceInner {
    profile: ProfileClient,
    catalog: CatalogClient,
    orders: OrderClient,
}

impl Marketplace {
    /// Build the clients for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (e.g. the TLS
    /// backend fails to initialize).
    pub fn new(endpoints: &ServiceEndpoints, catalog_cache_ttl: Duration) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = endpoints.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(MarketplaceInner {
                profile: ProfileClient::new(RestClient::new(
                    http.clone(),
                    endpoints.profile.clone(),
                    "profile",
                )),
                catalog: CatalogClient::new(
                    RestClient::new(http.clone(), endpoints.catalog.clone(), "catalog"),
                    catalog_cache_ttl,
                ),
                orders: OrderClient::new(RestClient::new(http, endpoints.orders.clone(), "orders")),
            }),
        })
    }

    /// Profile/auth client.
    #[must_use]
    pub fn profile(&self) -> &ProfileClient {
        &self.inner.profile
    }

    /// Catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Cart/order client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }
}

// =============================================================================
// Backend seams
// =============================================================================

/// Cart reads and writes.
///
/// Reads go to the cart/order service, writes to the catalog service.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Fetch the caller's cart.
    async fn fetch_cart(&self, token: &BearerToken) -> Result<Cart, BackendError>;

    /// Upsert or remove one cart line.
    async fn manage_cart(
        &self,
        token: &BearerToken,
        mutation: &CartMutation,
    ) -> Result<(), BackendError>;
}

/// Payment intents and order creation.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Request a payment intent for an amount in minor units.
    async fn create_payment_intent(&self, amount_minor: i64) -> Result<PaymentIntent, BackendError>;

    /// Record an order. The key is sent as `Idempotency-Key`.
    async fn create_order(
        &self,
        token: &BearerToken,
        order: &OrderDraft,
        idempotency_key: &str,
    ) -> Result<OrderReceipt, BackendError>;
}

/// Server-side membership lists (wishlist and cart) seen as sets of ids.
#[async_trait]
pub trait MembershipBackend: Send + Sync {
    /// Current members of the list.
    async fn fetch_members(
        &self,
        kind: MembershipKind,
        token: &BearerToken,
    ) -> Result<Vec<ProductId>, BackendError>;

    /// Add (`member == true`) or remove a product.
    async fn set_member(
        &self,
        kind: MembershipKind,
        token: &BearerToken,
        product_id: &ProductId,
        member: bool,
    ) -> Result<(), BackendError>;
}

#[async_trait]
impl CartBackend for Marketplace {
    async fn fetch_cart(&self, token: &BearerToken) -> Result<Cart, BackendError> {
        self.orders().cart(token).await
    }

    async fn manage_cart(
        &self,
        token: &BearerToken,
        mutation: &CartMutation,
    ) -> Result<(), BackendError> {
        self.catalog().manage_cart(token, mutation).await
    }
}

#[async_trait]
impl OrderBackend for Marketplace {
    async fn create_payment_intent(&self, amount_minor: i64) -> Result<PaymentIntent, BackendError> {
        self.orders().create_payment_intent(amount_minor).await
    }

    async fn create_order(
        &self,
        token: &BearerToken,
        order: &OrderDraft,
        idempotency_key: &str,
    ) -> Result<OrderReceipt, BackendError> {
        self.orders().create_order(token, order, idempotency_key).await
    }
}

#[async_trait]
impl MembershipBackend for Marketplace {
    #[instrument(skip(self, token))]
    async fn fetch_members(
        &self,
        kind: MembershipKind,
        token: &BearerToken,
    ) -> Result<Vec<ProductId>, BackendError> {
        match kind {
            MembershipKind::Wishlist => Ok(conversions::product_ids(
                &self.catalog().wishlist(token).await?,
            )),
            MembershipKind::Cart => Ok(self.orders().cart(token).await?.member_ids()),
        }
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn set_member(
        &self,
        kind: MembershipKind,
        token: &BearerToken,
        product_id: &ProductId,
        member: bool,
    ) -> Result<(), BackendError> {
        match (kind, member) {
            (MembershipKind::Wishlist, true) => {
                self.catalog().add_to_wishlist(token, product_id).await
            }
            (MembershipKind::Wishlist, false) => {
                self.catalog().remove_from_wishlist(token, product_id).await
            }
            (MembershipKind::Cart, true) => {
                self.catalog()
                    .manage_cart(token, &CartMutation::add(product_id.clone(), 1))
                    .await
            }
            (MembershipKind::Cart, false) => {
                self.catalog()
                    .manage_cart(token, &CartMutation::remove(product_id.clone(), None, None))
                    .await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(reqwest::Client::new(), Url::parse(base).unwrap(), "test")
    }

    #[test]
    fn test_url_joins_beneath_base() {
        let rest = client("http://localhost:8002/api/");
        assert_eq!(
            rest.url(&["product", "create"]).as_str(),
            "http://localhost:8002/api/product/create"
        );
        assert_eq!(rest.url(&[]).as_str(), "http://localhost:8002/api/");
    }

    #[test]
    fn test_url_without_segments_keeps_prefix_slash() {
        let rest = client("http://localhost:8001/profile/");
        assert_eq!(rest.url(&[]).as_str(), "http://localhost:8001/profile/");
        assert_eq!(
            rest.url(&["login"]).as_str(),
            "http://localhost:8001/profile/login"
        );

        let root = client("http://localhost:8002/");
        assert_eq!(root.url(&[]).as_str(), "http://localhost:8002/");
    }

    #[test]
    fn test_url_encodes_segments() {
        let rest = client("http://localhost:8002/");
        assert_eq!(
            rest.url(&["search", "red shoes/50%"]).as_str(),
            "http://localhost:8002/search/red%20shoes%2F50%25"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(r#"{"message":"Product not found"}"#).as_deref(),
            Some("Product not found")
        );
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(
            fallback_status_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_user_message() {
        let err = BackendError::Status {
            status: 400,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.user_message(), "Out of stock");
        assert_eq!(err.status(), Some(400));

        let err = BackendError::Rejected(String::new());
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let err = BackendError::NotFound("Product".to_string());
        assert_eq!(err.user_message(), "Product not found");

        let err = BackendError::UnexpectedShape("orders".to_string());
        assert_eq!(err.user_message(), "Unexpected response from the marketplace");

        let err = BackendError::Status {
            status: 401,
            message: "Token expired".to_string(),
        };
        assert!(err.is_unauthorized());
    }
}

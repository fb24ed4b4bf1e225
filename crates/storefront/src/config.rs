//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults match a local development deployment
//! where the three backends run side by side.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PROFILE_SERVICE_URL` - Profile/auth service (default: `http://localhost:8001/`)
//! - `CATALOG_SERVICE_URL` - Catalog service (default: `http://localhost:8002/`)
//! - `ORDER_SERVICE_URL` - Cart/order service (default: `http://localhost:8003/`)
//! - `PAYMENT_PUBLISHABLE_KEY` - Payment provider publishable key handed to the widget
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout for backend calls (default: none)
//! - `CHECKOUT_REDIRECT_DELAY_MS` - Delay before redirecting to order history (default: 2000)
//! - `SHOPPER_STATE_TTL_SECS` - Idle lifetime of per-shopper state (default: 1800)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PROFILE_URL: &str = "http://localhost:8001/";
const DEFAULT_CATALOG_URL: &str = "http://localhost:8002/";
const DEFAULT_ORDER_URL: &str = "http://localhost:8003/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Marketplace backend locations
    pub services: ServiceEndpoints,
    /// Checkout behaviour
    pub checkout: CheckoutConfig,
    /// Idle lifetime of per-shopper state
    pub shopper_state_ttl: Duration,
    /// Lifetime of cached catalog responses
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Base URLs of the three marketplace backends.
///
/// Every URL ends with `/` so relative paths join underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Profile/auth service
    pub profile: Url,
    /// Catalog service (products, wishlist, cart writes)
    pub catalog: Url,
    /// Cart/order service (cart reads, orders, payment intents)
    pub orders: Url,
    /// Optional timeout applied to every backend request
    pub timeout: Option<Duration>,
}

/// Checkout flow settings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Publishable key for the payment widget (safe to expose)
    pub publishable_key: Option<String>,
    /// How long the success notice shows before redirecting to order history
    pub redirect_delay: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            publishable_key: None,
            redirect_delay: Duration::from_millis(2000),
        }
    }
}

impl ServiceEndpoints {
    /// Endpoints for services running on localhost with the default ports.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; the `Result` keeps the
    /// signature aligned with [`ServiceEndpoints::new`].
    pub fn local() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_PROFILE_URL, DEFAULT_CATALOG_URL, DEFAULT_ORDER_URL)
    }

    /// Build endpoints from three base URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a URL does not parse or is not
    /// http(s).
    pub fn new(profile: &str, catalog: &str, orders: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            profile: parse_base_url("PROFILE_SERVICE_URL", profile)?,
            catalog: parse_base_url("CATALOG_SERVICE_URL", catalog)?,
            orders: parse_base_url("ORDER_SERVICE_URL", orders)?,
            timeout: None,
        })
    }

    /// Same endpoints with a request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn from_env() -> Result<Self, ConfigError> {
        let endpoints = Self::new(
            &get_env_or_default("PROFILE_SERVICE_URL", DEFAULT_PROFILE_URL),
            &get_env_or_default("CATALOG_SERVICE_URL", DEFAULT_CATALOG_URL),
            &get_env_or_default("ORDER_SERVICE_URL", DEFAULT_ORDER_URL),
        )?;
        let timeout = get_optional_parsed::<u64>("UPSTREAM_TIMEOUT_SECS")?.map(Duration::from_secs);
        Ok(endpoints.with_timeout(timeout))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let services = ServiceEndpoints::from_env()?;
        let checkout = CheckoutConfig {
            publishable_key: get_optional_env("PAYMENT_PUBLISHABLE_KEY"),
            redirect_delay: Duration::from_millis(get_parsed_or_default(
                "CHECKOUT_REDIRECT_DELAY_MS",
                "2000",
            )?),
        };
        let shopper_state_ttl =
            Duration::from_secs(get_parsed_or_default("SHOPPER_STATE_TTL_SECS", "1800")?);
        let catalog_cache_ttl =
            Duration::from_secs(get_parsed_or_default("CATALOG_CACHE_TTL_SECS", "300")?);

        Ok(Self {
            host,
            port,
            services,
            checkout,
            shopper_state_ttl,
            catalog_cache_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Configuration pointing at the given backends, with every other value
    /// at its default. Used by tests and embedders.
    #[must_use]
    pub fn with_services(services: ServiceEndpoints) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            services,
            checkout: CheckoutConfig::default(),
            shopper_state_ttl: Duration::from_secs(1800),
            catalog_cache_ttl: Duration::from_secs(300),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a backend base URL, forcing a trailing slash so joins stay beneath it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default string.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional environment variable.
fn get_optional_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

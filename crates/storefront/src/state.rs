//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendError, Marketplace};
use crate::config::StorefrontConfig;
use crate::shopper::ShopperStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend clients, per-shopper state and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    marketplace: Marketplace,
    shoppers: ShopperStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the backends cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let marketplace = Marketplace::new(&config.services, config.catalog_cache_ttl)?;
        let shoppers = ShopperStore::new(config.shopper_state_ttl, config.checkout.redirect_delay);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                marketplace,
                shoppers,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend clients.
    #[must_use]
    pub fn marketplace(&self) -> &Marketplace {
        &self.inner.marketplace
    }

    /// Get a reference to the per-shopper state store.
    #[must_use]
    pub fn shoppers(&self) -> &ShopperStore {
        &self.inner.shoppers
    }
}

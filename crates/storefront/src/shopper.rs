//! Per-shopper state: membership mirrors and the checkout flow.
//!
//! Keyed by bearer credential and held in a `moka` cache with an idle
//! timeout. Nothing here is authoritative; an evicted entry is rebuilt from
//! the backends on next use.

use std::sync::Arc;
use std::time::Duration;

use cybermart_core::BearerToken;
use moka::future::Cache;
use tokio::sync::Mutex;

use crate::backend::MembershipKind;
use crate::checkout::CheckoutFlow;
use crate::membership::MembershipSet;

/// Upper bound on concurrently tracked shoppers.
const MAX_SHOPPERS: u64 = 10_000;

/// One shopper's client-side state.
#[derive(Debug)]
pub struct ShopperState {
    /// Wishlist membership mirror.
    pub wishlist: MembershipSet,
    /// Cart membership mirror.
    pub cart: MembershipSet,
    /// Cart view and checkout.
    pub checkout: CheckoutFlow,
}

impl ShopperState {
    /// Fresh state with nothing loaded.
    #[must_use]
    pub fn new(redirect_delay: Duration) -> Self {
        Self {
            wishlist: MembershipSet::new(MembershipKind::Wishlist),
            cart: MembershipSet::new(MembershipKind::Cart),
            checkout: CheckoutFlow::new(redirect_delay),
        }
    }

    /// The mirror for one list.
    pub const fn membership_mut(&mut self, kind: MembershipKind) -> &mut MembershipSet {
        match kind {
            MembershipKind::Wishlist => &mut self.wishlist,
            MembershipKind::Cart => &mut self.cart,
        }
    }
}

/// Shared handle to one shopper's state.
pub type SharedShopper = Arc<Mutex<ShopperState>>;

/// Store of shopper state keyed by credential.
#[derive(Clone)]
pub struct ShopperStore {
    cache: Cache<BearerToken, SharedShopper>,
    redirect_delay: Duration,
}

impl ShopperStore {
    /// Create a store whose entries expire after `idle_ttl` without use.
    #[must_use]
    pub fn new(idle_ttl: Duration, redirect_delay: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SHOPPERS)
            .time_to_idle(idle_ttl)
            .build();
        Self {
            cache,
            redirect_delay,
        }
    }

    /// State for a credential, created on first use.
    pub async fn get(&self, token: &BearerToken) -> SharedShopper {
        let redirect_delay = self.redirect_delay;
        self.cache
            .get_with(token.clone(), async move {
                Arc::new(Mutex::new(ShopperState::new(redirect_delay)))
            })
            .await
    }

    /// Drop a credential's state.
    pub async fn forget(&self, token: &BearerToken) {
        self.cache.invalidate(token).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cybermart_core::ProductId;

    #[tokio::test]
    async fn test_same_token_shares_state() {
        let store = ShopperStore::new(Duration::from_secs(60), Duration::from_millis(10));
        let token = BearerToken::new("a").unwrap();

        let first = store.get(&token).await;
        first.lock().await.wishlist.replace([ProductId::new("p1")]);

        let again = store.get(&token).await;
        assert!(Arc::ptr_eq(&first, &again));
        assert!(again.lock().await.wishlist.contains(&ProductId::new("p1")));

        let other = store.get(&BearerToken::new("b").unwrap()).await;
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn test_forget_resets() {
        let store = ShopperStore::new(Duration::from_secs(60), Duration::from_millis(10));
        let token = BearerToken::new("a").unwrap();
        store.get(&token).await.lock().await.cart.replace([ProductId::new("p1")]);

        store.forget(&token).await;
        let fresh = store.get(&token).await;
        let state = fresh.lock().await;
        assert!(!state.cart.is_loaded());
        assert!(state.checkout.is_idle());
    }
}

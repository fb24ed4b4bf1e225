//! Client-side mirror of wishlist and cart membership.
//!
//! A [`MembershipSet`] answers "is this product in my wishlist/cart?" without
//! a round trip, and turns a click into exactly one add or remove call.
//!
//! A toggle runs in two halves so the caller can drop its lock while the
//! backend call is in flight:
//!
//! 1. [`MembershipSet::begin`] decides the desired state and marks the product
//!    pending. A second toggle for a pending product is rejected.
//! 2. [`MembershipSet::complete`] records the outcome. A failed call leaves
//!    membership as it was.
//!
//! [`MembershipSet::toggle`] and [`MembershipSet::set`] run both halves for
//! callers that own the set outright.

use std::collections::HashSet;

use cybermart_core::{BearerToken, ProductId};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::backend::{BackendError, MembershipBackend, MembershipKind};

/// Errors from a membership change.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// A change for this product is already in flight.
    #[error("Still updating this product, please wait")]
    Pending(ProductId),

    /// The backend call failed; membership is unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl MembershipError {
    /// The single string shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            Self::Pending(_) => self.to_string(),
        }
    }
}

/// A change that has been started but not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending change must be completed"]
pub struct PendingChange {
    /// Target product.
    pub product_id: ProductId,
    /// Membership wanted after the call.
    pub desired: bool,
    /// Whether a backend call is needed at all.
    pub needs_call: bool,
}

/// Serializable snapshot of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipSnapshot {
    /// Which list this mirrors.
    pub kind: MembershipKind,
    /// Members, sorted.
    pub product_ids: Vec<ProductId>,
    /// Products with a change in flight, sorted.
    pub pending: Vec<ProductId>,
}

/// Set of product ids mirroring one server-side list.
#[derive(Debug, Clone)]
pub struct MembershipSet {
    kind: MembershipKind,
    members: HashSet<ProductId>,
    pending: HashSet<ProductId>,
    loaded: bool,
}

impl MembershipSet {
    /// An empty, not-yet-loaded set.
    #[must_use]
    pub fn new(kind: MembershipKind) -> Self {
        Self {
            kind,
            members: HashSet::new(),
            pending: HashSet::new(),
            loaded: false,
        }
    }

    /// Which list this mirrors.
    #[must_use]
    pub const fn kind(&self) -> MembershipKind {
        self.kind
    }

    /// Whether the set has been filled from the server.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a product is a member.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.members.contains(product_id)
    }

    /// Whether a product has a change in flight.
    #[must_use]
    pub fn is_pending(&self, product_id: &ProductId) -> bool {
        self.pending.contains(product_id)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Replace the members with what the server reported.
    ///
    /// Products with a change in flight keep their local membership.
    pub fn replace(&mut self, product_ids: impl IntoIterator<Item = ProductId>) {
        let mut fresh: HashSet<ProductId> = product_ids.into_iter().collect();
        for id in &self.pending {
            if self.members.contains(id) {
                fresh.insert(id.clone());
            } else {
                fresh.remove(id);
            }
        }
        self.members = fresh;
        self.loaded = true;
    }

    /// Fill the set from the server.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the set is left as it was.
    #[instrument(skip(self, backend, token), fields(kind = %self.kind))]
    pub async fn refresh<B>(&mut self, backend: &B, token: &BearerToken) -> Result<(), BackendError>
    where
        B: MembershipBackend + ?Sized,
    {
        let ids = backend.fetch_members(self.kind, token).await?;
        debug!(count = ids.len(), "Membership refreshed");
        self.replace(ids);
        Ok(())
    }

    /// Start a toggle: flip the product's membership.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Pending` if a change for the product is
    /// already in flight.
    pub fn begin_toggle(&mut self, product_id: &ProductId) -> Result<PendingChange, MembershipError> {
        let desired = !self.contains(product_id);
        self.begin(product_id, desired)
    }

    /// Start a change towards `desired`.
    ///
    /// When the product is already in the desired state no call is needed and
    /// nothing is marked pending.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Pending` if a change for the product is
    /// already in flight.
    pub fn begin(&mut self, product_id: &ProductId, desired: bool) -> Result<PendingChange, MembershipError> {
        if self.pending.contains(product_id) {
            return Err(MembershipError::Pending(product_id.clone()));
        }
        let needs_call = self.contains(product_id) != desired;
        if needs_call {
            self.pending.insert(product_id.clone());
        }
        Ok(PendingChange {
            product_id: product_id.clone(),
            desired,
            needs_call,
        })
    }

    /// Record the outcome of a change and return the resulting membership.
    ///
    /// # Errors
    ///
    /// Returns the backend error; membership is left as it was.
    pub fn complete(
        &mut self,
        change: PendingChange,
        outcome: Result<(), BackendError>,
    ) -> Result<bool, MembershipError> {
        self.pending.remove(&change.product_id);
        match outcome {
            Ok(()) => {
                if change.desired {
                    self.members.insert(change.product_id);
                } else {
                    self.members.remove(&change.product_id);
                }
                Ok(change.desired)
            }
            Err(e) => {
                warn!(kind = %self.kind, product_id = %change.product_id, error = %e, "Membership change failed");
                Err(e.into())
            }
        }
    }

    /// Flip a product's membership with one backend call.
    ///
    /// # Errors
    ///
    /// Returns `Pending` or the backend error.
    pub async fn toggle<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
        product_id: &ProductId,
    ) -> Result<bool, MembershipError>
    where
        B: MembershipBackend + ?Sized,
    {
        let change = self.begin_toggle(product_id)?;
        self.run(backend, token, change).await
    }

    /// Bring a product to the desired membership. Once settled, repeating the
    /// call performs no backend request.
    ///
    /// # Errors
    ///
    /// Returns `Pending` or the backend error.
    pub async fn set<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
        product_id: &ProductId,
        desired: bool,
    ) -> Result<bool, MembershipError>
    where
        B: MembershipBackend + ?Sized,
    {
        let change = self.begin(product_id, desired)?;
        self.run(backend, token, change).await
    }

    async fn run<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
        change: PendingChange,
    ) -> Result<bool, MembershipError>
    where
        B: MembershipBackend + ?Sized,
    {
        let outcome = apply(backend, self.kind, token, &change).await;
        self.complete(change, outcome)
    }

    /// Snapshot for clients.
    #[must_use]
    pub fn snapshot(&self) -> MembershipSnapshot {
        let mut product_ids: Vec<_> = self.members.iter().cloned().collect();
        product_ids.sort();
        let mut pending: Vec<_> = self.pending.iter().cloned().collect();
        pending.sort();
        MembershipSnapshot {
            kind: self.kind,
            product_ids,
            pending,
        }
    }
}

/// Perform the backend half of a change. A change that needs no call
/// succeeds immediately.
///
/// # Errors
///
/// Returns the backend error.
pub async fn apply<B>(
    backend: &B,
    kind: MembershipKind,
    token: &BearerToken,
    change: &PendingChange,
) -> Result<(), BackendError>
where
    B: MembershipBackend + ?Sized,
{
    if !change.needs_call {
        return Ok(());
    }
    backend
        .set_member(kind, token, &change.product_id, change.desired)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct FakeLists {
        members: Mutex<HashSet<ProductId>>,
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl MembershipBackend for FakeLists {
        async fn fetch_members(
            &self,
            _kind: MembershipKind,
            _token: &BearerToken,
        ) -> Result<Vec<ProductId>, BackendError> {
            Ok(self.members.lock().unwrap().iter().cloned().collect())
        }

        async fn set_member(
            &self,
            _kind: MembershipKind,
            _token: &BearerToken,
            product_id: &ProductId,
            member: bool,
        ) -> Result<(), BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(BackendError::Rejected("Error adding product to wishlist".to_string()));
            }
            let mut members = self.members.lock().unwrap();
            if member {
                members.insert(product_id.clone());
            } else {
                members.remove(product_id);
            }
            Ok(())
        }
    }

    fn token() -> BearerToken {
        BearerToken::new("t").unwrap()
    }

    #[tokio::test]
    async fn test_toggle_flips_exactly_one_bit() {
        let backend = FakeLists::default();
        backend.members.lock().unwrap().insert(ProductId::new("b"));

        let mut set = MembershipSet::new(MembershipKind::Wishlist);
        set.refresh(&backend, &token()).await.unwrap();
        assert!(set.is_loaded());
        let before = set.snapshot().product_ids;

        let now = set.toggle(&backend, &token(), &ProductId::new("a")).await.unwrap();
        assert!(now);
        let after = set.snapshot().product_ids;
        assert_eq!(after.len(), before.len() + 1);
        assert!(after.contains(&ProductId::new("b")));

        let now = set.toggle(&backend, &token(), &ProductId::new("a")).await.unwrap();
        assert!(!now);
        assert_eq!(set.snapshot().product_ids, before);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_is_idempotent_once_settled() {
        let backend = FakeLists::default();
        let mut set = MembershipSet::new(MembershipKind::Wishlist);
        let id = ProductId::new("p1");

        assert!(set.set(&backend, &token(), &id, true).await.unwrap());
        assert!(set.set(&backend, &token(), &id, true).await.unwrap());
        assert!(set.set(&backend, &token(), &id, true).await.unwrap());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        assert!(!set.set(&backend, &token(), &id, false).await.unwrap());
        assert!(!set.set(&backend, &token(), &id, false).await.unwrap());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_reverts() {
        let backend = FakeLists::default();
        backend.fail.store(true, Ordering::SeqCst);
        let mut set = MembershipSet::new(MembershipKind::Cart);
        let id = ProductId::new("p1");

        let err = set.toggle(&backend, &token(), &id).await.unwrap_err();
        assert_eq!(err.user_message(), "Error adding product to wishlist");
        assert!(!set.contains(&id));
        assert!(!set.is_pending(&id));
    }

    #[test]
    fn test_second_toggle_while_pending_rejected() {
        let mut set = MembershipSet::new(MembershipKind::Wishlist);
        let id = ProductId::new("p1");

        let change = set.begin_toggle(&id).unwrap();
        assert!(change.desired);
        assert!(set.is_pending(&id));
        assert!(matches!(set.begin_toggle(&id), Err(MembershipError::Pending(_))));

        // Other products are unaffected.
        let other = set.begin_toggle(&ProductId::new("p2")).unwrap();

        assert!(set.complete(change, Ok(())).unwrap());
        assert!(set.contains(&id));
        assert!(!set.is_pending(&id));
        let _ = set.complete(other, Ok(()));
    }

    #[test]
    fn test_replace_keeps_pending_local_state() {
        let mut set = MembershipSet::new(MembershipKind::Wishlist);
        set.replace([ProductId::new("a")]);
        let change = set.begin_toggle(&ProductId::new("a")).unwrap();
        assert!(!change.desired);

        // Server still lists "a" and also "b"; "a" is in flight so stays as it was locally.
        set.replace([ProductId::new("a"), ProductId::new("b")]);
        assert!(set.contains(&ProductId::new("a")));
        assert!(set.contains(&ProductId::new("b")));

        assert!(!set.complete(change, Ok(())).unwrap());
        assert!(!set.contains(&ProductId::new("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ids_normalized() {
        let mut set = MembershipSet::new(MembershipKind::Cart);
        set.replace([ProductId::new(" p1 ")]);
        assert!(set.contains(&ProductId::new("p1")));
    }
}

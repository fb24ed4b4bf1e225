//! Wishlist and cart membership, shared by the cart and wishlist routes.
//!
//! A change holds the shopper lock only while deciding and while recording
//! the outcome. The backend call runs unlocked, so a second click on the same
//! product while the first is in flight gets `409` instead of queueing up a
//! flip back.

use cybermart_core::{BearerToken, ProductId};
use serde::Serialize;
use tracing::{info, instrument};

use crate::backend::{BackendError, Marketplace, MembershipKind};
use crate::checkout::CheckoutError;
use crate::error::Result;
use crate::membership::{self, MembershipSet, MembershipSnapshot};
use crate::state::AppState;

/// Outcome of a membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipChange {
    /// Which list changed.
    pub kind: MembershipKind,
    /// Target product.
    pub product_id: ProductId,
    /// Membership after the change.
    pub member: bool,
}

/// Fetch the list from the server unless the mirror already holds it.
pub(crate) async fn ensure_loaded(
    set: &mut MembershipSet,
    marketplace: &Marketplace,
    token: &BearerToken,
) -> std::result::Result<(), BackendError> {
    if !set.is_loaded() {
        set.refresh(marketplace, token).await?;
    }
    Ok(())
}

/// Current membership of one list.
pub(crate) async fn snapshot(
    state: &AppState,
    token: &BearerToken,
    kind: MembershipKind,
) -> Result<MembershipSnapshot> {
    let shopper = state.shoppers().get(token).await;
    let mut shopper = shopper.lock().await;
    let set = shopper.membership_mut(kind);
    ensure_loaded(set, state.marketplace(), token).await?;
    Ok(set.snapshot())
}

/// Toggle (`desired = None`) or set a product's membership.
///
/// Cart membership cannot change while a payment is in progress.
#[instrument(skip(state, token), fields(kind = %kind, product_id = %product_id))]
pub(crate) async fn change(
    state: &AppState,
    token: &BearerToken,
    kind: MembershipKind,
    product_id: ProductId,
    desired: Option<bool>,
) -> Result<MembershipChange> {
    let shopper = state.shoppers().get(token).await;

    let change = {
        let mut guard = shopper.lock().await;
        let checkout = guard.checkout.state();
        if kind == MembershipKind::Cart && checkout.payment_in_progress() {
            return Err(CheckoutError::InvalidTransition {
                event: "change the cart",
                state: checkout.name(),
            }
            .into());
        }
        let set = guard.membership_mut(kind);
        ensure_loaded(set, state.marketplace(), token).await?;
        match desired {
            Some(desired) => set.begin(&product_id, desired)?,
            None => set.begin_toggle(&product_id)?,
        }
    };

    let outcome = membership::apply(state.marketplace(), kind, token, &change).await;
    let needs_call = change.needs_call;

    let mut guard = shopper.lock().await;
    let member = guard.membership_mut(kind).complete(change, outcome)?;

    // The cart view no longer matches the server
    if kind == MembershipKind::Cart && needs_call && !guard.checkout.state().payment_in_progress() {
        guard.checkout.reset();
    }

    if needs_call {
        info!(member, "Membership changed");
    }
    Ok(MembershipChange {
        kind,
        product_id,
        member,
    })
}

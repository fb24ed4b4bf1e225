//! Checkout route handlers.
//!
//! The payment itself is confirmed by the provider in the browser. The
//! gateway creates the payment intent, waits for the client to report the
//! provider outcome, and only then places the order.

use axum::{Json, extract::State};
use cybermart_core::Price;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::backend::PaymentIntent;
use crate::checkout::CheckoutState;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Checkout state plus what the browser needs to talk to the provider.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub checkout: CheckoutState,
    pub publishable_key: Option<String>,
}

/// Response to starting checkout.
#[derive(Debug, Serialize)]
pub struct BeginCheckoutResponse {
    pub payment: PaymentIntent,
    pub total: Price,
    pub checkout_id: Option<Uuid>,
    pub publishable_key: Option<String>,
}

/// Provider outcome reported by the client.
#[derive(Debug, Deserialize)]
pub struct PaymentOutcomeForm {
    pub succeeded: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn publishable_key(state: &AppState) -> Option<String> {
    state.config().checkout.publishable_key.clone()
}

/// Current checkout state.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, RequireAuth(token): RequireAuth) -> Json<CheckoutView> {
    let shopper = state.shoppers().get(&token).await;
    let checkout = shopper.lock().await.checkout.state().clone();
    Json(CheckoutView {
        checkout,
        publishable_key: publishable_key(&state),
    })
}

/// Start checkout: price the cart and create a payment intent.
///
/// A shopper who never loaded the cart (or whose last load failed) gets a
/// fresh read first.
#[instrument(skip_all)]
pub async fn begin(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<BeginCheckoutResponse>> {
    let shared = state.shoppers().get(&token).await;
    let mut guard = shared.lock().await;
    let shopper = &mut *guard;

    let needs_load = matches!(
        shopper.checkout.state(),
        CheckoutState::Idle | CheckoutState::Success { .. } | CheckoutState::Failed { cart: None, .. }
    );
    if needs_load {
        let cart = shopper.checkout.load(state.marketplace(), &token).await?;
        shopper.cart.replace(cart.member_ids());
    }

    let payment = shopper.checkout.begin_checkout(state.marketplace()).await?.clone();
    let (total, checkout_id) = match shopper.checkout.state() {
        CheckoutState::AwaitingPayment {
            total, checkout_id, ..
        } => (*total, Some(*checkout_id)),
        _ => (Price::from_minor_units(payment.amount_minor), None),
    };

    add_breadcrumb("checkout", "Payment intent created", &[]);
    Ok(Json(BeginCheckoutResponse {
        payment,
        total,
        checkout_id,
        publishable_key: publishable_key(&state),
    }))
}

/// Record the provider outcome. Success places the order; failure keeps the
/// cart so checkout can be retried.
#[instrument(skip(state, token, form), fields(succeeded = form.succeeded))]
pub async fn payment_outcome(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Json(form): Json<PaymentOutcomeForm>,
) -> Result<Json<CheckoutState>> {
    let shared = state.shoppers().get(&token).await;
    let mut guard = shared.lock().await;
    let shopper = &mut *guard;

    if form.succeeded {
        shopper
            .checkout
            .payment_succeeded(state.marketplace(), &token)
            .await?;
        if let Some(cart) = shopper.checkout.state().cart() {
            shopper.cart.replace(cart.member_ids());
        }
        add_breadcrumb("checkout", "Order placed", &[]);
    } else {
        shopper
            .checkout
            .payment_failed(form.message.as_deref().unwrap_or_default())?;
    }

    Ok(Json(shopper.checkout.state().clone()))
}

/// Abandon the payment and return to the loaded cart.
#[instrument(skip_all)]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<CheckoutState>> {
    let shared = state.shoppers().get(&token).await;
    let mut guard = shared.lock().await;
    let checkout = guard.checkout.cancel_payment()?.clone();
    Ok(Json(checkout))
}

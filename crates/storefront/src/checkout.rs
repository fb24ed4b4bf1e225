//! Cart view and checkout flow.
//!
//! # States
//!
//! ```text
//! Idle ──load──▶ Loading ──▶ Loaded ──begin──▶ PlacingOrder ──▶ AwaitingPayment
//!                   │           ▲                   │              │        │
//!                   ▼           │ remove/add        ▼              │ failed │ succeeded
//!                 Failed ◀──────┴───────────────── Failed ◀────────┘        ▼
//!                   │                                           Confirming ──▶ Success
//!                   └──begin (cart kept)──▶ PlacingOrder            │
//!                                                                   ▼
//!                                                                 Failed
//! ```
//!
//! `Loading`, `PlacingOrder` and `Confirming` only exist while a backend call
//! is in flight. Events that do not apply to the current state return
//! [`CheckoutError::InvalidTransition`] and leave the state untouched.
//!
//! A checkout id is minted with each payment intent and sent as the order's
//! idempotency key. Reporting success again for a flow already in `Success`
//! returns the recorded receipt without posting a second order.

use std::time::Duration;

use cybermart_core::{BearerToken, Price, ProductId};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::backend::{
    BackendError, CartBackend, CartMutation, OrderBackend, OrderDraft, OrderReceipt,
    PaymentIntent,
};
use crate::cart::Cart;

/// Where the shopper goes after a successful checkout.
pub const ORDER_HISTORY_PATH: &str = "/orders";

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was requested with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The event does not apply to the current state.
    #[error("Cannot {event} while checkout is {state}")]
    InvalidTransition {
        /// What was attempted.
        event: &'static str,
        /// State at the time.
        state: &'static str,
    },

    /// The total does not fit in minor units.
    #[error("Cart total is too large to charge")]
    AmountOutOfRange,

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    /// The single string shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Checkout state, serialized with a `state` tag for clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// Cart fetch in flight.
    Loading,
    /// Cart on display.
    Loaded {
        /// Current cart.
        cart: Cart,
    },
    /// Payment intent request in flight.
    PlacingOrder {
        /// Cart being checked out.
        cart: Cart,
        /// Amount being charged.
        total: Price,
    },
    /// Waiting for the payment widget to report back.
    AwaitingPayment {
        /// Cart being checked out.
        cart: Cart,
        /// Amount being charged.
        total: Price,
        /// Intent handed to the widget.
        payment: PaymentIntent,
        /// Idempotency key for the order.
        checkout_id: Uuid,
    },
    /// Order creation in flight.
    Confirming {
        /// Cart being checked out.
        cart: Cart,
        /// Amount being charged.
        total: Price,
        /// Intent the provider confirmed.
        payment: PaymentIntent,
        /// Idempotency key for the order.
        checkout_id: Uuid,
    },
    /// Order placed.
    Success {
        /// What the order service returned.
        receipt: OrderReceipt,
        /// Idempotency key used.
        checkout_id: Uuid,
        /// Cart after the order (normally empty).
        cart: Cart,
        /// Path to redirect to.
        redirect_to: &'static str,
        /// Delay before redirecting.
        redirect_after_ms: u64,
    },
    /// Something went wrong; checkout can be retried.
    Failed {
        /// User-facing message.
        message: String,
        /// Cart at the time, when one was loaded.
        cart: Option<Cart>,
    },
}

impl CheckoutState {
    /// State name as used in error messages and the `state` tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded { .. } => "loaded",
            Self::PlacingOrder { .. } => "placing_order",
            Self::AwaitingPayment { .. } => "awaiting_payment",
            Self::Confirming { .. } => "confirming",
            Self::Success { .. } => "success",
            Self::Failed { .. } => "failed",
        }
    }

    /// The cart currently on display, if any.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match self {
            Self::Loaded { cart }
            | Self::PlacingOrder { cart, .. }
            | Self::AwaitingPayment { cart, .. }
            | Self::Confirming { cart, .. }
            | Self::Success { cart, .. }
            | Self::Failed {
                cart: Some(cart), ..
            } => Some(cart),
            Self::Idle | Self::Loading | Self::Failed { cart: None, .. } => None,
        }
    }

    /// Whether a payment is between intent and confirmation.
    #[must_use]
    pub const fn payment_in_progress(&self) -> bool {
        matches!(
            self,
            Self::PlacingOrder { .. } | Self::AwaitingPayment { .. } | Self::Confirming { .. }
        )
    }
}

/// One shopper's cart view and checkout flow.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    state: CheckoutState,
    redirect_delay: Duration,
}

impl CheckoutFlow {
    /// A fresh flow in `Idle`.
    #[must_use]
    pub const fn new(redirect_delay: Duration) -> Self {
        Self {
            state: CheckoutState::Idle,
            redirect_delay,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether the cart has never been fetched.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, CheckoutState::Idle)
    }

    fn invalid(&self, event: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            event,
            state: self.state.name(),
        }
    }

    /// Fetch the cart and move to `Loaded`.
    ///
    /// On failure the flow moves to `Failed` with no cart.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` while a payment is in progress, or the
    /// backend error.
    #[instrument(skip_all, fields(from = self.state.name()))]
    pub async fn load<B>(&mut self, backend: &B, token: &BearerToken) -> Result<&Cart, CheckoutError>
    where
        B: CartBackend + ?Sized,
    {
        if self.state.payment_in_progress() {
            return Err(self.invalid("refresh the cart"));
        }

        self.state = CheckoutState::Loading;
        match backend.fetch_cart(token).await {
            Ok(cart) => {
                self.state = CheckoutState::Loaded { cart };
                Ok(self.current_cart())
            }
            Err(e) => {
                warn!(error = %e, "Cart fetch failed");
                self.state = CheckoutState::Failed {
                    message: e.user_message(),
                    cart: None,
                };
                Err(e.into())
            }
        }
    }

    fn current_cart(&self) -> &Cart {
        const EMPTY: &Cart = &Cart::empty();
        self.state.cart().unwrap_or(EMPTY)
    }

    /// Apply a cart write, then reload.
    ///
    /// A failed write leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` while a payment is in progress, or the
    /// backend error.
    #[instrument(skip_all, fields(product_id = %mutation.product_id, remove = mutation.remove))]
    pub async fn update_cart<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
        mutation: &CartMutation,
    ) -> Result<&Cart, CheckoutError>
    where
        B: CartBackend + ?Sized,
    {
        if self.state.payment_in_progress() {
            return Err(self.invalid("change the cart"));
        }
        backend.manage_cart(token, mutation).await?;
        self.load(backend, token).await
    }

    /// Remove one line, then reload.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::update_cart`].
    pub async fn remove_item<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
        product_id: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<&Cart, CheckoutError>
    where
        B: CartBackend + ?Sized,
    {
        let mutation = CartMutation::remove(
            product_id.clone(),
            size.map(str::to_string),
            color.map(str::to_string),
        );
        self.update_cart(backend, token, &mutation).await
    }

    /// Start checkout: compute the total and request a payment intent.
    ///
    /// Allowed from `Loaded` and from `Failed` when a cart is still held.
    /// An empty cart is rejected before any backend call.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart`, `InvalidTransition`, `AmountOutOfRange`, or the
    /// backend error (after moving to `Failed`).
    #[instrument(skip_all, fields(from = self.state.name()))]
    pub async fn begin_checkout<B>(&mut self, backend: &B) -> Result<&PaymentIntent, CheckoutError>
    where
        B: OrderBackend + ?Sized,
    {
        let cart = match &self.state {
            CheckoutState::Loaded { cart }
            | CheckoutState::Failed {
                cart: Some(cart), ..
            } => cart,
            _ => return Err(self.invalid("start checkout")),
        };
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = cart.total();
        let amount_minor = total.minor_units().ok_or(CheckoutError::AmountOutOfRange)?;

        let cart = match std::mem::take(&mut self.state) {
            CheckoutState::Loaded { cart }
            | CheckoutState::Failed {
                cart: Some(cart), ..
            } => cart,
            _ => Cart::empty(),
        };
        self.state = CheckoutState::PlacingOrder {
            cart: cart.clone(),
            total,
        };

        match backend.create_payment_intent(amount_minor).await {
            Ok(payment) => {
                let checkout_id = Uuid::new_v4();
                info!(%checkout_id, amount_minor, "Payment intent created");
                self.state = CheckoutState::AwaitingPayment {
                    cart,
                    total,
                    payment,
                    checkout_id,
                };
                match &self.state {
                    CheckoutState::AwaitingPayment { payment, .. } => Ok(payment),
                    _ => Err(self.invalid("start checkout")),
                }
            }
            Err(e) => {
                warn!(error = %e, "Payment intent failed");
                self.state = CheckoutState::Failed {
                    message: e.user_message(),
                    cart: Some(cart),
                };
                Err(e.into())
            }
        }
    }

    /// The payment provider reported a failure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless awaiting payment.
    pub fn payment_failed(&mut self, provider_message: &str) -> Result<&CheckoutState, CheckoutError> {
        if !matches!(self.state, CheckoutState::AwaitingPayment { .. }) {
            return Err(self.invalid("report a payment failure"));
        }
        let cart = self.state.cart().cloned();
        let provider_message = provider_message.trim();
        let message = if provider_message.is_empty() {
            "Payment failed".to_string()
        } else {
            format!("Payment failed: {provider_message}")
        };
        warn!(%message, "Payment failed at provider");
        self.state = CheckoutState::Failed { message, cart };
        Ok(&self.state)
    }

    /// Abandon the payment and go back to the cart.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless awaiting payment.
    pub fn cancel_payment(&mut self) -> Result<&CheckoutState, CheckoutError> {
        match std::mem::take(&mut self.state) {
            CheckoutState::AwaitingPayment { cart, .. } => {
                self.state = CheckoutState::Loaded { cart };
                Ok(&self.state)
            }
            other => {
                self.state = other;
                Err(self.invalid("cancel payment"))
            }
        }
    }

    /// The payment provider confirmed the charge: place the order.
    ///
    /// On success the cart is re-fetched (normally empty now) and the flow
    /// moves to `Success`. Calling this again once in `Success` returns the
    /// same receipt without contacting the order service.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless awaiting payment or already
    /// succeeded, or the backend error (after moving to `Failed`).
    #[instrument(skip_all, fields(from = self.state.name()))]
    pub async fn payment_succeeded<B>(
        &mut self,
        backend: &B,
        token: &BearerToken,
    ) -> Result<&OrderReceipt, CheckoutError>
    where
        B: CartBackend + OrderBackend + ?Sized,
    {
        if let CheckoutState::Success { checkout_id, .. } = &self.state {
            info!(%checkout_id, "Payment success repeated, order already placed");
        } else {
            if !matches!(self.state, CheckoutState::AwaitingPayment { .. }) {
                return Err(self.invalid("confirm payment"));
            }
            let CheckoutState::AwaitingPayment {
                cart,
                total,
                payment,
                checkout_id,
            } = std::mem::take(&mut self.state)
            else {
                return Err(self.invalid("confirm payment"));
            };

            let order = OrderDraft::from_items(cart.items(), total);
            self.state = CheckoutState::Confirming {
                cart: cart.clone(),
                total,
                payment,
                checkout_id,
            };

            let receipt = match backend
                .create_order(token, &order, &checkout_id.to_string())
                .await
            {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!(error = %e, %checkout_id, "Order creation failed");
                    self.state = CheckoutState::Failed {
                        message: e.user_message(),
                        cart: Some(cart),
                    };
                    return Err(e.into());
                }
            };
            info!(%checkout_id, order_id = ?receipt.order_id, "Order placed");

            let cart = match backend.fetch_cart(token).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!(error = %e, "Cart refresh after order failed");
                    Cart::empty()
                }
            };
            self.state = CheckoutState::Success {
                receipt,
                checkout_id,
                cart,
                redirect_to: ORDER_HISTORY_PATH,
                redirect_after_ms: u64::try_from(self.redirect_delay.as_millis()).unwrap_or(u64::MAX),
            };
        }

        match &self.state {
            CheckoutState::Success { receipt, .. } => Ok(receipt),
            _ => Err(self.invalid("confirm payment")),
        }
    }

    /// Forget everything and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use cybermart_core::{OrderId, Price};

    use super::*;
    use crate::backend::{CartItem, Product};

    pub fn product(id: &str, price: &str, sizes: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Price::new(price.parse().unwrap()),
            stock: 5,
            available: true,
            category: None,
            sizes: sizes.iter().map(ToString::to_string).collect(),
            colors: vec![],
            images: vec![],
            seller: None,
        }
    }

    /// In-memory cart and order backend.
    #[derive(Default)]
    pub struct FakeShop {
        pub cart: Mutex<Vec<CartItem>>,
        pub fetches: AtomicUsize,
        pub intents: AtomicUsize,
        pub orders: Mutex<Vec<(OrderDraft, String)>>,
        pub fail_fetch: AtomicBool,
        pub fail_intent: AtomicBool,
        pub fail_order: AtomicBool,
    }

    impl FakeShop {
        pub fn with_items(items: Vec<CartItem>) -> Self {
            Self {
                cart: Mutex::new(items),
                ..Self::default()
            }
        }
    }

    fn refused() -> BackendError {
        BackendError::Status {
            status: 500,
            message: "Server unavailable".to_string(),
        }
    }

    #[async_trait]
    impl CartBackend for FakeShop {
        async fn fetch_cart(&self, _token: &BearerToken) -> Result<Cart, BackendError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(refused());
            }
            Ok(Cart::from_items(self.cart.lock().unwrap().clone()))
        }

        async fn manage_cart(
            &self,
            _token: &BearerToken,
            mutation: &CartMutation,
        ) -> Result<(), BackendError> {
            let mut cart = self.cart.lock().unwrap();
            if mutation.remove {
                let index = cart.iter().position(|item| {
                    item.matches(
                        &mutation.product_id,
                        mutation.size.as_deref(),
                        mutation.color.as_deref(),
                    )
                });
                if let Some(index) = index {
                    cart.remove(index);
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl OrderBackend for FakeShop {
        async fn create_payment_intent(&self, amount_minor: i64) -> Result<PaymentIntent, BackendError> {
            self.intents.fetch_add(1, Ordering::SeqCst);
            if self.fail_intent.load(Ordering::SeqCst) {
                return Err(refused());
            }
            Ok(PaymentIntent {
                client_secret: format!("pi_secret_{amount_minor}"),
                amount_minor,
            })
        }

        async fn create_order(
            &self,
            _token: &BearerToken,
            order: &OrderDraft,
            idempotency_key: &str,
        ) -> Result<OrderReceipt, BackendError> {
            if self.fail_order.load(Ordering::SeqCst) {
                return Err(refused());
            }
            let mut orders = self.orders.lock().unwrap();
            orders.push((order.clone(), idempotency_key.to_string()));
            self.cart.lock().unwrap().clear();
            Ok(OrderReceipt {
                order_id: Some(OrderId::new(format!("order-{}", orders.len()))),
            })
        }
    }

    fn line(product: Product, quantity: u32) -> CartItem {
        CartItem {
            product,
            size: None,
            color: None,
            quantity,
        }
    }

    fn token() -> BearerToken {
        BearerToken::new("buyer-token").unwrap()
    }

    fn flow() -> CheckoutFlow {
        CheckoutFlow::new(Duration::from_millis(2000))
    }

    #[tokio::test]
    async fn test_load_then_checkout_success() {
        let shop = FakeShop::with_items(vec![
            line(product("p1", "10.005", &["M", "L"]), 1),
            line(product("p2", "2.50", &[]), 2),
        ]);
        let mut flow = flow();

        let cart = flow.load(&shop, &token()).await.unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(flow.state().name(), "loaded");

        let payment = flow.begin_checkout(&shop).await.unwrap();
        // 10.005 + 5.00 = 15.005 -> 1501 cents
        assert_eq!(payment.amount_minor, 1501);
        assert_eq!(payment.client_secret, "pi_secret_1501");
        assert_eq!(flow.state().name(), "awaiting_payment");

        let receipt = flow.payment_succeeded(&shop, &token()).await.unwrap();
        assert_eq!(receipt.order_id.as_ref().unwrap().as_str(), "order-1");

        let CheckoutState::Success {
            cart,
            redirect_after_ms,
            redirect_to,
            ..
        } = flow.state()
        else {
            panic!("expected success");
        };
        assert!(cart.is_empty());
        assert_eq!(*redirect_after_ms, 2000);
        assert_eq!(*redirect_to, "/orders");

        let orders = shop.orders.lock().unwrap();
        let (draft, _) = &orders[0];
        assert_eq!(draft.items[0].size.as_deref(), Some("M"));
        assert_eq!(draft.items[1].size, None);
        assert_eq!(draft.total.to_fixed(), "15.01");
    }

    #[tokio::test]
    async fn test_repeated_success_posts_once() {
        let shop = FakeShop::with_items(vec![line(product("p1", "4", &[]), 1)]);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();
        flow.begin_checkout(&shop).await.unwrap();

        let first = flow.payment_succeeded(&shop, &token()).await.unwrap().clone();
        let second = flow.payment_succeeded(&shop, &token()).await.unwrap().clone();
        assert_eq!(first, second);

        let orders = shop.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        let CheckoutState::Success { checkout_id, .. } = flow.state() else {
            panic!("expected success");
        };
        assert_eq!(orders[0].1, checkout_id.to_string());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_network() {
        let shop = FakeShop::default();
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();

        let err = flow.begin_checkout(&shop).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(err.user_message(), "Your cart is empty");
        assert_eq!(shop.intents.load(Ordering::SeqCst), 0);
        assert_eq!(flow.state().name(), "loaded");
    }

    #[tokio::test]
    async fn test_unchargeable_total_rejected_before_network() {
        let shop = FakeShop::with_items(vec![
            line(product("p1", "1e27", &[]), 1),
            line(product("p2", "9.99", &[]), 3),
        ]);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();

        let err = flow.begin_checkout(&shop).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AmountOutOfRange));
        assert_eq!(shop.intents.load(Ordering::SeqCst), 0);
        assert_eq!(flow.state().name(), "loaded");
        assert_eq!(flow.state().cart().unwrap().item_count(), 2);
    }

    #[tokio::test]
    async fn test_payment_failure_then_retry() {
        let shop = FakeShop::with_items(vec![line(product("p1", "3", &[]), 1)]);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();
        flow.begin_checkout(&shop).await.unwrap();

        let state = flow.payment_failed("Your card was declined.").unwrap();
        assert_eq!(
            *state,
            CheckoutState::Failed {
                message: "Payment failed: Your card was declined.".to_string(),
                cart: Some(Cart::from_items(vec![line(product("p1", "3", &[]), 1)])),
            }
        );

        // Retrying from Failed keeps the cart and asks for a new intent.
        flow.begin_checkout(&shop).await.unwrap();
        assert_eq!(shop.intents.load(Ordering::SeqCst), 2);
        assert!(shop.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_intent_failure_keeps_cart() {
        let shop = FakeShop::with_items(vec![line(product("p1", "3", &[]), 1)]);
        shop.fail_intent.store(true, Ordering::SeqCst);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();

        let err = flow.begin_checkout(&shop).await.unwrap_err();
        assert_eq!(err.user_message(), "Server unavailable");
        let CheckoutState::Failed { message, cart } = flow.state() else {
            panic!("expected failure");
        };
        assert_eq!(message, "Server unavailable");
        assert_eq!(cart.as_ref().unwrap().item_count(), 1);
    }

    #[tokio::test]
    async fn test_order_failure_moves_to_failed() {
        let shop = FakeShop::with_items(vec![line(product("p1", "3", &[]), 1)]);
        shop.fail_order.store(true, Ordering::SeqCst);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();
        flow.begin_checkout(&shop).await.unwrap();

        assert!(flow.payment_succeeded(&shop, &token()).await.is_err());
        assert_eq!(flow.state().name(), "failed");
        assert_eq!(flow.state().cart().unwrap().item_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_transitions_leave_state() {
        let shop = FakeShop::with_items(vec![line(product("p1", "3", &[]), 1)]);
        let mut flow = flow();

        assert!(matches!(
            flow.begin_checkout(&shop).await,
            Err(CheckoutError::InvalidTransition { state: "idle", .. })
        ));

        flow.load(&shop, &token()).await.unwrap();
        let before = flow.state().clone();
        assert!(matches!(
            flow.payment_succeeded(&shop, &token()).await,
            Err(CheckoutError::InvalidTransition { state: "loaded", .. })
        ));
        assert!(flow.payment_failed("x").is_err());
        assert!(flow.cancel_payment().is_err());
        assert_eq!(*flow.state(), before);

        flow.begin_checkout(&shop).await.unwrap();
        assert!(matches!(
            flow.load(&shop, &token()).await,
            Err(CheckoutError::InvalidTransition { .. })
        ));
        flow.cancel_payment().unwrap();
        assert_eq!(flow.state().name(), "loaded");
    }

    #[tokio::test]
    async fn test_remove_item_reloads() {
        let shop = FakeShop::with_items(vec![
            line(product("p1", "3", &[]), 1),
            line(product("p2", "7", &[]), 2),
        ]);
        let mut flow = flow();
        flow.load(&shop, &token()).await.unwrap();

        let cart = flow
            .remove_item(&shop, &token(), &ProductId::new("p2"), None, None)
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total().to_fixed(), "3.00");
        assert_eq!(shop.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_failure() {
        let shop = FakeShop::default();
        shop.fail_fetch.store(true, Ordering::SeqCst);
        let mut flow = flow();

        assert!(flow.load(&shop, &token()).await.is_err());
        assert_eq!(
            *flow.state(),
            CheckoutState::Failed {
                message: "Server unavailable".to_string(),
                cart: None,
            }
        );
        assert!(matches!(
            flow.begin_checkout(&shop).await,
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(CheckoutState::Failed {
            message: "Payment failed".to_string(),
            cart: None,
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "Payment failed");
    }
}

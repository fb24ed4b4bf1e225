//! Checkout flow against the fake cart/order service.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use cybermart_core::{OrderId, OrderStatus, ProductId};
use cybermart_integration_tests::{
    BUYER_TOKEN, FakeMarketplace, LAMP_ID, MUG_ID, SELLER_TOKEN, SHIRT_ID, token,
};
use cybermart_storefront::backend::CartMutation;
use cybermart_storefront::checkout::{CheckoutError, CheckoutFlow, CheckoutState};
use cybermart_storefront::sales::SalesSummary;

fn flow() -> CheckoutFlow {
    CheckoutFlow::new(Duration::from_millis(2000))
}

#[tokio::test]
async fn test_happy_path_places_one_order() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 2);
    fake.seed_cart(BUYER_TOKEN, MUG_ID, 1);
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let mut checkout = flow();

    let cart = checkout.load(&marketplace, &buyer).await.unwrap();
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.unit_count(), 3);
    assert_eq!(cart.total().minor_units(), Some(4848));

    let payment = checkout.begin_checkout(&marketplace).await.unwrap();
    assert_eq!(payment.amount_minor, 4848);
    assert_eq!(payment.client_secret, "pi_1_secret_test");
    assert_eq!(checkout.state().name(), "awaiting_payment");
    assert_eq!(fake.data().payment_intents, vec![4848]);

    let receipt = checkout
        .payment_succeeded(&marketplace, &buyer)
        .await
        .unwrap()
        .clone();
    assert_eq!(receipt.order_id, Some(OrderId::new("order-1")));

    // A duplicate provider callback must not place a second order
    let again = checkout
        .payment_succeeded(&marketplace, &buyer)
        .await
        .unwrap();
    assert_eq!(*again, receipt);

    {
        let data = fake.data();
        assert_eq!(data.order_posts, 1);
        assert!(data.carts.get(BUYER_TOKEN).is_none());

        let order = &data.orders[0];
        assert_eq!(order.amount, "48.48");
        assert_eq!(order.status, "Pending");
        let shirt = order.lines.iter().find(|l| l.product_id == SHIRT_ID).unwrap();
        assert_eq!(shirt.amount, 2);
        assert_eq!(shirt.size.as_deref(), Some("S"));
        assert_eq!(shirt.color.as_deref(), Some("Red"));
        let mug = order.lines.iter().find(|l| l.product_id == MUG_ID).unwrap();
        assert_eq!(mug.size, None);
    }

    match checkout.state() {
        CheckoutState::Success {
            cart,
            redirect_to,
            redirect_after_ms,
            ..
        } => {
            assert!(cart.is_empty());
            assert_eq!(*redirect_to, "/orders");
            assert_eq!(*redirect_after_ms, 2000);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_cart_never_requests_payment() {
    let fake = FakeMarketplace::start().await;
    let marketplace = fake.marketplace();
    let mut checkout = flow();

    checkout.load(&marketplace, &token(BUYER_TOKEN)).await.unwrap();
    let err = checkout.begin_checkout(&marketplace).await.unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(checkout.state().name(), "loaded");
    assert!(fake.data().payment_intents.is_empty());
}

#[tokio::test]
async fn test_begin_before_load_is_rejected() {
    let fake = FakeMarketplace::start().await;
    let marketplace = fake.marketplace();
    let mut checkout = flow();

    let err = checkout.begin_checkout(&marketplace).await.unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidTransition { state: "idle", .. }));
    assert!(checkout.is_idle());
}

#[tokio::test]
async fn test_intent_failure_keeps_cart_and_allows_retry() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, LAMP_ID, 1);
    fake.data().fail_payment_intent = true;
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let mut checkout = flow();

    checkout.load(&marketplace, &buyer).await.unwrap();
    let err = checkout.begin_checkout(&marketplace).await.unwrap_err();
    assert_eq!(err.user_message(), "Payment provider unavailable");

    match checkout.state() {
        CheckoutState::Failed { message, cart } => {
            assert_eq!(message, "Payment provider unavailable");
            assert_eq!(cart.as_ref().unwrap().item_count(), 1);
        }
        other => panic!("expected failure, got {other:?}"),
    }

    fake.data().fail_payment_intent = false;
    let payment = checkout.begin_checkout(&marketplace).await.unwrap();
    assert_eq!(payment.amount_minor, 4500);
    assert_eq!(fake.data().payment_intents, vec![4500]);
}

#[tokio::test]
async fn test_order_failure_moves_to_failed() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, MUG_ID, 3);
    fake.data().fail_order = true;
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let mut checkout = flow();

    checkout.load(&marketplace, &buyer).await.unwrap();
    checkout.begin_checkout(&marketplace).await.unwrap();
    let err = checkout
        .payment_succeeded(&marketplace, &buyer)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Order service unavailable");
    assert_eq!(checkout.state().name(), "failed");
    assert_eq!(checkout.state().cart().unwrap().unit_count(), 3);
    assert_eq!(fake.data().order_posts, 0);
}

#[tokio::test]
async fn test_provider_failure_and_cancel() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 1);
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let mut checkout = flow();

    checkout.load(&marketplace, &buyer).await.unwrap();
    checkout.begin_checkout(&marketplace).await.unwrap();

    // The cart is frozen while the widget is open
    let err = checkout
        .update_cart(&marketplace, &buyer, &CartMutation::add(ProductId::new(MUG_ID), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidTransition { .. }));

    let state = checkout.payment_failed("card declined").unwrap();
    assert!(matches!(
        state,
        CheckoutState::Failed { message, .. } if message == "Payment failed: card declined"
    ));

    checkout.begin_checkout(&marketplace).await.unwrap();
    let state = checkout.cancel_payment().unwrap();
    assert_eq!(state.name(), "loaded");
    assert_eq!(fake.data().payment_intents.len(), 2);
    assert_eq!(fake.data().order_posts, 0);
}

#[tokio::test]
async fn test_cart_edits_reload() {
    let fake = FakeMarketplace::start().await;
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let mut checkout = flow();

    let mutation = CartMutation::add(ProductId::new(SHIRT_ID), 1)
        .with_options(Some("M".to_string()), Some("Blue".to_string()));
    let cart = checkout.update_cart(&marketplace, &buyer, &mutation).await.unwrap();
    assert_eq!(cart.items()[0].size.as_deref(), Some("M"));

    let cart = checkout
        .update_cart(&marketplace, &buyer, &mutation)
        .await
        .unwrap();
    assert_eq!(cart.item_count(), 1);
    assert_eq!(cart.unit_count(), 2);

    let cart = checkout
        .remove_item(&marketplace, &buyer, &ProductId::new(SHIRT_ID), Some("M"), Some("Blue"))
        .await
        .unwrap();
    assert!(cart.is_empty());
    assert_eq!(fake.data().cart_writes, 3);
}

#[tokio::test]
async fn test_history_and_sales_after_order() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 2);
    fake.seed_cart(BUYER_TOKEN, MUG_ID, 1);
    let marketplace = fake.marketplace();
    let buyer = token(BUYER_TOKEN);
    let seller = token(SELLER_TOKEN);
    let mut checkout = flow();

    checkout.load(&marketplace, &buyer).await.unwrap();
    checkout.begin_checkout(&marketplace).await.unwrap();
    checkout.payment_succeeded(&marketplace, &buyer).await.unwrap();

    let history = marketplace.orders().orders(&buyer).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total.minor_units(), Some(4848));
    assert_eq!(history[0].status, OrderStatus::Pending);
    assert!(history[0].created_at.is_some());

    let sales = marketplace.orders().seller_sales(&seller).await.unwrap();
    assert_eq!(sales.len(), 1);

    marketplace
        .orders()
        .update_order_status(&seller, &sales[0].id, &OrderStatus::OnTheWay)
        .await
        .unwrap();
    assert_eq!(fake.data().orders[0].status, "On the way");

    let sales = marketplace.orders().seller_sales(&seller).await.unwrap();
    let summary = SalesSummary::from_orders(&sales);
    assert_eq!(summary.order_count, 1);
    assert_eq!(summary.units_sold, 3);
    assert_eq!(summary.revenue.minor_units(), Some(4848));
    assert_eq!(summary.by_status["on-the-way"], 1);
    assert_eq!(summary.by_status["pending"], 0);
}

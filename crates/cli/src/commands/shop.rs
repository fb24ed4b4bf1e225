//! Shopper commands: cart, wishlist, checkout and order history.

use cybermart_core::{Price, ProductId};
use cybermart_storefront::backend::{CartMutation, MembershipKind};
use cybermart_storefront::checkout::{CheckoutFlow, CheckoutState};
use cybermart_storefront::membership::MembershipSet;
use cybermart_storefront::routes::cart::CartView;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, Context, print_json};

/// What the operator reported after confirming with the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PaymentOutcome {
    Succeeded,
    Cancelled,
    Failed(String),
}

impl PaymentOutcome {
    /// `ok`/`yes`/`succeeded` mean success, a blank line or `cancel` abandons
    /// the payment, anything else is the provider's failure message.
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "ok" | "y" | "yes" | "success" | "succeeded" => Self::Succeeded,
            "" | "cancel" | "cancelled" => Self::Cancelled,
            _ => Self::Failed(line.to_string()),
        }
    }
}

fn new_flow(ctx: &Context) -> CheckoutFlow {
    CheckoutFlow::new(ctx.config.checkout.redirect_delay)
}

/// Print the cart with totals.
pub async fn cart_show(ctx: &Context) -> Result<(), CliError> {
    let mut flow = new_flow(ctx);
    let cart = flow.load(&ctx.marketplace, ctx.token()?).await?;
    print_json(&CartView::from(cart))
}

/// Add a product and print the updated cart.
pub async fn cart_add(
    ctx: &Context,
    product_id: &str,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
) -> Result<(), CliError> {
    if quantity == 0 {
        return Err(CliError::Invalid("Quantity must be at least 1".to_string()));
    }
    let mutation = CartMutation::add(ProductId::new(product_id), quantity).with_options(size, color);
    let mut flow = new_flow(ctx);
    let cart = flow
        .update_cart(&ctx.marketplace, ctx.token()?, &mutation)
        .await?;
    print_json(&CartView::from(cart))
}

/// Remove a line and print the updated cart.
pub async fn cart_remove(
    ctx: &Context,
    product_id: &str,
    size: Option<String>,
    color: Option<String>,
) -> Result<(), CliError> {
    let mut flow = new_flow(ctx);
    let cart = flow
        .remove_item(
            &ctx.marketplace,
            ctx.token()?,
            &ProductId::new(product_id),
            size.as_deref(),
            color.as_deref(),
        )
        .await?;
    print_json(&CartView::from(cart))
}

/// Print the wishlist.
pub async fn wishlist_show(ctx: &Context) -> Result<(), CliError> {
    let items = ctx.marketplace.catalog().wishlist(ctx.token()?).await?;
    print_json(&items)
}

/// Flip one product's wishlist membership.
pub async fn wishlist_toggle(ctx: &Context, product_id: &str) -> Result<(), CliError> {
    let token = ctx.token()?;
    let product_id = ProductId::new(product_id);
    let mut wishlist = MembershipSet::new(MembershipKind::Wishlist);
    wishlist.refresh(&ctx.marketplace, token).await?;
    let member = wishlist.toggle(&ctx.marketplace, token, &product_id).await?;
    print_json(&json!({ "product_id": product_id, "in_wishlist": member }))
}

/// Print the order history.
pub async fn orders(ctx: &Context) -> Result<(), CliError> {
    let orders = ctx.marketplace.orders().orders(ctx.token()?).await?;
    print_json(&orders)
}

#[allow(clippy::print_stderr)]
async fn ask_outcome() -> Result<PaymentOutcome, CliError> {
    eprintln!(
        "Confirm the payment with the provider, then enter 'ok' on success, \
         the provider's message on failure, or nothing to cancel:"
    );
    let line = BufReader::new(tokio::io::stdin()).lines().next_line().await?;
    Ok(line.map_or(PaymentOutcome::Cancelled, |line| PaymentOutcome::parse(&line)))
}

/// Run checkout end to end.
///
/// Prints the payment client secret, waits for the provider outcome on
/// stdin, then places the order or records the failure.
pub async fn checkout(ctx: &Context) -> Result<(), CliError> {
    let token = ctx.token()?;
    let mut flow = new_flow(ctx);
    flow.load(&ctx.marketplace, token).await?;

    let payment = flow.begin_checkout(&ctx.marketplace).await?.clone();
    let (total, checkout_id) = match flow.state() {
        CheckoutState::AwaitingPayment {
            total, checkout_id, ..
        } => (*total, Some(*checkout_id)),
        _ => (Price::from_minor_units(payment.amount_minor), None),
    };
    print_json(&json!({
        "client_secret": payment.client_secret,
        "amount_minor": payment.amount_minor,
        "total": total,
        "checkout_id": checkout_id,
        "publishable_key": ctx.config.checkout.publishable_key,
    }))?;

    match ask_outcome().await? {
        PaymentOutcome::Succeeded => {
            flow.payment_succeeded(&ctx.marketplace, token).await?;
        }
        PaymentOutcome::Cancelled => {
            flow.cancel_payment()?;
        }
        PaymentOutcome::Failed(message) => {
            flow.payment_failed(&message)?;
        }
    }
    print_json(flow.state())?;

    match flow.state() {
        CheckoutState::Failed { message, .. } => Err(CliError::Invalid(message.clone())),
        _ => Ok(()),
    }
}

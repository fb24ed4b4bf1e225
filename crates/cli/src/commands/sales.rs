//! Seller sales commands.

use cybermart_core::{OrderId, OrderStatus};
use cybermart_storefront::sales::SalesSummary;
use serde_json::json;

use super::{CliError, Context, print_json};

/// Print the caller's sales.
pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let sales = ctx.marketplace.orders().seller_sales(ctx.token()?).await?;
    print_json(&sales)
}

/// Print the sales summary.
pub async fn summary(ctx: &Context) -> Result<(), CliError> {
    let sales = ctx.marketplace.orders().seller_sales(ctx.token()?).await?;
    print_json(&SalesSummary::from_orders(&sales))
}

/// Change an order's status. Unknown statuses are sent verbatim.
pub async fn set_status(ctx: &Context, order_id: &str, status: &str) -> Result<(), CliError> {
    let Ok(status) = status.parse::<OrderStatus>();
    if matches!(status, OrderStatus::Other(_)) {
        tracing::warn!("'{}' is not a standard status", status);
    }
    let order_id = OrderId::new(order_id);
    ctx.marketplace
        .orders()
        .update_order_status(ctx.token()?, &order_id, &status)
        .await?;
    print_json(&json!({ "order_id": order_id, "status": status }))
}

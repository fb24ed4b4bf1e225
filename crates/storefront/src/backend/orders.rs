//! Cart/order service client.

use cybermart_core::{BearerToken, OrderId, OrderStatus};
use reqwest::Method;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::instrument;

use super::conversions::{convert_cart, convert_order_list, created_order_id};
use super::types::{Order, OrderDraft, OrderReceipt, PaymentIntent};
use super::wire::{
    OrderBody, OrderLineBody, PaymentIntentBody, PaymentIntentResponse, ProductIdBody, StatusBody,
};
use super::{BackendError, RestClient};
use crate::cart::Cart;

/// Header carrying the checkout id on order creation.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Client for the cart/order service.
#[derive(Clone)]
pub struct OrderClient {
    rest: RestClient,
}

impl OrderClient {
    pub(crate) const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch the caller's cart.
    ///
    /// Odd or empty responses read as an empty cart rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &BearerToken) -> Result<Cart, BackendError> {
        let value: Value = self.rest.get(&["cart"], Some(token)).await?;
        Ok(convert_cart(value))
    }

    /// Request a payment intent for an amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnexpectedShape` if the response has no client
    /// secret, or an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(&self, amount_minor: i64) -> Result<PaymentIntent, BackendError> {
        let response: PaymentIntentResponse = self
            .rest
            .send_json(
                Method::POST,
                &["create-payment-intent"],
                None,
                &PaymentIntentBody {
                    total: amount_minor,
                },
            )
            .await?;

        let client_secret = response
            .payment_intent
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| BackendError::UnexpectedShape("payment intent has no client secret".to_string()))?;

        Ok(PaymentIntent {
            client_secret,
            amount_minor,
        })
    }

    /// Record an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, order), fields(items = order.items.len(), total = %order.total))]
    pub async fn create_order(
        &self,
        token: &BearerToken,
        order: &OrderDraft,
        idempotency_key: &str,
    ) -> Result<OrderReceipt, BackendError> {
        let body = OrderBody {
            items: order
                .items
                .iter()
                .map(|line| OrderLineBody {
                    product: ProductIdBody {
                        id: &line.product_id,
                    },
                    amount: line.quantity,
                    size: line.size.as_deref(),
                    color: line.color.as_deref(),
                })
                .collect(),
            amount: order.total.to_fixed(),
            status: &order.status,
        };

        let request = self
            .rest
            .request(Method::POST, self.rest.url(&["order"]), Some(token))
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(&body);
        let value: Value = self.rest.execute(request).await?;

        Ok(OrderReceipt {
            order_id: created_order_id(&value),
        })
    }

    /// The caller's order history.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnexpectedShape` unless the response is an array,
    /// or an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &BearerToken) -> Result<Vec<Order>, BackendError> {
        let value: Value = self.rest.get(&["orders"], Some(token)).await?;
        convert_order_list(value)
            .ok_or_else(|| BackendError::UnexpectedShape("orders response is not a list".to_string()))
    }

    /// Orders containing the caller's products (sellers only).
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnexpectedShape` unless the response is an array,
    /// or an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn seller_sales(&self, token: &BearerToken) -> Result<Vec<Order>, BackendError> {
        let value: Value = self.rest.get(&["seller-sales"], Some(token)).await?;
        convert_order_list(value)
            .ok_or_else(|| BackendError::UnexpectedShape("sales response is not a list".to_string()))
    }

    /// Change the status of one of the caller's sales.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for a blank status, or an error if the
    /// API request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        token: &BearerToken,
        order_id: &OrderId,
        status: &OrderStatus,
    ) -> Result<(), BackendError> {
        let status = status.as_str().trim();
        if status.is_empty() {
            return Err(BackendError::Rejected("Please select a status".to_string()));
        }
        let _: IgnoredAny = self
            .rest
            .send_json(
                Method::PUT,
                &["sales", order_id.as_str()],
                Some(token),
                &StatusBody { status },
            )
            .await?;
        Ok(())
    }
}

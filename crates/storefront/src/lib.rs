//! CyberMart Storefront library.
//!
//! The gateway between shoppers and the three marketplace backends
//! (profile, catalog, cart/order). It provides:
//!
//! - [`backend`] - typed REST clients for the backends
//! - [`checkout`] - the cart view and checkout state machine
//! - [`membership`] - wishlist/cart membership mirrors with one-call toggles
//! - [`routes`] - the JSON HTTP API
//!
//! The CLI reuses the clients and state machines directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod membership;
pub mod middleware;
pub mod routes;
pub mod sales;
pub mod shopper;
pub mod state;

use std::time::Duration;

use axum::{Router, middleware::from_fn};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the gateway router with tracing, request IDs and CORS.
///
/// Sentry layers are added by the binary, which owns the Sentry client.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

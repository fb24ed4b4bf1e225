//! Order history route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::backend::Order;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The caller's orders, as the order service returns them.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, RequireAuth(token): RequireAuth) -> Result<Json<Vec<Order>>> {
    let orders = state.marketplace().orders().orders(&token).await?;
    Ok(Json(orders))
}

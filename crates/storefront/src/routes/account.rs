//! Account route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::backend::{ProfileUpdate, UserProfile};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The caller's own profile.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<UserProfile>> {
    let profile = state.marketplace().profile().profile(&token).await?;
    Ok(Json(profile))
}

/// Update the caller's profile and return the stored result.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .marketplace()
        .profile()
        .update_profile(&token, &update)
        .await?;
    Ok(Json(profile))
}

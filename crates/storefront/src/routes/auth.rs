//! Authentication route handlers.
//!
//! Login and signup go straight to the profile service. The token it issues
//! is handed back to the client, which sends it as a bearer credential on
//! every later request.

use axum::{Json, extract::State, http::StatusCode};
use cybermart_core::{Email, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::SignupRequest;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Exchange email and password for a bearer token.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>> {
    let email = parse_email(&form.email)?;
    let token = state
        .marketplace()
        .profile()
        .login(&email, form.password.expose_secret())
        .await?;

    add_breadcrumb("auth", "Shopper logged in", &[("email", email.as_str())]);
    Ok(Json(LoginResponse {
        token: token.expose().to_string(),
    }))
}

/// Create an account.
///
/// The password confirmation is checked here, before any backend call.
#[instrument(skip(state, form), fields(email = %form.email, role = %form.role))]
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<StatusCode> {
    let email = parse_email(&form.email)?;
    let request = SignupRequest::new(
        &form.name,
        email,
        form.password.expose_secret(),
        form.confirm_password.expose_secret(),
        &form.phone,
        form.role,
    )
    .map_err(AppError::BadRequest)?;

    state.marketplace().profile().signup(&request).await?;

    tracing::info!("Account created");
    Ok(StatusCode::CREATED)
}

/// Drop the gateway's cached state for this credential.
pub async fn logout(State(state): State<AppState>, RequireAuth(token): RequireAuth) -> StatusCode {
    state.shoppers().forget(&token).await;
    StatusCode::NO_CONTENT
}

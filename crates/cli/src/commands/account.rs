//! Account commands: login, signup and profile.

use clap::Args;
use cybermart_core::{Email, Role};
use cybermart_storefront::backend::{ProfileUpdate, SignupRequest};
use serde_json::json;

use super::{CliError, Context, print_json};

/// Profile fields to change. Omitted fields stay unchanged.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
    #[arg(long)]
    pub about: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        Self {
            name: args.name,
            gender: args.gender,
            avatar_url: args.avatar_url,
            about: args.about,
            phone: args.phone,
            address: args.address,
        }
    }
}

fn parse_email(raw: &str) -> Result<Email, CliError> {
    Email::parse(raw).map_err(|e| CliError::Invalid(e.to_string()))
}

/// Log in and print the token.
pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<(), CliError> {
    let email = parse_email(email)?;
    let token = ctx.marketplace.profile().login(&email, password).await?;
    tracing::info!("Logged in as {}", email);
    print_json(&json!({ "token": token.expose() }))
}

/// Create an account.
pub async fn signup(
    ctx: &Context,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
    phone: &str,
    role: Role,
) -> Result<(), CliError> {
    let email = parse_email(email)?;
    let request = SignupRequest::new(name, email, password, confirm_password, phone, role)
        .map_err(CliError::Invalid)?;
    ctx.marketplace.profile().signup(&request).await?;
    print_json(&json!({ "created": true, "email": request.email.as_str(), "role": role }))
}

/// Print the caller's profile.
pub async fn show(ctx: &Context) -> Result<(), CliError> {
    let profile = ctx.marketplace.profile().profile(ctx.token()?).await?;
    print_json(&profile)
}

/// Update the caller's profile and print the result.
pub async fn update(ctx: &Context, args: ProfileArgs) -> Result<(), CliError> {
    let update = ProfileUpdate::from(args);
    if update == ProfileUpdate::default() {
        return Err(CliError::Invalid("Nothing to update".to_string()));
    }
    let profile = ctx
        .marketplace
        .profile()
        .update_profile(ctx.token()?, &update)
        .await?;
    print_json(&profile)
}

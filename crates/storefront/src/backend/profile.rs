//! Profile/auth service client.

use cybermart_core::{BearerToken, Email, SellerId};
use reqwest::Method;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::instrument;

use super::conversions::{convert_profile, convert_seller_profile, unwrap_profile};
use super::types::{ProfileUpdate, SellerProfile, SignupRequest, UserProfile};
use super::wire::{LoginBody, LoginResponse, ProfileBody, SignupBody, WireProfile};
use super::{BackendError, RestClient};

/// Client for the profile service.
#[derive(Clone)]
pub struct ProfileClient {
    rest: RestClient,
}

impl ProfileClient {
    pub(crate) const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected("Invalid credentials")` when the service
    /// answers without a token, or an error if the API request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<BearerToken, BackendError> {
        let body = LoginBody {
            email: email.as_str(),
            password,
        };
        let response: LoginResponse = self
            .rest
            .send_json(Method::POST, &["login"], None, &body)
            .await?;

        response
            .token
            .and_then(|token| BearerToken::new(token).ok())
            .ok_or_else(|| BackendError::Rejected("Invalid credentials".to_string()))
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the signup or the request fails.
    #[instrument(skip(self, signup), fields(email = %signup.email, role = %signup.role))]
    pub async fn signup(&self, signup: &SignupRequest) -> Result<(), BackendError> {
        let body = SignupBody {
            name: &signup.name,
            email: signup.email.as_str(),
            password: &signup.password,
            phone: &signup.phone,
            role: signup.role,
        };
        let _: IgnoredAny = self
            .rest
            .send_json(Method::POST, &["signup"], None, &body)
            .await?;
        Ok(())
    }

    /// Get the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &BearerToken) -> Result<UserProfile, BackendError> {
        let value: Value = self.rest.get(&[], Some(token)).await?;
        let profile: WireProfile = serde_json::from_value(unwrap_profile(value))?;
        Ok(convert_profile(profile))
    }

    /// Update the caller's profile and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let body = ProfileBody {
            name: update.name.as_deref(),
            gender: update.gender.as_deref(),
            img: update.avatar_url.as_deref(),
            about: update.about.as_deref(),
            phone: update.phone.as_deref(),
            address: update.address.as_deref(),
        };
        let _: IgnoredAny = self
            .rest
            .send_json(Method::PUT, &["profile"], Some(token), &body)
            .await?;

        // The update response is not guaranteed to carry the full profile
        self.profile(token).await
    }

    /// Get a seller's public profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(seller_id = %seller_id))]
    pub async fn seller_profile(
        &self,
        token: Option<&BearerToken>,
        seller_id: &SellerId,
    ) -> Result<SellerProfile, BackendError> {
        let value: Value = self
            .rest
            .get(&["seller-profile", seller_id.as_str()], token)
            .await?;
        let profile: WireProfile = serde_json::from_value(unwrap_profile(value))?;
        Ok(convert_seller_profile(seller_id, profile))
    }

    /// Check that the profile service answers at all.
    ///
    /// Any HTTP response counts, including 401 for the anonymous request.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the service cannot be reached.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.rest
            .request(Method::GET, self.rest.url(&[]), None)
            .send()
            .await?;
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth 2.0 authorization-code client for the identity provider.
//!
//! Handles:
//! - Authorization URL construction with a fresh CSRF state
//! - Code-for-token exchange (client credentials via HTTP Basic)
//! - Userinfo fetch and shape validation

use reqwest::Url;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::config::{ConfigError, OAuthConfig};
use crate::error::AppError;
use crate::models::UserProfile;

/// Group whose members get every capability flag.
pub const ADMIN_GROUP: &str = "Administrators";

/// Length of a provider subject identifier.
pub const SUBJECT_LEN: usize = 64;

const STATE_BYTES: usize = 16;

/// Failure talking to the provider.
///
/// The login flow reports every variant the same way (401); the variants
/// exist for the logs.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("token response carried no access token")]
    MissingToken,

    #[error("userinfo failed validation: {0}")]
    InvalidUserInfo(#[from] validator::ValidationErrors),
}

/// Where to send the browser, and the state it must bring back.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserInfo {
    #[validate(custom(function = "validate_subject"))]
    pub sub: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub nickname: String,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl UserInfo {
    pub fn is_administrator(&self) -> bool {
        self.groups
            .as_deref()
            .is_some_and(|groups| groups.iter().any(|g| g == ADMIN_GROUP))
    }

    /// Local profile fields, recomputed from scratch on every login.
    pub fn to_profile(&self) -> UserProfile {
        let admin = self.is_administrator();
        UserProfile {
            oauth_sub: self.sub.clone(),
            username: self.nickname.clone(),
            common_name: self.name.clone(),
            may_remove_checkins: admin,
            may_edit_types: admin,
        }
    }
}

fn validate_subject(sub: &str) -> Result<(), ValidationError> {
    if sub.len() == SUBJECT_LEN && sub.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("subject_format"))
    }
}

/// Client for one configured OAuth provider.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    rng: SystemRandom,
    authorize_url: Url,
    token_url: Url,
    userinfo_url: Url,
    callback_uri: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl OAuthClient {
    /// Build the client, rejecting unusable provider configuration.
    pub fn new(config: &OAuthConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            rng: SystemRandom::new(),
            authorize_url: parse_url("OAUTH_AUTHORIZE_URL", &config.authorize_url)?,
            token_url: parse_url("OAUTH_TOKEN_URL", &config.token_url)?,
            userinfo_url: parse_url("OAUTH_USERINFO_URL", &config.userinfo_url)?,
            callback_uri: config.callback_uri.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        })
    }

    /// Mint a CSRF state and the provider URL that carries it.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest, AppError> {
        let mut bytes = [0u8; STATE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        let state = hex::encode(bytes);

        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("redirect_uri", &self.callback_uri)
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .append_pair("state", &state);

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
        })
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let body: TokenResponse = response.json().await?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingToken)
    }

    /// Fetch and validate the profile behind an access token.
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, ProviderError> {
        let response = self
            .http
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let info: UserInfo = response.json().await?;
        info.validate()?;
        Ok(info)
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name, e.to_string()))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login, callback and logout routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use super::found;
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::middleware::session::{removal_cookie, TOKEN_COOKIE};
use crate::models::{SessionUser, User};
use crate::services::oauth::UserInfo;
use crate::AppState;

/// CSRF state cookie name.
pub const STATE_COOKIE: &str = "oauth_state";

/// How long a login attempt may take before its state cookie lapses.
const STATE_COOKIE_MAX_AGE_MINS: i64 = 5;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
}

/// Start the OAuth flow, unless the caller already has a valid session.
///
/// Missing, unknown and expired sessions are all anonymous by the time we
/// get here; the session middleware has already cleared an expired one.
async fn login(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
    jar: CookieJar,
) -> Result<(CookieJar, Response)> {
    match session {
        SessionUser::Authenticated(user) => {
            tracing::debug!(user_id = user.id, "Already logged in, skipping OAuth");
            Ok((jar, found("/dashboard")))
        }
        SessionUser::Anonymous => {
            let request = state.oauth.authorization_request()?;

            let state_cookie = Cookie::build((STATE_COOKIE, request.state))
                .http_only(true)
                .secure(true)
                .same_site(SameSite::Lax)
                .path("/")
                .max_age(time::Duration::minutes(STATE_COOKIE_MAX_AGE_MINS))
                .build();

            tracing::info!("Starting OAuth flow, redirecting to provider");
            Ok((jar.add(state_cookie), found(&request.url)))
        }
    }
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// OAuth callback - verify state, exchange code, provision user, open session.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Response)> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing code".to_string()))?;

    // Must hold before anything is sent upstream.
    let expected = jar.get(STATE_COOKIE).map(|c| c.value());
    if !state_matches(expected, params.state.as_deref()) {
        tracing::warn!(
            has_cookie = expected.is_some(),
            has_param = params.state.is_some(),
            "OAuth state mismatch, rejecting callback"
        );
        return Err(AppError::InvalidState);
    }

    let access_token = state.oauth.exchange_code(&code).await.map_err(|e| {
        tracing::warn!(error = %e, "Authorization code exchange failed");
        AppError::OAuth("Unable to receive access token".to_string())
    })?;

    let info = state
        .oauth
        .fetch_user_info(&access_token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Userinfo fetch failed");
            AppError::OAuth("Unable to fetch user info".to_string())
        })?;

    let user = provision_user(&state.db, &info).await?;
    let token = state.tokens.issue(user.id).await?;

    // Lifetime is enforced by the token store, not the browser.
    let session_cookie = Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        "Login successful, session issued"
    );

    let jar = jar
        .remove(Cookie::build(STATE_COOKIE).path("/").build())
        .add(session_cookie);

    Ok((jar, found("/dashboard")))
}

/// End the current session, if any.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if let Some(session) = state.tokens.lookup(cookie.value()).await? {
            state.tokens.revoke(session.token_id).await?;
            tracing::info!(user_id = session.user.id, "Session revoked on logout");
        }
    }

    Ok((jar.remove(removal_cookie()), StatusCode::NO_CONTENT))
}

/// Create the user on first login, otherwise refresh every provider-derived
/// field. Capability flags follow the provider both ways.
async fn provision_user(db: &Db, info: &UserInfo) -> Result<User> {
    let profile = info.to_profile();

    match db.get_user_by_subject(&profile.oauth_sub).await? {
        None => {
            let user = db.create_user(&profile).await?;
            tracing::info!(user_id = user.id, username = %user.username, "Provisioned new user");
            Ok(user)
        }
        Some(existing) => {
            let user = db.update_user(&profile).await?;
            if existing.may_edit_types != user.may_edit_types {
                tracing::info!(
                    user_id = user.id,
                    admin = user.may_edit_types,
                    "Capability flags changed"
                );
            }
            Ok(user)
        }
    }
}

/// Constant-time comparison of the returned state with the cookie.
fn state_matches(expected: Option<&str>, received: Option<&str>) -> bool {
    match (expected, received) {
        (Some(expected), Some(received)) if !expected.is_empty() => {
            expected.as_bytes().ct_eq(received.as_bytes()).into()
        }
        _ => false,
    }
}

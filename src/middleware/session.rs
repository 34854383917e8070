// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-token resolution middleware.

use crate::models::SessionUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use std::sync::Arc;

/// Session cookie name.
pub const TOKEN_COOKIE: &str = "token";

/// Resolve the `token` cookie to a [`SessionUser`] for downstream handlers.
///
/// Never rejects: a missing, unknown or expired token just makes the
/// request anonymous. An expired token is revoked and its cookie removed.
/// An unknown token's cookie is left alone.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        request.extensions_mut().insert(SessionUser::Anonymous);
        return next.run(request).await;
    };

    let (session, expired) = match state.tokens.lookup(&token).await {
        Ok(None) => (SessionUser::Anonymous, false),
        Ok(Some(found)) if found.is_expired_at(Utc::now()) => {
            tracing::info!(
                user_id = found.user.id,
                expired_at = %found.expires_at,
                "Session token expired, clearing"
            );
            if let Err(e) = state.tokens.revoke(found.token_id).await {
                tracing::warn!(error = %e, "Failed to revoke expired session token");
            }
            (SessionUser::Anonymous, true)
        }
        Ok(Some(found)) => (SessionUser::Authenticated(found.user), false),
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed, treating request as anonymous");
            (SessionUser::Anonymous, false)
        }
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    // A handler that issued a fresh session (the login callback) wins over
    // the removal.
    if expired && !sets_cookie(&response, TOKEN_COOKIE) {
        return (jar.remove(removal_cookie()), response).into_response();
    }
    response
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

/// Cookie matching the attributes the session cookie was set with.
pub(crate) fn removal_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE).path("/").build()
}

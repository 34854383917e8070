// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token lookups and the per-request session state.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};

use super::User;

/// A stored session token joined with the user it belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionLookup {
    pub token_id: i64,
    pub expires_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub user: User,
}

impl SessionLookup {
    /// A token is only valid while its expiry is strictly in the future.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Who is making the current request.
///
/// Set by the session middleware on every request; handlers take it as an
/// extractor. A request that never passed through the middleware is
/// anonymous.
#[derive(Debug, Clone, Default)]
pub enum SessionUser {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .unwrap_or_default())
    }
}

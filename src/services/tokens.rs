// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token store.
//!
//! Tokens are opaque random strings persisted with an absolute expiry. The
//! database is the only source of truth: nothing here caches a lookup.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};

use crate::db::Db;
use crate::error::AppError;
use crate::models::SessionLookup;

/// Lifetime of a session token from issuance.
pub const SESSION_TTL_SECS: i64 = 60 * 60;

const TOKEN_BYTES: usize = 32;

/// Issues, resolves and expires session tokens.
#[derive(Clone)]
pub struct TokenStore {
    db: Db,
    rng: SystemRandom,
}

impl TokenStore {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            rng: SystemRandom::new(),
        }
    }

    /// Create a fresh token for `user_id`, valid for one hour.
    ///
    /// Collisions are not checked; 256 bits of entropy make them negligible.
    pub async fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let token = random_token(&self.rng)?;
        let now = Utc::now();
        let expires_at = now + Duration::seconds(SESSION_TTL_SECS);

        self.db.insert_token(user_id, &token, now, expires_at).await?;
        tracing::debug!(user_id, %expires_at, "Issued session token");

        Ok(token)
    }

    /// Resolve a token to its user and expiry.
    pub async fn lookup(&self, token: &str) -> Result<Option<SessionLookup>, AppError> {
        self.db.find_session(token).await
    }

    /// Delete a token row.
    pub async fn revoke(&self, token_id: i64) -> Result<(), AppError> {
        self.db.delete_token(token_id).await
    }

    /// Delete all tokens whose expiry has passed; returns how many went.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        self.db.delete_tokens_expired_before(Utc::now()).await
    }
}

/// 32 random bytes, URL-safe base64 without padding.
fn random_token(rng: &SystemRandom) -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (provisioning on login)
//! - Tokens (opaque session credentials)

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{SessionLookup, User, UserProfile};
use crate::time_utils::format_utc_rfc3339;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        oauth_sub TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL UNIQUE,
        common_name TEXT NOT NULL,
        may_remove_checkins INTEGER NOT NULL DEFAULT 0,
        may_edit_types INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        token TEXT NOT NULL UNIQUE,
        user_id INTEGER NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tokens_expires_at ON tokens(expires_at)",
];

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the database file and ensure the schema.
    pub async fn connect(filename: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new()
            .filename(filename)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", filename, e)))?;

        let db = Self { pool };
        db.create_schema().await?;

        tracing::info!(filename, "Connected to SQLite");
        Ok(db)
    }

    /// Create a private in-memory database for testing.
    ///
    /// Every pooled connection to `:memory:` would see its own empty
    /// database, so the pool is pinned to a single long-lived connection.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Raw pool access, for diagnostics and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their OAuth subject.
    pub async fn get_user_by_subject(&self, oauth_sub: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE oauth_sub = ?")
            .bind(oauth_sub)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a new user.
    pub async fn create_user(&self, profile: &UserProfile) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (oauth_sub, username, common_name, may_remove_checkins, may_edit_types)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&profile.oauth_sub)
        .bind(&profile.username)
        .bind(&profile.common_name)
        .bind(profile.may_remove_checkins)
        .bind(profile.may_edit_types)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Overwrite the provider-derived fields of an existing user.
    pub async fn update_user(&self, profile: &UserProfile) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = ?, common_name = ?, may_remove_checkins = ?, may_edit_types = ?
            WHERE oauth_sub = ?
            RETURNING *
            "#,
        )
        .bind(&profile.username)
        .bind(&profile.common_name)
        .bind(profile.may_remove_checkins)
        .bind(profile.may_edit_types)
        .bind(&profile.oauth_sub)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Store a session token.
    pub async fn insert_token(
        &self,
        user_id: i64,
        token: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO tokens (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(format_utc_rfc3339(created_at))
        .bind(format_utc_rfc3339(expires_at))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Find a token and the user it belongs to.
    pub async fn find_session(&self, token: &str) -> Result<Option<SessionLookup>, AppError> {
        let lookup = sqlx::query_as::<_, SessionLookup>(
            r#"
            SELECT t.id AS token_id, t.expires_at,
                   u.id, u.oauth_sub, u.username, u.common_name,
                   u.may_remove_checkins, u.may_edit_types
            FROM tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lookup)
    }

    /// Delete a token by row ID.
    pub async fn delete_token(&self, token_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tokens WHERE id = ?")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete every token that expired before `now`; returns the count.
    pub async fn delete_tokens_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at < ?")
            .bind(format_utc_rfc3339(now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

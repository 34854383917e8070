//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User row, keyed by the provider's stable subject identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Local row ID
    pub id: i64,
    /// OAuth subject (unique, never changes for an identity)
    pub oauth_sub: String,
    /// Display username (provider nickname)
    pub username: String,
    /// Human-readable full name
    pub common_name: String,
    pub may_remove_checkins: bool,
    pub may_edit_types: bool,
}

/// Profile data written on every login, fresh from the provider.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub oauth_sub: String,
    pub username: String,
    pub common_name: String,
    pub may_remove_checkins: bool,
    pub may_edit_types: bool,
}

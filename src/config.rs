// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The OAuth provider settings are mandatory: a missing variable aborts
//! startup rather than surfacing later as a request-time failure.

use std::env;
use std::time::Duration;

/// Default interval between sweeps of expired session tokens.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 15 * 60;

/// Default deadline for calls to the OAuth provider.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// OAuth provider settings (all required).
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Redirect URI registered with the provider (our `/callback`)
    pub callback_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Space-separated scopes requested at authorization time
    pub scope: String,
    /// Deadline applied to every outbound provider request
    pub http_timeout: Duration,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite database file
    pub db_filename: String,
    /// How often expired session tokens are swept
    pub sweep_interval: Duration,
    pub oauth: OAuthConfig,
}

impl Default for Config {
    /// Default config for testing only. Tests open their database with
    /// `Db::connect_in_memory` and never touch `db_filename`.
    fn default() -> Self {
        Self {
            port: 3000,
            db_filename: "checkins.db".to_string(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            oauth: OAuthConfig {
                callback_uri: "http://localhost:3000/callback".to_string(),
                client_id: "test_client_id".to_string(),
                client_secret: "test_secret".to_string(),
                authorize_url: "http://localhost:9000/authorize".to_string(),
                token_url: "http://localhost:9000/token".to_string(),
                userinfo_url: "http://localhost:9000/userinfo".to_string(),
                scope: "openid profile groups".to_string(),
                http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let oauth = OAuthConfig {
            callback_uri: required("OAUTH_CALLBACK_URI")?,
            client_id: required("OAUTH_CLIENT_ID")?,
            client_secret: required("OAUTH_CLIENT_SECRET")?,
            authorize_url: required("OAUTH_AUTHORIZE_URL")?,
            token_url: required("OAUTH_TOKEN_URL")?,
            userinfo_url: required("OAUTH_USERINFO_URL")?,
            scope: required("OAUTH_SCOPE")?,
            http_timeout: parse_secs("OAUTH_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        };

        Ok(Self {
            port: parse_or("PORT", 3000)?,
            db_filename: env::var("DB_FILENAME").unwrap_or_else(|_| "checkins.db".to_string()),
            sweep_interval: parse_secs("TOKEN_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
            oauth,
        })
    }
}

/// Read a required variable; empty values count as missing.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// A whole number of seconds; zero is rejected.
fn parse_secs(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match parse_or(name, default)? {
        0 => Err(ConfigError::Invalid(name)),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid URL in {0}: {1}")]
    InvalidUrl(&'static str, String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const OAUTH_VARS: [(&str, &str); 7] = [
        ("OAUTH_CALLBACK_URI", "https://tracker.example/callback"),
        ("OAUTH_CLIENT_ID", "tracker"),
        ("OAUTH_CLIENT_SECRET", "s3cret"),
        ("OAUTH_AUTHORIZE_URL", "https://sso.example/authorize"),
        ("OAUTH_TOKEN_URL", "https://sso.example/token"),
        ("OAUTH_USERINFO_URL", "https://sso.example/userinfo"),
        ("OAUTH_SCOPE", "openid profile"),
    ];

    // Env is process-global, so every env-driven case lives in this one test.
    #[test]
    fn test_config_from_env() {
        for (name, value) in OAUTH_VARS {
            env::set_var(name, value);
        }
        env::set_var("TOKEN_SWEEP_INTERVAL_SECS", "60");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.oauth.client_id, "tracker");
        assert_eq!(config.oauth.scope, "openid profile");
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(
            config.oauth.http_timeout,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        );

        env::set_var("OAUTH_CLIENT_SECRET", "   ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("OAUTH_CLIENT_SECRET"))
        ));

        env::remove_var("OAUTH_CLIENT_SECRET");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("OAUTH_CLIENT_SECRET"))
        ));

        env::set_var("OAUTH_CLIENT_SECRET", "s3cret");
        env::set_var("TOKEN_SWEEP_INTERVAL_SECS", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("TOKEN_SWEEP_INTERVAL_SECS"))
        ));

        // A zero interval would panic the sweep task
        env::set_var("TOKEN_SWEEP_INTERVAL_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("TOKEN_SWEEP_INTERVAL_SECS"))
        ));
        env::remove_var("TOKEN_SWEEP_INTERVAL_SECS");

        env::set_var("OAUTH_HTTP_TIMEOUT_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("OAUTH_HTTP_TIMEOUT_SECS"))
        ));
        env::remove_var("OAUTH_HTTP_TIMEOUT_SECS");
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use checkin_tracker::config::Config;
use checkin_tracker::db::Db;
use checkin_tracker::models::UserProfile;
use checkin_tracker::routes::create_router;
use checkin_tracker::services::{OAuthClient, TokenStore};
use checkin_tracker::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{basic_auth, bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const ADMIN_SUB: &str = "abc123abc123abc123abc123abc123abc123abc123abc123abc123abc123abcd";

#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "provider-access-token";

/// Test configuration whose provider URLs point at `provider_url`
/// (usually a wiremock server).
#[allow(dead_code)]
pub fn test_config(provider_url: &str) -> Config {
    let mut config = Config::default();
    config.oauth.authorize_url = format!("{provider_url}/authorize");
    config.oauth.token_url = format!("{provider_url}/token");
    config.oauth.userinfo_url = format!("{provider_url}/userinfo");
    config
}

/// Create a test app over an in-memory database.
#[allow(dead_code)]
pub async fn create_test_app(provider_url: &str) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(&test_config(provider_url)).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: &Config) -> (axum::Router, Arc<AppState>) {
    let db = Db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let oauth = OAuthClient::new(&config.oauth).expect("Test OAuth config should be valid");
    let tokens = TokenStore::new(db.clone());

    let state = Arc::new(AppState { db, oauth, tokens });

    (create_router(state.clone()), state)
}

/// Create a test app whose provider is unreachable (no upstream calls expected).
#[allow(dead_code)]
pub async fn create_offline_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app("http://127.0.0.1:9").await
}

/// Insert a user directly.
#[allow(dead_code)]
pub async fn seed_user(db: &Db, sub: &str, username: &str) -> i64 {
    db.create_user(&UserProfile {
        oauth_sub: sub.to_string(),
        username: username.to_string(),
        common_name: format!("{username} Example"),
        may_remove_checkins: false,
        may_edit_types: false,
    })
    .await
    .expect("seed user")
    .id
}

/// Mount a token endpoint that accepts the test client's credentials.
#[allow(dead_code)]
pub async fn mock_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(basic_auth("test_client_id", "test_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 300,
        })))
        .mount(server)
        .await;
}

/// Mount a userinfo endpoint returning the given profile.
#[allow(dead_code)]
pub async fn mock_userinfo(server: &MockServer, sub: &str, nickname: &str, groups: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(bearer_token(ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": sub,
            "name": format!("{nickname} Example"),
            "nickname": nickname,
            "groups": groups,
        })))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
}

/// Value part of a `Set-Cookie` header.
#[allow(dead_code)]
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub async fn count(db: &Db, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

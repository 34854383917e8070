// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie attribute tests.
//!
//! These tests verify the attributes of the session and CSRF state cookies
//! as they are set on login and removed on logout.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use wiremock::MockServer;

mod common;

use common::{cookie_value, find_cookie, get, set_cookie_headers, ADMIN_SUB};

#[tokio::test]
async fn test_state_cookie_attributes() {
    let (app, _) = common::create_offline_test_app().await;

    let response = app.oneshot(get("/login", None)).await.unwrap();
    let cookies = set_cookie_headers(&response);
    let state = find_cookie(&cookies, "oauth_state").expect("missing oauth_state cookie");

    assert!(state.contains("HttpOnly"));
    assert!(state.contains("Secure"));
    assert!(state.contains("SameSite=Lax"));
    assert!(state.contains("Path=/"));
    assert!(state.contains("Max-Age=300"));
    assert_eq!(cookie_value(&state).len(), 32);
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let server = MockServer::start().await;
    common::mock_token_endpoint(&server).await;
    common::mock_userinfo(&server, ADMIN_SUB, "ada", &[]).await;
    let (app, _) = common::create_test_app(&server.uri()).await;

    let response = app
        .oneshot(get(
            "/callback?code=c&state=feedface",
            Some("oauth_state=feedface"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let cookies = set_cookie_headers(&response);
    let token = find_cookie(&cookies, "token").expect("missing token cookie");

    assert!(token.contains("HttpOnly"));
    assert!(token.contains("Secure"));
    assert!(token.contains("Path=/"));
    // Expiry is enforced server-side only
    assert!(!token.contains("Max-Age"));
    assert!(!token.contains("Expires"));
    assert_eq!(cookie_value(&token).len(), 43);

    // The state cookie is single-use
    let state = find_cookie(&cookies, "oauth_state").expect("state cookie removed");
    assert!(state.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_revokes_session_and_removes_cookie() {
    let (app, state) = common::create_offline_test_app().await;
    let user_id = common::seed_user(&state.db, ADMIN_SUB, "ada").await;
    let token = state.tokens.issue(user_id).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, format!("token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookies = set_cookie_headers(&response);
    let removed = find_cookie(&cookies, "token").expect("missing token removal");
    assert!(removed.contains("Path=/"));
    assert!(removed.contains("Max-Age=0"));

    assert!(state.tokens.lookup(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_without_session() {
    let (app, _) = common::create_offline_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

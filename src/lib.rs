// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in tracker: OAuth login and session handling.
//!
//! Users sign in through an external OAuth provider; the crate provisions
//! them locally, issues short-lived opaque session tokens and resolves those
//! tokens on every request.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use db::Db;
use services::{OAuthClient, TokenStore};

/// Shared application state.
pub struct AppState {
    pub db: Db,
    pub oauth: OAuthClient,
    pub tokens: TokenStore,
}

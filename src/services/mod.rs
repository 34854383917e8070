// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod oauth;
pub mod sweeper;
pub mod tokens;

pub use oauth::{AuthorizationRequest, OAuthClient, ProviderError, UserInfo};
pub use sweeper::ExpirySweeper;
pub use tokens::TokenStore;

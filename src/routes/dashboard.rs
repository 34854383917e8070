// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard entry point.
//!
//! Rendering the check-in board lives outside this crate; this route only
//! gates it on the session and hands back who is logged in.

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::found;
use crate::models::SessionUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}

/// The logged-in user's profile and capabilities.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub username: String,
    pub common_name: String,
    pub may_remove_checkins: bool,
    pub may_edit_types: bool,
}

async fn dashboard(session: SessionUser) -> Response {
    match session {
        SessionUser::Anonymous => found("/login"),
        SessionUser::Authenticated(user) => Json(DashboardResponse {
            username: user.username,
            common_name: user.common_name,
            may_remove_checkins: user.may_remove_checkins,
            may_edit_types: user.may_edit_types,
        })
        .into_response(),
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User statistics route.

use crate::error::Result;
use crate::models::UserStats;
use crate::routes::extract::ValidatedQuery;
use crate::routes::summary::IdentityBody;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/stats", get(get_stats))
}

/// Usage as of today. Creates the record on first sight, like an eligibility check.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(identity): ValidatedQuery<IdentityBody>,
) -> Result<Json<UserStats>> {
    let stats = state.ledger.stats(&identity.profile()).await?;
    Ok(Json(stats))
}

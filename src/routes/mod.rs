// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod extract;
pub mod summary;
pub mod users;
pub mod videos;

use crate::middleware::require_youtube_token;
use crate::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// True for origins the API answers cross-origin requests from.
///
/// The configured extension origin if set, otherwise any extension, plus
/// localhost for development.
pub fn is_allowed_origin(origin: &str, extension_origin: Option<&str>) -> bool {
    let extension_ok = match extension_origin {
        Some(allowed) => origin == allowed,
        None => origin.starts_with("chrome-extension://"),
    };
    extension_ok
        || origin.starts_with("http://localhost")
        || origin.starts_with("http://127.0.0.1")
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let extension_origin = state.config.extension_origin.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .is_ok_and(|o| is_allowed_origin(o, extension_origin.as_deref()))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION]);

    // Routes keyed by the userId/email the extension sends
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(summary::routes())
        .merge(users::routes());

    // Routes acting on the caller's YouTube account
    let youtube_routes =
        videos::routes().route_layer(middleware::from_fn(require_youtube_token));

    Router::new()
        .merge(public_routes)
        .merge(youtube_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins() {
        assert!(is_allowed_origin("chrome-extension://abc", None));
        assert!(is_allowed_origin("http://localhost:5173", None));
        assert!(!is_allowed_origin("https://evil.example", None));

        let pinned = Some("chrome-extension://abc");
        assert!(is_allowed_origin("chrome-extension://abc", pinned));
        assert!(!is_allowed_origin("chrome-extension://other", pinned));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google access token extraction for the liked-video routes.
//!
//! The extension obtains the OAuth token itself and forwards it as a bearer
//! token; this service only passes it on to the YouTube API, which is the
//! party that validates it.

use crate::error::AppError;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Caller's Google OAuth access token.
#[derive(Clone)]
pub struct YouTubeAccess {
    pub access_token: String,
}

impl std::fmt::Debug for YouTubeAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeAccess")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Extract the bearer token from `Authorization`, if well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a Google access token.
///
/// A missing token is reported as `NEEDS_REAUTH` so the extension starts
/// its sign-in flow.
pub async fn require_youtube_token(mut request: Request, next: Next) -> Result<Response, AppError> {
    let access_token = bearer_token(request.headers())
        .ok_or(AppError::NeedsReauthentication)?
        .to_string();

    request
        .extensions_mut()
        .insert(YouTubeAccess { access_token });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer ya29.token"));
        assert_eq!(bearer_token(&headers), Some("ya29.token"));
    }
}

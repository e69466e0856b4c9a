// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error maps to a stable machine-readable `code` the extension
//! branches on; `message` is for humans and logs only.

use crate::services::fetch::FetchError;
use crate::services::gemini::GenerationError;
use crate::services::transcript::TranscriptError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Shown instead of internal details for storage and internal failures.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, something went wrong on our side. Please try again later.";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Daily limit reached; `message` names the limit.
    #[error("{message}")]
    QuotaExceeded { message: String, limit: u32 },

    #[error("Invalid YouTube video URL provided. Please ensure it is a valid YouTube video link.")]
    InvalidVideoUrl,

    #[error("Authentication expired. Please sign in again.")]
    NeedsReauthentication,

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Fetch(FetchError),

    /// A record the caller had just read or created is gone. Reported to
    /// clients as a storage failure.
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NeedsReauthentication => AppError::NeedsReauthentication,
            other => AppError::Fetch(other),
        }
    }
}

impl AppError {
    /// Stable error code for the extension.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::QuotaExceeded { .. } => "LIMIT_REACHED",
            AppError::InvalidVideoUrl => "INVALID_VIDEO_URL",
            AppError::NeedsReauthentication => "NEEDS_REAUTH",
            AppError::Transcript(TranscriptError::DependencyMissing(_)) => "PYTHON_ENV_ERROR",
            AppError::Transcript(TranscriptError::ProcessStart(_)) => {
                "API_KEY_MISSING_OR_SERVICE_ERROR"
            }
            AppError::Transcript(_) => "TRANSCRIPT_FETCH_FAILED",
            AppError::Generation(_) => "API_KEY_MISSING_OR_SERVICE_ERROR",
            AppError::Fetch(FetchError::RatingsDisabled) => "RATINGS_DISABLED",
            AppError::Fetch(_) => "YOUTUBE_API_ERROR",
            AppError::NotFound(_) | AppError::Database(_) | AppError::Internal(_) => {
                "GENERIC_ERROR"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidVideoUrl => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::NeedsReauthentication => StatusCode::UNAUTHORIZED,
            AppError::Transcript(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Fetch(FetchError::RatingsDisabled) => StatusCode::FORBIDDEN,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(_)
            | AppError::Database(_)
            | AppError::Internal(_)
            | AppError::Generation(_) => APOLOGY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    needs_reauth: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(msg) => tracing::error!(error = %msg, "Database error"),
            AppError::NotFound(what) => tracing::error!(missing = %what, "Record disappeared"),
            AppError::Internal(err) => tracing::error!(error = %err, "Internal server error"),
            AppError::Generation(err) => tracing::error!(error = %err, "Generation service error"),
            AppError::Transcript(err) => tracing::warn!(error = %err, "Transcript fetch failed"),
            AppError::Fetch(err) => tracing::warn!(error = %err, "YouTube fetch failed"),
            _ => {}
        }

        let body = ErrorResponse {
            success: false,
            code: self.code(),
            message: self.user_message(),
            remaining: matches!(self, AppError::QuotaExceeded { .. }).then_some(0),
            needs_reauth: matches!(self, AppError::NeedsReauthentication),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

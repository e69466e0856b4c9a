// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary routes: generation, eligibility and the smoke test.

use crate::error::Result;
use crate::models::UserProfile;
use crate::routes::extract::ValidatedJson;
use crate::services::gemini::SMOKE_TEST_PROMPT;
use crate::services::summary::DEFAULT_LANGUAGE;
use crate::services::{Eligibility, RemainingQuota, SummaryRequest};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/summary/youtube", post(summarize_video))
        .route("/api/summary/eligibility", post(check_eligibility))
        .route("/api/summary/upgrade-to-pioneer", post(upgrade_to_pioneer))
        .route("/api/summary/test", get(smoke_test))
}

/// Identity fields the extension sends with quota-bearing requests.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdentityBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required field: userId"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required field: email"))]
    pub email: String,
    pub full_name: Option<String>,
}

impl IdentityBody {
    pub(crate) fn profile(&self) -> UserProfile {
        let profile = UserProfile::new(&self.user_id, &self.email);
        match self.full_name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => profile.with_full_name(name),
            None => profile,
        }
    }
}

// ─── Summaries ───────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required field: videoUrl"))]
    pub video_url: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub identity: IdentityBody,
    pub summary_language: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: String,
}

async fn summarize_video(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SummaryBody>,
) -> Result<Json<SummaryResponse>> {
    let request = SummaryRequest {
        video_url: body.video_url.clone(),
        profile: body.identity.profile(),
        language: body
            .summary_language
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    };

    tracing::info!(
        user_id = %request.profile.user_id,
        url = %request.video_url,
        language = %request.language,
        "Summary requested"
    );

    let summary = state.summaries.summarize(&request).await?;

    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}

// ─── Eligibility ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub success: bool,
    pub can_proceed: bool,
    pub remaining: RemainingQuota,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Eligibility> for EligibilityResponse {
    fn from(eligibility: Eligibility) -> Self {
        let remaining = eligibility.remaining();
        let can_proceed = eligibility.can_proceed();
        let message = match eligibility {
            Eligibility::Denied { message, .. } => Some(message),
            _ => None,
        };
        Self {
            success: true,
            can_proceed,
            remaining,
            message,
        }
    }
}

/// Report whether the user can summarize now, without consuming quota.
async fn check_eligibility(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<IdentityBody>,
) -> Result<Json<EligibilityResponse>> {
    let eligibility = state.eligibility.check(&body.profile()).await?;
    Ok(Json(eligibility.into()))
}

// ─── Pioneer upgrade ─────────────────────────────────────────

#[derive(Serialize)]
pub struct FeatureInactiveResponse {
    pub success: bool,
    pub code: &'static str,
    pub message: &'static str,
}

/// Self-service upgrades are not open yet.
async fn upgrade_to_pioneer() -> Json<FeatureInactiveResponse> {
    Json(FeatureInactiveResponse {
        success: false,
        code: "FEATURE_INACTIVE",
        message: "Pioneer Access is a limited-time offer coming soon to early supporters!",
    })
}

// ─── Smoke test ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeTestResponse {
    pub success: bool,
    pub message: &'static str,
    pub gemini_response: String,
    pub model: String,
    pub method: &'static str,
}

/// One round trip to the generation service.
async fn smoke_test(State(state): State<Arc<AppState>>) -> Result<Json<SmokeTestResponse>> {
    let generator = state.summaries.generator();
    let gemini_response = generator.generate(SMOKE_TEST_PROMPT).await?;

    Ok(Json(SmokeTestResponse {
        success: true,
        message: "Backend API is working correctly!",
        gemini_response,
        model: generator.model().to_string(),
        method: "transcript-based-summarization",
    }))
}

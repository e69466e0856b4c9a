// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Liked-video routes (require a Google access token).
//! The token middleware is applied in routes/mod.rs for these routes.

use crate::error::Result;
use crate::middleware::YouTubeAccess;
use crate::models::Video;
use crate::routes::extract::ValidatedQuery;
use crate::services::pagination::{
    AccumulatedPage, DrainOutcome, NOTHING_TO_EXPORT_MESSAGE, NO_LIKED_VIDEOS_MESSAGE,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/videos/liked", get(get_liked_videos))
        .route("/api/videos/liked/more", get(get_more_liked_videos))
        .route("/api/videos/liked/{video_id}", delete(remove_liked_video))
        .route("/api/videos/export", get(export_liked_videos))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LikedQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required field: userId"))]
    user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct MoreQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required field: userId"))]
    user_id: String,
    /// Checked by the accumulator so the message matches the interactive flow
    #[serde(default)]
    page_token: String,
}

/// One page of liked videos.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct LikedVideosResponse {
    pub success: bool,
    pub videos: Vec<Video>,
    /// Videos in this page
    pub count: usize,
    /// Videos accumulated so far
    pub total_count: usize,
    pub next_page_token: Option<String>,
    pub total_results: u32,
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AccumulatedPage> for LikedVideosResponse {
    fn from(acc: AccumulatedPage) -> Self {
        Self {
            success: true,
            count: acc.page.videos.len(),
            total_count: acc.total_count,
            next_page_token: acc.page.next_page_token,
            total_results: acc.page.total_results,
            strategy: acc.strategy.to_string(),
            videos: acc.page.videos,
            message: None,
        }
    }
}

/// First page; replaces the user's stored list.
async fn get_liked_videos(
    State(state): State<Arc<AppState>>,
    Extension(access): Extension<YouTubeAccess>,
    ValidatedQuery(query): ValidatedQuery<LikedQuery>,
) -> Result<Json<LikedVideosResponse>> {
    let acc = state
        .liked_videos
        .first_page(&query.user_id, &access.access_token)
        .await?;

    let mut response = LikedVideosResponse::from(acc);
    if response.videos.is_empty() {
        response.next_page_token = None;
        response.total_results = 0;
        response.message = Some(NO_LIKED_VIDEOS_MESSAGE.to_string());
    }
    Ok(Json(response))
}

/// Next page; appended to the user's stored list.
async fn get_more_liked_videos(
    State(state): State<Arc<AppState>>,
    Extension(access): Extension<YouTubeAccess>,
    ValidatedQuery(query): ValidatedQuery<MoreQuery>,
) -> Result<Json<LikedVideosResponse>> {
    let acc = state
        .liked_videos
        .load_more(&query.user_id, &access.access_token, &query.page_token)
        .await?;
    Ok(Json(acc.into()))
}

#[derive(Serialize)]
pub struct RemoveLikeResponse {
    pub success: bool,
    pub message: &'static str,
}

async fn remove_liked_video(
    State(state): State<Arc<AppState>>,
    Extension(access): Extension<YouTubeAccess>,
    Path(video_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<LikedQuery>,
) -> Result<Json<RemoveLikeResponse>> {
    state
        .liked_videos
        .remove_like(&query.user_id, &access.access_token, &video_id)
        .await?;

    Ok(Json(RemoveLikeResponse {
        success: true,
        message: "Video removed from YouTube liked list",
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyExportResponse {
    pub success: bool,
    pub total_videos: u32,
    pub message: &'static str,
}

/// Every liked video as a downloadable JSON document.
async fn export_liked_videos(
    State(state): State<Arc<AppState>>,
    Extension(access): Extension<YouTubeAccess>,
) -> Result<Response> {
    match state.liked_videos.drain(&access.access_token).await? {
        DrainOutcome::Empty => Ok(Json(EmptyExportResponse {
            success: true,
            total_videos: 0,
            message: NOTHING_TO_EXPORT_MESSAGE,
        })
        .into_response()),
        DrainOutcome::Complete(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name());
            Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(export)).into_response())
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube Data API v3 client.
//!
//! Handles:
//! - Resolving and paging the "liked videos" playlist (playlist strategy)
//! - Listing videos rated "like" (rating strategy)
//! - Removing a like
//!
//! Every call uses the caller's OAuth access token. HTTP 401 anywhere maps to
//! [`FetchError::NeedsReauthentication`].

use crate::models::video::watch_url;
use crate::models::{FetchPage, Video};
use crate::services::fetch::{FetchError, LikedVideoSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Items per page; the API maximum.
const PAGE_SIZE: &str = "50";

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Find the authenticated channel's likes playlist and confirm it is readable.
    async fn liked_playlist_id(&self, access_token: &str) -> Result<String, FetchError> {
        let response = self
            .get(
                "channels",
                access_token,
                &[("part", "contentDetails,snippet"), ("mine", "true")],
            )
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            tracing::warn!("Channel access denied");
            return Err(FetchError::ChannelAccessDenied);
        }

        let channels: ListResponse<Channel> = read_json(response).await?;
        let playlist_id = liked_playlist_from_channels(channels)?;

        // Probe: a likes playlist can exist but be unreadable (private likes).
        let probe = self
            .get(
                "playlistItems",
                access_token,
                &[
                    ("part", "snippet"),
                    ("playlistId", playlist_id.as_str()),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        if !probe.status().is_success() {
            tracing::warn!(status = %probe.status(), "Playlist access probe failed");
            return Err(FetchError::PlaylistAccessDenied);
        }

        tracing::debug!(playlist_id = %playlist_id, "Liked playlist resolved");
        Ok(playlist_id)
    }

    /// Batch-resolve snippet, statistics and duration for up to 50 IDs.
    async fn video_details(
        &self,
        access_token: &str,
        ids: &[&str],
    ) -> Result<Vec<ApiVideo>, FetchError> {
        let joined = ids.join(",");
        let response = self
            .get(
                "videos",
                access_token,
                &[
                    ("part", "snippet,statistics,contentDetails"),
                    ("id", joined.as_str()),
                ],
            )
            .await?;

        let details: ListResponse<ApiVideo> = read_json(response).await?;
        Ok(details.items)
    }

    /// GET `{base}/{path}` with bearer auth. Maps 401 before callers look at the status.
    async fn get(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(FetchError::NeedsReauthentication);
        }

        Ok(response)
    }
}

#[async_trait]
impl LikedVideoSource for YouTubeClient {
    async fn fetch_via_playlist(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError> {
        let playlist_id = self.liked_playlist_id(access_token).await?;

        let mut query = vec![
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id.as_str()),
            ("maxResults", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get("playlistItems", access_token, &query).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!(
                page_token = page_token.unwrap_or(""),
                "Playlist 404 during pagination"
            );
            return Err(FetchError::PaginationFailed);
        }

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("invalidPageToken") {
                tracing::warn!(
                    page_token = page_token.unwrap_or(""),
                    "Playlist rejected page token"
                );
                return Err(FetchError::PaginationFailed);
            }
            return Err(FetchError::Api { status: 400, body });
        }

        let items: ListResponse<PlaylistItem> = read_json(response).await?;
        if items.items.is_empty() {
            return Ok(FetchPage::empty(items.total_results()));
        }

        let ids: Vec<&str> = items
            .items
            .iter()
            .map(|item| item.content_details.video_id.as_str())
            .collect();
        let details = self.video_details(access_token, &ids).await?;

        let page = playlist_page(&items, details);
        tracing::debug!(
            count = page.videos.len(),
            has_next = page.next_page_token.is_some(),
            "Fetched playlist page"
        );
        Ok(page)
    }

    async fn fetch_via_rating(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError> {
        let mut query = vec![
            ("part", "snippet,statistics,contentDetails"),
            ("myRating", "like"),
            ("maxResults", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get("videos", access_token, &query).await?;
        let listing: ListResponse<ApiVideo> = read_json(response).await?;

        let page = rating_page(listing);
        tracing::debug!(
            count = page.videos.len(),
            has_next = page.next_page_token.is_some(),
            "Fetched rating page"
        );
        Ok(page)
    }

    async fn remove_like(&self, access_token: &str, video_id: &str) -> Result<(), FetchError> {
        let url = format!("{}/videos/rate", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .form(&[("id", video_id), ("rating", "none")])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(video_id, "Removed video from liked list");
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::NeedsReauthentication);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::FORBIDDEN && body.contains("videoRatingDisabled") {
            return Err(FetchError::RatingsDisabled);
        }

        Err(FetchError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

/// Check status and parse the JSON body.
async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| FetchError::Parse(e.to_string()))
}

// ─── API payloads ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
    page_info: Option<PageInfo>,
}

impl<T> ListResponse<T> {
    fn total_results(&self) -> u32 {
        self.page_info.as_ref().map_or(0, |p| p.total_results)
    }

    /// Reported total, or the page size when the API reports none.
    fn total_or(&self, fallback: usize) -> u32 {
        match self.total_results() {
            0 => u32::try_from(fallback).unwrap_or(u32::MAX),
            total => total,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    total_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    likes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: Option<PlaylistItemSnippet>,
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    /// When the item was added to the playlist
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVideo {
    id: String,
    snippet: VideoSnippet,
    statistics: Option<VideoStatistics>,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    #[serde(default)]
    duration: String,
}

// ─── Mapping ─────────────────────────────────────────────────

fn liked_playlist_from_channels(channels: ListResponse<Channel>) -> Result<String, FetchError> {
    let channel = channels
        .items
        .into_iter()
        .next()
        .ok_or(FetchError::NoChannelFound)?;

    let related = channel
        .content_details
        .and_then(|details| details.related_playlists)
        .ok_or(FetchError::NoRelatedPlaylists)?;

    related
        .likes
        .filter(|id| !id.is_empty())
        .ok_or(FetchError::NoLikedPlaylist)
}

fn parse_count(value: Option<&String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn to_video(api: ApiVideo, liked_at: Option<String>) -> Video {
    let snippet = api.snippet;
    let thumbnail_url = snippet
        .thumbnails
        .medium
        .or(snippet.thumbnails.default)
        .map(|t| t.url)
        .unwrap_or_default();
    let (view_count, like_count) = api
        .statistics
        .as_ref()
        .map_or((0, 0), |s| (parse_count(s.view_count.as_ref()), parse_count(s.like_count.as_ref())));

    Video {
        url: watch_url(&api.id),
        id: api.id,
        title: snippet.title,
        channel_title: snippet.channel_title,
        channel_id: snippet.channel_id,
        liked_at: liked_at.unwrap_or_else(|| snippet.published_at.clone()),
        published_at: snippet.published_at,
        thumbnail_url,
        view_count,
        like_count,
        duration: api
            .content_details
            .map(|c| c.duration)
            .unwrap_or_default(),
    }
}

/// Join playlist items with their details, keeping playlist order.
///
/// Items whose details are missing (deleted or private videos) are dropped.
fn playlist_page(items: &ListResponse<PlaylistItem>, details: Vec<ApiVideo>) -> FetchPage {
    let mut by_id: HashMap<String, ApiVideo> =
        details.into_iter().map(|v| (v.id.clone(), v)).collect();

    let videos: Vec<Video> = items
        .items
        .iter()
        .filter_map(|item| {
            let video_id = &item.content_details.video_id;
            let Some(details) = by_id.remove(video_id) else {
                tracing::warn!(video_id = %video_id, "Video details not found");
                return None;
            };
            let liked_at = item.snippet.as_ref().map(|s| s.published_at.clone());
            Some(to_video(details, liked_at))
        })
        .collect();

    FetchPage {
        total_results: items.total_or(videos.len()),
        next_page_token: items.next_page_token.clone(),
        videos,
    }
}

fn rating_page(listing: ListResponse<ApiVideo>) -> FetchPage {
    if listing.items.is_empty() {
        return FetchPage::empty(listing.total_results());
    }

    let total_results = listing.total_or(listing.items.len());
    let next_page_token = listing.next_page_token;
    let videos = listing
        .items
        .into_iter()
        .map(|video| to_video(video, None))
        .collect();

    FetchPage {
        videos,
        next_page_token,
        total_results,
    }
}

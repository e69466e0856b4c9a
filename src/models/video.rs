// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Liked-video models for the fetch pipeline, cache and export.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Matches the 11-character id in watch, short-link, embed and legacy URLs.
static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video id pattern is valid")
});

/// A YouTube video ID extracted from a user-supplied URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the video ID from a YouTube URL. Returns `None` if the URL
    /// is not a recognizable YouTube video link.
    pub fn from_url(url: &str) -> Option<Self> {
        VIDEO_ID_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical watch URL for a video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A liked video, as returned by either fetch strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct Video {
    /// YouTube video ID (unique per source)
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub channel_id: String,
    /// Upload time (ISO 8601)
    pub published_at: String,
    /// When the video was added to the likes list (ISO 8601)
    pub liked_at: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub view_count: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub like_count: u64,
    /// ISO 8601 duration (e.g. "PT4M13S")
    pub duration: String,
    pub url: String,
}

/// One page of liked videos from a fetch strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchPage {
    pub videos: Vec<Video>,
    /// Cursor for the next page; `None` means the listing is exhausted
    pub next_page_token: Option<String>,
    pub total_results: u32,
}

impl FetchPage {
    pub fn empty(total_results: u32) -> Self {
        Self {
            videos: Vec::new(),
            next_page_token: None,
            total_results,
        }
    }
}

/// Videos accumulated by interactive "load more" paging (`liked_videos/{user}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LikedVideoCache {
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub total_results: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Counts from appending one page to a [`LikedVideoCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheAppend {
    pub added: usize,
    pub duplicates: usize,
    /// Size of the stored set afterwards
    pub total: usize,
}

impl LikedVideoCache {
    /// Append the unseen videos of `page` and take over its cursor and total.
    pub fn append_page(&mut self, page: &FetchPage, now: DateTime<Utc>) -> CacheAppend {
        let mut seen: HashSet<String> = self.videos.iter().map(|v| v.id.clone()).collect();
        let (added, duplicates) = merge_unique(&mut self.videos, &mut seen, page.videos.clone());

        self.next_page_token = page.next_page_token.clone();
        self.total_results = page.total_results;
        self.updated_at = Some(now);

        CacheAppend {
            added,
            duplicates,
            total: self.videos.len(),
        }
    }
}

/// Append `incoming` videos whose IDs are not yet in `seen`.
///
/// Returns `(added, duplicates)`.
pub fn merge_unique(
    videos: &mut Vec<Video>,
    seen: &mut HashSet<String>,
    incoming: Vec<Video>,
) -> (usize, usize) {
    let before = videos.len();
    let offered = incoming.len();

    videos.extend(incoming.into_iter().filter(|v| seen.insert(v.id.clone())));

    let added = videos.len() - before;
    (added, offered - added)
}

/// Video entry in a full export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct ExportedVideo {
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub video: Video,
    /// 1-based position in the export
    pub export_index: u32,
}

/// Export statistics block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct ExportStatistics {
    pub total_videos: u32,
    pub total_available_on_you_tube: u32,
    pub pages_fetched: u32,
    /// Strategy that served the final page ("playlist" or "rating")
    pub strategy: String,
    /// False when the drain stopped at the configured page cap
    pub complete: bool,
}

/// Full export of a user's liked videos.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct LikedVideoExport {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub export_date: DateTime<Utc>,
    pub export_type: String,
    pub statistics: ExportStatistics,
    pub videos: Vec<ExportedVideo>,
}

impl LikedVideoExport {
    pub const EXPORT_TYPE: &'static str = "FULL_LIKED_VIDEOS_EXPORT";

    pub fn new(videos: Vec<Video>, statistics: ExportStatistics, now: DateTime<Utc>) -> Self {
        let videos = videos
            .into_iter()
            .zip(1u32..)
            .map(|(video, export_index)| ExportedVideo {
                video,
                export_index,
            })
            .collect();

        Self {
            export_date: now,
            export_type: Self::EXPORT_TYPE.to_string(),
            statistics,
            videos,
        }
    }

    /// Suggested download file name.
    pub fn file_name(&self) -> String {
        format!(
            "youtube-liked-videos-FULL-{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}

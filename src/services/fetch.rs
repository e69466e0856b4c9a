// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Liked-video fetch strategies with automatic failover.
//!
//! The playlist strategy is tried first. A known set of recoverable failures
//! switches to the rating strategy for the same logical page; authentication
//! failures always propagate untouched.

use crate::models::FetchPage;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Failure of a single fetch strategy (or of both).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("CHANNEL_ACCESS_DENIED")]
    ChannelAccessDenied,

    #[error("NO_CHANNEL_FOUND")]
    NoChannelFound,

    #[error("NO_RELATED_PLAYLISTS")]
    NoRelatedPlaylists,

    #[error("NO_LIKED_PLAYLIST")]
    NoLikedPlaylist,

    #[error("PLAYLIST_ACCESS_DENIED")]
    PlaylistAccessDenied,

    /// The playlist rejected a cursor it issued: 404, or 400 `invalidPageToken`.
    #[error("PLAYLIST_PAGINATION_FAILED")]
    PaginationFailed,

    #[error("Authentication expired. Please sign in again.")]
    NeedsReauthentication,

    #[error("The video owner has disabled ratings for this video.")]
    RatingsDisabled,

    #[error("YouTube API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("YouTube request failed: {0}")]
    Transport(String),

    #[error("Unexpected YouTube response: {0}")]
    Parse(String),

    #[error(
        "Unable to fetch liked videos. Primary error: {primary}. \
         Alternative method also failed: {secondary}. Please ensure your liked \
         videos are public in your YouTube privacy settings and try re-authenticating."
    )]
    BothStrategiesFailed { primary: String, secondary: String },
}

impl FetchError {
    /// True for primary-strategy failures the rating strategy can recover from.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            FetchError::ChannelAccessDenied
                | FetchError::NoChannelFound
                | FetchError::NoRelatedPlaylists
                | FetchError::NoLikedPlaylist
                | FetchError::PlaylistAccessDenied
                | FetchError::PaginationFailed
        )
    }
}

/// Upstream source of liked videos, one method per strategy.
#[async_trait]
pub trait LikedVideoSource: Send + Sync {
    /// Resolve the likes playlist and read one page of it.
    async fn fetch_via_playlist(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError>;

    /// Query videos rated "like" directly.
    async fn fetch_via_rating(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError>;

    /// Clear the user's rating on a video.
    async fn remove_like(&self, access_token: &str, video_id: &str) -> Result<(), FetchError>;
}

/// The two retrieval strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Playlist,
    Rating,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Playlist => "playlist",
            Strategy::Rating => "rating",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy a run is on. Only ever moves from primary to secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyMode {
    #[default]
    UsingPrimary,
    UsingSecondary,
}

impl StrategyMode {
    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyMode::UsingPrimary => Strategy::Playlist,
            StrategyMode::UsingSecondary => Strategy::Rating,
        }
    }

    /// The single transition. Idempotent.
    pub fn fall_back(&mut self) {
        *self = StrategyMode::UsingSecondary;
    }
}

/// Cursor handling when the primary fails and the secondary takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOnSwitch {
    /// Hand the same cursor to the secondary.
    Resume,
    /// Start the secondary from its first page.
    Restart,
}

/// A page plus the strategy that produced it.
#[derive(Debug, Clone)]
pub struct SelectedPage {
    pub page: FetchPage,
    pub strategy: Strategy,
    /// True if this call moved the run from primary to secondary.
    pub switched: bool,
}

/// Chooses a strategy per request and falls back on recoverable failures.
#[derive(Clone)]
pub struct FetchStrategySelector {
    source: Arc<dyn LikedVideoSource>,
}

impl FetchStrategySelector {
    pub fn new(source: Arc<dyn LikedVideoSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn LikedVideoSource> {
        &self.source
    }

    /// Fetch one page starting from the primary strategy.
    pub async fn fetch_page(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<SelectedPage, FetchError> {
        let mut mode = StrategyMode::UsingPrimary;
        self.fetch_with(&mut mode, access_token, page_token, CursorOnSwitch::Resume)
            .await
    }

    /// Fetch one page in `mode`, updating it if a fallback happens.
    pub async fn fetch_with(
        &self,
        mode: &mut StrategyMode,
        access_token: &str,
        page_token: Option<&str>,
        on_switch: CursorOnSwitch,
    ) -> Result<SelectedPage, FetchError> {
        if *mode == StrategyMode::UsingSecondary {
            let page = self.source.fetch_via_rating(access_token, page_token).await?;
            return Ok(SelectedPage {
                page,
                strategy: Strategy::Rating,
                switched: false,
            });
        }

        let primary_err = match self
            .source
            .fetch_via_playlist(access_token, page_token)
            .await
        {
            Ok(page) => {
                return Ok(SelectedPage {
                    page,
                    strategy: Strategy::Playlist,
                    switched: false,
                })
            }
            Err(err) if err.triggers_fallback() => err,
            Err(err) => return Err(err),
        };

        tracing::warn!(
            error = %primary_err,
            has_cursor = page_token.is_some(),
            "Playlist strategy failed, falling back to rating strategy"
        );
        mode.fall_back();

        let secondary_token = match on_switch {
            CursorOnSwitch::Resume => page_token,
            CursorOnSwitch::Restart => None,
        };

        match self
            .source
            .fetch_via_rating(access_token, secondary_token)
            .await
        {
            Ok(page) => Ok(SelectedPage {
                page,
                strategy: Strategy::Rating,
                switched: true,
            }),
            Err(FetchError::NeedsReauthentication) => Err(FetchError::NeedsReauthentication),
            Err(secondary_err) => {
                tracing::error!(
                    primary = %primary_err,
                    secondary = %secondary_err,
                    "Both fetch strategies failed"
                );
                Err(FetchError::BothStrategiesFailed {
                    primary: primary_err.to_string(),
                    secondary: secondary_err.to_string(),
                })
            }
        }
    }
}

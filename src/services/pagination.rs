// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drives the fetch selector across pages.
//!
//! Two modes:
//! - Interactive: first page, then one "load more" page per call, with the
//!   accumulated set persisted between calls.
//! - Full drain: every page in one run, for the export.
//!
//! Both deduplicate by video ID.

use crate::db::LikedVideoStore;
use crate::error::AppError;
use crate::models::video::merge_unique;
use crate::models::{ExportStatistics, FetchPage, LikedVideoCache, LikedVideoExport, Video};
use crate::services::fetch::{CursorOnSwitch, FetchStrategySelector, Strategy, StrategyMode};
use crate::time_utils::Clock;
use std::collections::HashSet;
use std::sync::Arc;

pub const NO_LIKED_VIDEOS_MESSAGE: &str = "No liked videos found. This could be because your \
     liked videos are private or you haven't liked any videos yet.";

pub const NOTHING_TO_EXPORT_MESSAGE: &str = "No liked videos found to export.";

/// One interactively fetched page.
#[derive(Debug, Clone)]
pub struct AccumulatedPage {
    /// The videos of this page only
    pub page: FetchPage,
    pub strategy: Strategy,
    /// Size of the stored set after this page
    pub total_count: usize,
}

/// Result of a full drain.
#[derive(Debug, Clone)]
pub enum DrainOutcome {
    /// The account has no liked videos (not an error).
    Empty,
    Complete(LikedVideoExport),
}

#[derive(Clone)]
pub struct PaginationAccumulator {
    selector: FetchStrategySelector,
    store: Arc<dyn LikedVideoStore>,
    clock: Arc<dyn Clock>,
    max_pages: Option<usize>,
}

impl PaginationAccumulator {
    pub fn new(
        selector: FetchStrategySelector,
        store: Arc<dyn LikedVideoStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            selector,
            store,
            clock,
            max_pages: None,
        }
    }

    /// Stop a drain after `max_pages` pages. `None` means unbounded.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetch page one and replace the stored set with it.
    pub async fn first_page(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<AccumulatedPage, AppError> {
        let selected = self.selector.fetch_page(access_token, None).await?;

        let mut videos = Vec::with_capacity(selected.page.videos.len());
        let mut seen = HashSet::new();
        merge_unique(&mut videos, &mut seen, selected.page.videos.clone());

        let cache = LikedVideoCache {
            videos,
            next_page_token: selected.page.next_page_token.clone(),
            total_results: selected.page.total_results,
            updated_at: Some(self.clock.now()),
        };
        self.store.set_liked_videos(user_id, &cache).await?;

        tracing::info!(
            user_id,
            count = cache.videos.len(),
            strategy = %selected.strategy,
            "Fetched first page of liked videos"
        );

        Ok(AccumulatedPage {
            total_count: cache.videos.len(),
            page: selected.page,
            strategy: selected.strategy,
        })
    }

    /// Fetch the page at `page_token` and append it to the stored set.
    pub async fn load_more(
        &self,
        user_id: &str,
        access_token: &str,
        page_token: &str,
    ) -> Result<AccumulatedPage, AppError> {
        if page_token.is_empty() {
            return Err(AppError::BadRequest(
                "No page token provided for pagination".to_string(),
            ));
        }

        let selected = self
            .selector
            .fetch_page(access_token, Some(page_token))
            .await?;

        let appended = self
            .store
            .append_liked_videos(user_id, &selected.page, self.clock.now())
            .await?;

        tracing::info!(
            user_id,
            added = appended.added,
            duplicates = appended.duplicates,
            total = appended.total,
            strategy = %selected.strategy,
            "Loaded more liked videos"
        );

        Ok(AccumulatedPage {
            total_count: appended.total,
            page: selected.page,
            strategy: selected.strategy,
        })
    }

    /// Remove a like on YouTube, then drop the video from the stored set.
    pub async fn remove_like(
        &self,
        user_id: &str,
        access_token: &str,
        video_id: &str,
    ) -> Result<(), AppError> {
        self.selector
            .source()
            .remove_like(access_token, video_id)
            .await?;

        if let Some(mut cache) = self.store.get_liked_videos(user_id).await? {
            let before = cache.videos.len();
            cache.videos.retain(|v| v.id != video_id);
            if cache.videos.len() != before {
                cache.total_results = cache.total_results.saturating_sub(1);
                cache.updated_at = Some(self.clock.now());
                self.store.set_liked_videos(user_id, &cache).await?;
            }
        }

        Ok(())
    }

    /// Fetch every page until the cursor runs out.
    ///
    /// After a fallback the run stays on the rating strategy, which restarts
    /// from its own first page; overlap is removed by ID.
    pub async fn drain(&self, access_token: &str) -> Result<DrainOutcome, AppError> {
        let mut mode = StrategyMode::UsingPrimary;
        let mut cursor: Option<String> = None;
        let mut videos: Vec<Video> = Vec::new();
        let mut seen = HashSet::new();
        let mut pages_fetched: u32 = 0;
        let mut total_available: u32 = 0;
        let mut complete = true;

        loop {
            let selected = self
                .selector
                .fetch_with(
                    &mut mode,
                    access_token,
                    cursor.as_deref(),
                    CursorOnSwitch::Restart,
                )
                .await?;
            pages_fetched += 1;

            if selected.switched {
                tracing::info!(
                    page = pages_fetched,
                    "Export switched to rating strategy for the rest of the run"
                );
            }

            let page = selected.page;
            let (added, duplicates) = merge_unique(&mut videos, &mut seen, page.videos);
            total_available = match page.total_results {
                0 => u32::try_from(videos.len()).unwrap_or(u32::MAX),
                total => total,
            };
            cursor = page.next_page_token;

            tracing::debug!(
                page = pages_fetched,
                added,
                duplicates,
                total = videos.len(),
                "Export progress"
            );

            if cursor.is_none() {
                break;
            }
            if self
                .max_pages
                .is_some_and(|max| pages_fetched as usize >= max)
            {
                tracing::warn!(
                    pages_fetched,
                    fetched = videos.len(),
                    "Export stopped at page cap"
                );
                complete = false;
                break;
            }
        }

        if videos.is_empty() {
            tracing::info!(pages_fetched, "Export found no liked videos");
            return Ok(DrainOutcome::Empty);
        }

        let statistics = ExportStatistics {
            total_videos: u32::try_from(videos.len()).unwrap_or(u32::MAX),
            total_available_on_you_tube: total_available,
            pages_fetched,
            strategy: mode.strategy().as_str().to_string(),
            complete,
        };

        tracing::info!(
            total_videos = statistics.total_videos,
            pages_fetched,
            strategy = %statistics.strategy,
            complete,
            "Export finished"
        );

        Ok(DrainOutcome::Complete(LikedVideoExport::new(
            videos,
            statistics,
            self.clock.now(),
        )))
    }
}

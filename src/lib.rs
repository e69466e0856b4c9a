// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! YouTube Maestro: liked-video export and AI summaries for a browser extension
//!
//! This crate provides the backend API: a per-user daily summary quota,
//! transcript summarization, and a liked-videos pipeline that falls back
//! between two YouTube API strategies.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{LikedVideoStore, UserStore};
use services::{
    EligibilityChecker, FetchStrategySelector, LikedVideoSource, PaginationAccumulator,
    QuotaLedger, SummaryCoordinator, SummaryGenerator, TranscriptSource,
};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub ledger: QuotaLedger,
    pub eligibility: EligibilityChecker,
    pub summaries: SummaryCoordinator,
    pub liked_videos: PaginationAccumulator,
}

/// External collaborators the state is assembled from.
pub struct Collaborators<S> {
    /// Storage backend; serves both user records and the liked-video cache
    pub store: Arc<S>,
    pub clock: Arc<dyn Clock>,
    pub video_source: Arc<dyn LikedVideoSource>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub generator: Arc<dyn SummaryGenerator>,
}

impl AppState {
    /// Wire the services together.
    pub fn new<S>(config: Config, deps: Collaborators<S>) -> Self
    where
        S: UserStore + LikedVideoStore + 'static,
    {
        let users: Arc<dyn UserStore> = deps.store.clone();
        let cache: Arc<dyn LikedVideoStore> = deps.store;

        let ledger = QuotaLedger::new(users, deps.clock.clone());
        let eligibility =
            EligibilityChecker::new(ledger.clone(), deps.clock.clone(), config.free_daily_limit);
        let summaries = SummaryCoordinator::new(
            eligibility.clone(),
            ledger.clone(),
            deps.transcripts,
            deps.generator,
        );
        let liked_videos = PaginationAccumulator::new(
            FetchStrategySelector::new(deps.video_source),
            cache,
            deps.clock.clone(),
        )
        .with_max_pages(config.max_export_pages);

        Self {
            config,
            clock: deps.clock,
            ledger,
            eligibility,
            summaries,
            liked_videos,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod user;
pub mod video;

pub use user::{UserProfile, UserRecord, UserStats};
pub use video::{
    CacheAppend, ExportStatistics, FetchPage, LikedVideoCache, LikedVideoExport, Video, VideoId,
};

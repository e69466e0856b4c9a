// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Quota records and the liked-video cache live behind the [`UserStore`] and
//! [`LikedVideoStore`] traits. Every mutation of `daily_count` or
//! `last_request_date` is a single atomic read-modify-write in the backend.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::InMemoryDb;

use crate::error::AppError;
use crate::models::{CacheAppend, FetchPage, LikedVideoCache, UserProfile, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Collection names as constants.
pub mod collections {
    /// Per-user quota records (keyed by encoded user id)
    pub const USERS: &str = "users";
    /// Accumulated "load more" results (keyed by encoded user id)
    pub const LIKED_VIDEOS: &str = "liked_videos";
}

/// Document ID for an opaque user ID.
///
/// Firestore IDs cannot contain `/`, so the raw ID is percent-encoded.
pub fn user_doc_id(user_id: &str) -> String {
    urlencoding::encode(user_id).into_owned()
}

/// Storage operations on user quota records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user record by ID.
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError>;

    /// Insert a new record (count 0, dated `today`) or merge profile fields
    /// into the existing one. Never touches counters or dates of an existing
    /// record.
    async fn upsert_user(
        &self,
        profile: &UserProfile,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, AppError>;

    /// Atomically add one to `daily_count` and return the new value.
    ///
    /// Fails with `NotFound` when the record does not exist.
    async fn increment_daily_count(&self, user_id: &str) -> Result<u32, AppError>;

    /// Atomically zero the count and set the date to `today` if the stored
    /// date precedes it. Returns the record as stored afterwards.
    ///
    /// Fails with `NotFound` when the record does not exist.
    async fn reset_daily_count_if_stale(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<UserRecord, AppError>;

    /// Set the pioneer flag. Fails with `NotFound` when the record does not exist.
    async fn set_pioneer(&self, user_id: &str, is_pioneer: bool) -> Result<UserRecord, AppError>;
}

/// Storage for the interactive liked-video listing.
#[async_trait]
pub trait LikedVideoStore: Send + Sync {
    async fn get_liked_videos(&self, user_id: &str) -> Result<Option<LikedVideoCache>, AppError>;

    async fn set_liked_videos(
        &self,
        user_id: &str,
        cache: &LikedVideoCache,
    ) -> Result<(), AppError>;

    /// Atomically append `page` to the stored set (created empty if absent).
    async fn append_liked_videos(
        &self,
        user_id: &str,
        page: &FetchPage,
        now: DateTime<Utc>,
    ) -> Result<CacheAppend, AppError>;
}

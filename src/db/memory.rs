// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Each user record sits in a `DashMap` shard; `get_mut`/`entry` hold the
//! shard's write lock for the whole read-modify-write, which gives the same
//! atomicity the Firestore transactions provide.

use crate::db::{LikedVideoStore, UserStore};
use crate::error::AppError;
use crate::models::{CacheAppend, FetchPage, LikedVideoCache, UserProfile, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

/// `DashMap`-backed store.
#[derive(Debug, Default)]
pub struct InMemoryDb {
    users: DashMap<String, UserRecord>,
    liked_videos: DashMap<String, LikedVideoCache>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a record verbatim. Used to seed fixtures.
    pub fn put_user(&self, record: UserRecord) {
        self.users.insert(record.id.clone(), record);
    }

    /// Drop a record, as an external administrative deletion would.
    pub fn remove_user(&self, user_id: &str) -> Option<UserRecord> {
        self.users.remove(user_id).map(|(_, record)| record)
    }

    fn not_found(user_id: &str) -> AppError {
        AppError::NotFound(format!("User {}", user_id))
    }
}

#[async_trait]
impl UserStore for InMemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(user_id).map(|r| r.value().clone()))
    }

    async fn upsert_user(
        &self,
        profile: &UserProfile,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let record = self
            .users
            .entry(profile.user_id.clone())
            .and_modify(|existing| existing.apply_profile(profile))
            .or_insert_with(|| UserRecord::new(profile, today, now));
        Ok(record.value().clone())
    }

    async fn increment_daily_count(&self, user_id: &str) -> Result<u32, AppError> {
        let mut record = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| Self::not_found(user_id))?;
        record.daily_count = record.daily_count.saturating_add(1);
        Ok(record.daily_count)
    }

    async fn reset_daily_count_if_stale(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<UserRecord, AppError> {
        let mut record = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| Self::not_found(user_id))?;
        record.reset_if_before(today);
        Ok(record.value().clone())
    }

    async fn set_pioneer(&self, user_id: &str, is_pioneer: bool) -> Result<UserRecord, AppError> {
        let mut record = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| Self::not_found(user_id))?;
        record.is_pioneer = is_pioneer;
        Ok(record.value().clone())
    }
}

#[async_trait]
impl LikedVideoStore for InMemoryDb {
    async fn get_liked_videos(&self, user_id: &str) -> Result<Option<LikedVideoCache>, AppError> {
        Ok(self.liked_videos.get(user_id).map(|c| c.value().clone()))
    }

    async fn set_liked_videos(
        &self,
        user_id: &str,
        cache: &LikedVideoCache,
    ) -> Result<(), AppError> {
        self.liked_videos.insert(user_id.to_string(), cache.clone());
        Ok(())
    }

    async fn append_liked_videos(
        &self,
        user_id: &str,
        page: &FetchPage,
        now: DateTime<Utc>,
    ) -> Result<CacheAppend, AppError> {
        let mut cache = self.liked_videos.entry(user_id.to_string()).or_default();
        Ok(cache.append_page(page, now))
    }
}

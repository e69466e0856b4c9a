// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user daily request counter.
//!
//! All writes to `daily_count` and `last_request_date` go through
//! [`QuotaLedger`]; the backing store performs each one as a single atomic
//! read-modify-write.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{UserProfile, UserRecord, UserStats};
use crate::time_utils::Clock;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct QuotaLedger {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Upsert the user. Never resets the counter of an existing record.
    pub async fn get_or_create(&self, profile: &UserProfile) -> Result<UserRecord, AppError> {
        let record = self
            .store
            .upsert_user(profile, self.clock.today(), self.clock.now())
            .await?;

        tracing::debug!(
            user_id = %record.id,
            daily_count = record.daily_count,
            is_pioneer = record.is_pioneer,
            "User record loaded"
        );
        Ok(record)
    }

    /// Record one successful use. Returns the new count.
    pub async fn increment(&self, user_id: &str) -> Result<u32, AppError> {
        let count = self.store.increment_daily_count(user_id).await?;
        tracing::info!(user_id, daily_count = count, "Usage recorded");
        Ok(count)
    }

    /// Zero the count if the stored date precedes `today`.
    pub async fn reset_if_new_day(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<UserRecord, AppError> {
        self.store.reset_daily_count_if_stale(user_id, today).await
    }

    /// Grant unlimited use. Administrative callers only.
    pub async fn upgrade_to_pioneer(&self, user_id: &str) -> Result<UserRecord, AppError> {
        let record = self.store.set_pioneer(user_id, true).await?;
        tracing::info!(user_id, "User upgraded to pioneer");
        Ok(record)
    }

    /// Upsert and report usage as of today.
    pub async fn stats(&self, profile: &UserProfile) -> Result<UserStats, AppError> {
        let record = self.get_or_create(profile).await?;
        Ok(UserStats::from_record(record, self.clock.today()))
    }
}

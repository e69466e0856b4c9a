// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User quota record for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity supplied by the extension with every quota-bearing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

/// Per-user quota record stored in Firestore (`users/{id}`).
///
/// `daily_count` only means something relative to `last_request_date`;
/// use [`UserRecord::effective_count`] when reading it outside the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque user ID issued by the identity provider
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Pioneers bypass the daily limit entirely
    #[serde(default)]
    pub is_pioneer: bool,
    /// Summaries recorded on `last_request_date`
    #[serde(default)]
    pub daily_count: u32,
    /// Calendar day `daily_count` belongs to
    #[serde(default)]
    pub last_request_date: Option<NaiveDate>,
    pub registered_at: DateTime<Utc>,
}

impl UserRecord {
    /// Build the record inserted on first sight of a user.
    pub fn new(profile: &UserProfile, today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: profile.user_id.clone(),
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            is_pioneer: false,
            daily_count: 0,
            last_request_date: Some(today),
            registered_at: now,
        }
    }

    /// Merge profile fields on upsert conflict.
    ///
    /// Counters and dates are left alone; an absent name keeps the stored one.
    pub fn apply_profile(&mut self, profile: &UserProfile) {
        self.email = profile.email.clone();
        if let Some(name) = &profile.full_name {
            self.full_name = Some(name.clone());
        }
    }

    /// True when the count belongs to an earlier day than `today`.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.last_request_date.map_or(true, |date| date < today)
    }

    /// Count as of `today`: a stale record counts as zero.
    pub fn effective_count(&self, today: NaiveDate) -> u32 {
        if self.is_stale(today) {
            0
        } else {
            self.daily_count
        }
    }

    /// Zero the counter if the stored date precedes `today`.
    ///
    /// Returns `true` if a reset happened. Callers must run this inside the
    /// store's atomic read-modify-write.
    pub fn reset_if_before(&mut self, today: NaiveDate) -> bool {
        if !self.is_stale(today) {
            return false;
        }
        self.daily_count = 0;
        self.last_request_date = Some(today);
        true
    }
}

/// User statistics returned to the extension.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
pub struct UserStats {
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_pioneer: bool,
    pub daily_count: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_summary_date: Option<NaiveDate>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub registered_at: DateTime<Utc>,
}

impl UserStats {
    pub fn from_record(record: UserRecord, today: NaiveDate) -> Self {
        let daily_count = record.effective_count(today);
        Self {
            user_id: record.id,
            email: record.email,
            full_name: record.full_name,
            is_pioneer: record.is_pioneer,
            daily_count,
            last_summary_date: record.last_request_date,
            registered_at: record.registered_at,
        }
    }
}

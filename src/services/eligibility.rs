// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decides whether a user may make another summary request today.
//!
//! The daily reset is lazy: the first check of a new day performs it, so no
//! scheduled job is involved.

use crate::error::AppError;
use crate::models::UserProfile;
use crate::services::quota::QuotaLedger;
use crate::time_utils::Clock;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Default number of free summaries per day.
pub const DEFAULT_FREE_LIMIT: u32 = 7;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Allowed { remaining: u32 },
    /// Pioneer users: no limit, no usage recorded.
    Unlimited,
    Denied { message: String, limit: u32 },
}

impl Eligibility {
    pub fn can_proceed(&self) -> bool {
        !matches!(self, Eligibility::Denied { .. })
    }

    /// Remaining quota as reported to the extension.
    pub fn remaining(&self) -> RemainingQuota {
        match self {
            Eligibility::Allowed { remaining } => RemainingQuota::Count(*remaining),
            Eligibility::Unlimited => RemainingQuota::Unlimited,
            Eligibility::Denied { .. } => RemainingQuota::Count(0),
        }
    }
}

/// Serializes as a number, or the string `"Unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingQuota {
    Count(u32),
    Unlimited,
}

impl Serialize for RemainingQuota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RemainingQuota::Count(n) => serializer.serialize_u32(*n),
            RemainingQuota::Unlimited => serializer.serialize_str("Unlimited"),
        }
    }
}

pub fn limit_message(limit: u32) -> String {
    format!("Daily summary limit ({}) reached for today.", limit)
}

#[derive(Clone)]
pub struct EligibilityChecker {
    ledger: QuotaLedger,
    clock: Arc<dyn Clock>,
    free_limit: u32,
}

impl EligibilityChecker {
    pub fn new(ledger: QuotaLedger, clock: Arc<dyn Clock>, free_limit: u32) -> Self {
        Self {
            ledger,
            clock,
            free_limit,
        }
    }

    /// Check against the configured free limit.
    pub async fn check(&self, profile: &UserProfile) -> Result<Eligibility, AppError> {
        self.check_with_limit(profile, self.free_limit).await
    }

    /// Check against an explicit limit.
    ///
    /// Storage errors propagate; the caller must not treat them as allow or deny.
    pub async fn check_with_limit(
        &self,
        profile: &UserProfile,
        free_limit: u32,
    ) -> Result<Eligibility, AppError> {
        let mut record = self.ledger.get_or_create(profile).await?;

        if record.is_pioneer {
            return Ok(Eligibility::Unlimited);
        }

        let today = self.clock.today();
        if record.is_stale(today) {
            record = self.ledger.reset_if_new_day(&record.id, today).await?;
            tracing::debug!(user_id = %record.id, %today, "Checked after day rollover");
        }

        let remaining = free_limit.saturating_sub(record.daily_count);
        if remaining > 0 {
            Ok(Eligibility::Allowed { remaining })
        } else {
            tracing::info!(
                user_id = %record.id,
                daily_count = record.daily_count,
                limit = free_limit,
                "Daily limit reached"
            );
            Ok(Eligibility::Denied {
                message: limit_message(free_limit),
                limit: free_limit,
            })
        }
    }
}

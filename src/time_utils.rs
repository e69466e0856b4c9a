// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Quota bookkeeping compares calendar dates, never timestamps, so every
//! component asks an injected [`Clock`] for "today" instead of reading the
//! system time directly.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use std::sync::atomic::{AtomicI32, Ordering};

/// Source of the current time and calendar date.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in the service's reference timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock. "Today" is the server's local date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a calendar date that tests can move forward.
///
/// `now()` reports noon UTC on the pinned date.
#[derive(Debug)]
pub struct FixedClock {
    days_from_ce: AtomicI32,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            days_from_ce: AtomicI32::new(today.num_days_from_ce()),
        }
    }

    /// Move the pinned date forward (or backward, for negative values).
    pub fn advance_days(&self, days: i32) {
        self.days_from_ce.fetch_add(days, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
            .and_utc()
    }

    fn today(&self) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(self.days_from_ce.load(Ordering::SeqCst))
            .unwrap_or(NaiveDate::MIN)
    }
}

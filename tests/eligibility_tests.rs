// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Eligibility checker tests: free limit, pioneers and the lazy daily reset.

use std::sync::Arc;
use youtube_maestro::db::{InMemoryDb, UserStore};
use youtube_maestro::error::AppError;
use youtube_maestro::models::{UserProfile, UserRecord};
use youtube_maestro::services::eligibility::{limit_message, DEFAULT_FREE_LIMIT};
use youtube_maestro::services::{Eligibility, EligibilityChecker, QuotaLedger, RemainingQuota};
use youtube_maestro::time_utils::{Clock, FixedClock};

mod common;
use common::{test_clock, test_db_offline, test_today};

fn checker(db: Arc<InMemoryDb>, clock: Arc<FixedClock>) -> (EligibilityChecker, QuotaLedger) {
    let ledger = QuotaLedger::new(db, clock.clone());
    let checker = EligibilityChecker::new(ledger.clone(), clock, DEFAULT_FREE_LIMIT);
    (checker, ledger)
}

fn bob() -> UserProfile {
    UserProfile::new("user-bob", "bob@example.com")
}

fn seeded(daily_count: u32, last: chrono::NaiveDate, is_pioneer: bool) -> UserRecord {
    let clock = test_clock();
    let mut record = UserRecord::new(&bob(), last, clock.now());
    record.daily_count = daily_count;
    record.is_pioneer = is_pioneer;
    record
}

#[tokio::test]
async fn test_new_user_gets_full_allowance() {
    let (checker, _ledger) = checker(Arc::new(InMemoryDb::new()), test_clock());

    let eligibility = checker.check(&bob()).await.unwrap();

    assert_eq!(eligibility, Eligibility::Allowed { remaining: 7 });
    assert!(eligibility.can_proceed());
}

#[tokio::test]
async fn test_remaining_counts_down() {
    let (checker, ledger) = checker(Arc::new(InMemoryDb::new()), test_clock());
    checker.check(&bob()).await.unwrap();

    for _ in 0..3 {
        ledger.increment("user-bob").await.unwrap();
    }

    assert_eq!(
        checker.check(&bob()).await.unwrap(),
        Eligibility::Allowed { remaining: 4 }
    );
}

#[tokio::test]
async fn test_limit_reached_is_denied_with_message() {
    let db = Arc::new(InMemoryDb::new());
    db.put_user(seeded(7, test_today(), false));
    let (checker, _ledger) = checker(db, test_clock());

    let eligibility = checker.check(&bob()).await.unwrap();

    assert!(!eligibility.can_proceed());
    assert_eq!(eligibility.remaining(), RemainingQuota::Count(0));
    match eligibility {
        Eligibility::Denied { message, limit } => {
            assert_eq!(limit, 7);
            assert_eq!(message, limit_message(7));
            assert!(message.contains("(7)"));
        }
        other => panic!("expected denial, got {:?}", other),
    }
}

#[tokio::test]
async fn test_count_above_limit_still_denied() {
    let db = Arc::new(InMemoryDb::new());
    db.put_user(seeded(12, test_today(), false));
    let (checker, _ledger) = checker(db, test_clock());

    assert!(!checker.check(&bob()).await.unwrap().can_proceed());
}

#[tokio::test]
async fn test_new_day_resets_exhausted_user() {
    let db = Arc::new(InMemoryDb::new());
    let yesterday = test_today().pred_opt().unwrap();
    db.put_user(seeded(7, yesterday, false));
    let (checker, _ledger) = checker(db.clone(), test_clock());

    let eligibility = checker.check(&bob()).await.unwrap();

    assert_eq!(eligibility, Eligibility::Allowed { remaining: 7 });
    let stored = db.get_user("user-bob").await.unwrap().unwrap();
    assert_eq!(stored.daily_count, 0);
    assert_eq!(stored.last_request_date, Some(test_today()));
}

#[tokio::test]
async fn test_missing_date_is_treated_as_stale() {
    let db = Arc::new(InMemoryDb::new());
    let mut record = seeded(5, test_today(), false);
    record.last_request_date = None;
    db.put_user(record);
    let (checker, _ledger) = checker(db, test_clock());

    assert_eq!(
        checker.check(&bob()).await.unwrap(),
        Eligibility::Allowed { remaining: 7 }
    );
}

#[tokio::test]
async fn test_pioneer_is_unlimited_and_never_reset() {
    let db = Arc::new(InMemoryDb::new());
    let long_ago = test_today() - chrono::Duration::days(30);
    db.put_user(seeded(100, long_ago, true));
    let (checker, _ledger) = checker(db.clone(), test_clock());

    let eligibility = checker.check(&bob()).await.unwrap();

    assert_eq!(eligibility, Eligibility::Unlimited);
    assert_eq!(eligibility.remaining(), RemainingQuota::Unlimited);
    let stored = db.get_user("user-bob").await.unwrap().unwrap();
    assert_eq!(stored.daily_count, 100);
    assert_eq!(stored.last_request_date, Some(long_ago));
}

#[tokio::test]
async fn test_explicit_limit_overrides_default() {
    let (checker, ledger) = checker(Arc::new(InMemoryDb::new()), test_clock());
    checker.check(&bob()).await.unwrap();
    ledger.increment("user-bob").await.unwrap();

    assert_eq!(
        checker.check_with_limit(&bob(), 3).await.unwrap(),
        Eligibility::Allowed { remaining: 2 }
    );
    assert!(!checker.check_with_limit(&bob(), 1).await.unwrap().can_proceed());
}

#[tokio::test]
async fn test_check_does_not_consume_quota() {
    let db = Arc::new(InMemoryDb::new());
    let (checker, _ledger) = checker(db.clone(), test_clock());

    for _ in 0..10 {
        checker.check(&bob()).await.unwrap();
    }

    let stored = db.get_user("user-bob").await.unwrap().unwrap();
    assert_eq!(stored.daily_count, 0);
}

#[tokio::test]
async fn test_storage_failure_propagates() {
    let clock = test_clock();
    let ledger = QuotaLedger::new(Arc::new(test_db_offline()), clock.clone());
    let checker = EligibilityChecker::new(ledger, clock, DEFAULT_FREE_LIMIT);

    let err = checker.check(&bob()).await.unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
}

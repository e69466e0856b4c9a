// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fetch strategy selection and fallback tests.

use std::sync::Arc;
use youtube_maestro::services::fetch::{CursorOnSwitch, FetchError, Strategy, StrategyMode};
use youtube_maestro::services::FetchStrategySelector;

mod common;
use common::{ids, page, Reply, ScriptedSource};

const TOKEN: &str = "ya29.test-token";

fn selector(source: ScriptedSource) -> (FetchStrategySelector, Arc<ScriptedSource>) {
    let source = Arc::new(source);
    (FetchStrategySelector::new(source.clone()), source)
}

#[tokio::test]
async fn test_primary_success_uses_playlist() {
    let (selector, source) = selector(
        ScriptedSource::new().playlist(Reply::Page(page(&["a", "b"], Some("p2"), 10))),
    );

    let selected = selector.fetch_page(TOKEN, None).await.unwrap();

    assert_eq!(selected.strategy, Strategy::Playlist);
    assert!(!selected.switched);
    assert_eq!(ids(&selected.page.videos), ["a", "b"]);
    assert_eq!(selected.page.next_page_token.as_deref(), Some("p2"));
    assert!(source.rating_calls().is_empty());
}

#[tokio::test]
async fn test_every_fallback_error_switches_to_rating() {
    let triggers: [fn() -> FetchError; 6] = [
        || FetchError::ChannelAccessDenied,
        || FetchError::NoChannelFound,
        || FetchError::NoRelatedPlaylists,
        || FetchError::NoLikedPlaylist,
        || FetchError::PlaylistAccessDenied,
        || FetchError::PaginationFailed,
    ];

    for trigger in triggers {
        let (selector, source) = selector(
            ScriptedSource::new()
                .playlist(Reply::Fail(trigger))
                .rating(Reply::Page(page(&["r1"], None, 1))),
        );

        let selected = selector.fetch_page(TOKEN, None).await.unwrap();

        assert_eq!(selected.strategy, Strategy::Rating, "trigger {}", trigger());
        assert!(selected.switched);
        assert_eq!(source.rating_calls().len(), 1);
    }
}

#[tokio::test]
async fn test_channel_denied_returns_secondary_page_in_order() {
    let (selector, source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::ChannelAccessDenied))
            .rating(Reply::Page(page(&["r1", "r2", "r3"], Some("r-next"), 3))),
    );

    let selected = selector.fetch_page(TOKEN, None).await.unwrap();

    assert_eq!(selected.strategy, Strategy::Rating);
    assert!(selected.switched);
    assert_eq!(selected.page.videos.len(), 3);
    assert_eq!(ids(&selected.page.videos), ["r1", "r2", "r3"]);
    assert_eq!(selected.page.total_results, 3);
    assert_eq!(selected.page.next_page_token.as_deref(), Some("r-next"));
    assert_eq!(source.playlist_calls(), [None]);
}

#[tokio::test]
async fn test_fallback_resumes_with_same_cursor() {
    let (selector, source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::PaginationFailed))
            .rating(Reply::Page(page(&["x"], None, 1))),
    );

    selector.fetch_page(TOKEN, Some("CURSOR")).await.unwrap();

    assert_eq!(source.playlist_calls(), [Some("CURSOR".to_string())]);
    assert_eq!(source.rating_calls(), [Some("CURSOR".to_string())]);
}

#[tokio::test]
async fn test_restart_policy_drops_cursor_on_switch() {
    let (selector, source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::PaginationFailed))
            .rating(Reply::Page(page(&["x"], Some("r2"), 5))),
    );
    let mut mode = StrategyMode::default();

    let selected = selector
        .fetch_with(&mut mode, TOKEN, Some("p3"), CursorOnSwitch::Restart)
        .await
        .unwrap();

    assert!(selected.switched);
    assert_eq!(mode, StrategyMode::UsingSecondary);
    assert_eq!(source.rating_calls(), [None]);
}

#[tokio::test]
async fn test_secondary_mode_skips_primary() {
    let (selector, source) = selector(
        ScriptedSource::new()
            .rating(Reply::Page(page(&["a"], Some("r2"), 3)))
            .rating(Reply::Page(page(&["b"], None, 3))),
    );
    let mut mode = StrategyMode::UsingSecondary;

    let first = selector
        .fetch_with(&mut mode, TOKEN, None, CursorOnSwitch::Restart)
        .await
        .unwrap();
    let second = selector
        .fetch_with(&mut mode, TOKEN, Some("r2"), CursorOnSwitch::Restart)
        .await
        .unwrap();

    assert!(!first.switched && !second.switched);
    assert_eq!(second.strategy, Strategy::Rating);
    assert!(source.playlist_calls().is_empty());
    assert_eq!(source.rating_calls(), [None, Some("r2".to_string())]);
}

#[tokio::test]
async fn test_reauth_on_primary_never_falls_back() {
    let (selector, source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::NeedsReauthentication))
            .rating(Reply::Page(page(&["a"], None, 1))),
    );

    let err = selector.fetch_page(TOKEN, None).await.unwrap_err();

    assert!(matches!(err, FetchError::NeedsReauthentication));
    assert!(source.rating_calls().is_empty());
}

#[tokio::test]
async fn test_reauth_on_secondary_propagates() {
    let (selector, _source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::NoLikedPlaylist))
            .rating(Reply::Fail(|| FetchError::NeedsReauthentication)),
    );

    let err = selector.fetch_page(TOKEN, None).await.unwrap_err();

    assert!(matches!(err, FetchError::NeedsReauthentication));
}

#[tokio::test]
async fn test_non_fallback_error_propagates_unchanged() {
    let (selector, source) = selector(ScriptedSource::new().playlist(Reply::Fail(|| {
        FetchError::Api {
            status: 500,
            body: "backendError".into(),
        }
    })));

    let err = selector.fetch_page(TOKEN, None).await.unwrap_err();

    assert!(matches!(err, FetchError::Api { status: 500, .. }));
    assert!(source.rating_calls().is_empty());
}

#[tokio::test]
async fn test_both_failing_reports_both_messages() {
    let (selector, _source) = selector(
        ScriptedSource::new()
            .playlist(Reply::Fail(|| FetchError::PlaylistAccessDenied))
            .rating(Reply::Fail(|| FetchError::Api {
                status: 403,
                body: "forbidden".into(),
            })),
    );

    let err = selector.fetch_page(TOKEN, None).await.unwrap_err();

    match &err {
        FetchError::BothStrategiesFailed { primary, secondary } => {
            assert_eq!(primary, "PLAYLIST_ACCESS_DENIED");
            assert!(secondary.contains("HTTP 403"));
        }
        other => panic!("expected composite error, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("PLAYLIST_ACCESS_DENIED"));
    assert!(message.contains("forbidden"));
}

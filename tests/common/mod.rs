// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use youtube_maestro::config::Config;
use youtube_maestro::db::{FirestoreDb, InMemoryDb, LikedVideoStore, UserStore};
use youtube_maestro::models::video::watch_url;
use youtube_maestro::models::{FetchPage, Video, VideoId};
use youtube_maestro::routes::create_router;
use youtube_maestro::services::fetch::{FetchError, LikedVideoSource};
use youtube_maestro::services::gemini::{GenerationError, SummaryGenerator};
use youtube_maestro::services::transcript::{TranscriptError, TranscriptSource};
use youtube_maestro::time_utils::FixedClock;
use youtube_maestro::{AppState, Collaborators};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// 2024-03-10, a fixed "today" for quota tests.
#[allow(dead_code)]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

#[allow(dead_code)]
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(test_today()))
}

/// Unique user ID for test isolation.
#[allow(dead_code)]
pub fn unique_user_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[allow(dead_code)]
pub fn video(id: &str) -> Video {
    Video {
        id: id.to_string(),
        title: format!("Video {id}"),
        channel_title: "Test Channel".to_string(),
        channel_id: "UCtest".to_string(),
        published_at: "2023-06-01T00:00:00Z".to_string(),
        liked_at: "2024-01-01T00:00:00Z".to_string(),
        thumbnail_url: String::new(),
        view_count: 10,
        like_count: 1,
        duration: "PT3M".to_string(),
        url: watch_url(id),
    }
}

#[allow(dead_code)]
pub fn page(ids: &[&str], next: Option<&str>, total: u32) -> FetchPage {
    FetchPage {
        videos: ids.iter().map(|id| video(id)).collect(),
        next_page_token: next.map(str::to_string),
        total_results: total,
    }
}

#[allow(dead_code)]
pub fn ids(videos: &[Video]) -> Vec<&str> {
    videos.iter().map(|v| v.id.as_str()).collect()
}

// ─── Scripted YouTube source ─────────────────────────────────

/// Scripted answer for one strategy call.
#[allow(dead_code)]
pub enum Reply {
    Page(FetchPage),
    Fail(fn() -> FetchError),
}

/// Fake video source answering from per-strategy queues and recording calls.
///
/// An exhausted queue answers with an HTTP 500 API error.
#[derive(Default)]
pub struct ScriptedSource {
    playlist: Mutex<VecDeque<Reply>>,
    rating: Mutex<VecDeque<Reply>>,
    remove_error: Mutex<Option<fn() -> FetchError>>,
    pub playlist_calls: Mutex<Vec<Option<String>>>,
    pub rating_calls: Mutex<Vec<Option<String>>>,
    pub removed: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playlist(self, reply: Reply) -> Self {
        self.playlist.lock().unwrap().push_back(reply);
        self
    }

    pub fn rating(self, reply: Reply) -> Self {
        self.rating.lock().unwrap().push_back(reply);
        self
    }

    pub fn remove_fails_with(self, err: fn() -> FetchError) -> Self {
        *self.remove_error.lock().unwrap() = Some(err);
        self
    }

    pub fn playlist_calls(&self) -> Vec<Option<String>> {
        self.playlist_calls.lock().unwrap().clone()
    }

    pub fn rating_calls(&self) -> Vec<Option<String>> {
        self.rating_calls.lock().unwrap().clone()
    }

    fn answer(queue: &Mutex<VecDeque<Reply>>) -> Result<FetchPage, FetchError> {
        match queue.lock().unwrap().pop_front() {
            Some(Reply::Page(page)) => Ok(page),
            Some(Reply::Fail(make)) => Err(make()),
            None => Err(FetchError::Api {
                status: 500,
                body: "unscripted call".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LikedVideoSource for ScriptedSource {
    async fn fetch_via_playlist(
        &self,
        _access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError> {
        self.playlist_calls
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        Self::answer(&self.playlist)
    }

    async fn fetch_via_rating(
        &self,
        _access_token: &str,
        page_token: Option<&str>,
    ) -> Result<FetchPage, FetchError> {
        self.rating_calls
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        Self::answer(&self.rating)
    }

    async fn remove_like(&self, _access_token: &str, video_id: &str) -> Result<(), FetchError> {
        if let Some(make) = *self.remove_error.lock().unwrap() {
            return Err(make());
        }
        self.removed.lock().unwrap().push(video_id.to_string());
        Ok(())
    }
}

// ─── Transcript and generation fakes ─────────────────────────

/// Transcript source returning a fixed text or a fixed error.
pub struct StubTranscripts {
    text: Option<String>,
    error: Option<fn() -> TranscriptError>,
    pub calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl StubTranscripts {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> TranscriptError) -> Self {
        Self {
            text: None,
            error: Some(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranscriptSource for StubTranscripts {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> Result<String, TranscriptError> {
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), language.to_string()));
        match (&self.text, self.error) {
            (_, Some(make)) => Err(make()),
            (Some(text), None) => Ok(text.clone()),
            (None, None) => Err(TranscriptError::EmptyTranscript),
        }
    }
}

/// Generator that records prompts and answers with a fixed summary.
pub struct RecordingGenerator {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingGenerator {
    pub fn returning(summary: impl Into<String>) -> Self {
        Self {
            reply: Some(summary.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an upstream 503.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SummaryGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(GenerationError::Api {
            status: 503,
            body: "overloaded".to_string(),
        })
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

// ─── App assembly ────────────────────────────────────────────

/// Everything a test may want to poke at after building the app.
#[allow(dead_code)]
pub struct TestApp<S> {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<S>,
    pub clock: Arc<FixedClock>,
    pub source: Arc<ScriptedSource>,
    pub transcripts: Arc<StubTranscripts>,
    pub generator: Arc<RecordingGenerator>,
}

/// Build an app over `store` with the given fakes.
#[allow(dead_code)]
pub fn build_app<S>(
    store: Arc<S>,
    source: ScriptedSource,
    transcripts: StubTranscripts,
    generator: RecordingGenerator,
) -> TestApp<S>
where
    S: UserStore + LikedVideoStore + 'static,
{
    let clock = test_clock();
    let source = Arc::new(source);
    let transcripts = Arc::new(transcripts);
    let generator = Arc::new(generator);

    let state = Arc::new(AppState::new(
        Config::test_default(),
        Collaborators {
            store: store.clone(),
            clock: clock.clone(),
            video_source: source.clone(),
            transcripts: transcripts.clone(),
            generator: generator.clone(),
        },
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        clock,
        source,
        transcripts,
        generator,
    }
}

/// Create a test app on the in-memory store with a transcript and summary
/// that always succeed.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp<InMemoryDb> {
    build_app(
        Arc::new(InMemoryDb::new()),
        ScriptedSource::new(),
        StubTranscripts::returning("a short transcript"),
        RecordingGenerator::returning("🎯 **Summary**\n- point"),
    )
}

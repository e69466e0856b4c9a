// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube Maestro API Server
//!
//! Backend for the browser extension: summary quota, transcript summaries
//! and liked-video listing/export.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use youtube_maestro::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, InMemoryDb},
    services::{GeminiClient, PythonTranscriptFetcher, YouTubeClient},
    time_utils::{Clock, SystemClock},
    AppState, Collaborators,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage_backend,
        free_daily_limit = config.free_daily_limit,
        "Starting YouTube Maestro API"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let video_source = Arc::new(YouTubeClient::new(
        config.youtube_api_base.clone(),
        config.collaborator_timeout,
    )?);

    let transcripts = Arc::new(PythonTranscriptFetcher::new(
        config.transcript_python.clone(),
        config.transcript_script.clone(),
        config.collaborator_timeout,
    ));
    tracing::info!(
        python = %config.transcript_python.display(),
        script = %config.transcript_script.display(),
        "Transcript helper configured"
    );

    let generator = Arc::new(GeminiClient::new(
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        config.google_ai_api_key.clone(),
        config.collaborator_timeout,
    )?);
    tracing::info!(model = %config.gemini_model, "Gemini client initialized");

    // Build shared state on the selected storage backend
    let state = match config.storage_backend {
        StorageBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            AppState::new(
                config.clone(),
                Collaborators {
                    store: Arc::new(db),
                    clock,
                    video_source,
                    transcripts,
                    generator,
                },
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::new(
                config.clone(),
                Collaborators {
                    store: Arc::new(InMemoryDb::new()),
                    clock,
                    video_source,
                    transcripts,
                    generator,
                },
            )
        }
    };

    // Build router
    let app = youtube_maestro::routes::create_router(Arc::new(state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("youtube_maestro=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

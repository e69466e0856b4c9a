// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup; a `.env` file is honoured for local development.

use crate::services::eligibility::DEFAULT_FREE_LIMIT;
use crate::services::{gemini, youtube};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interpreter inside the helper's virtualenv, used outside production.
const LOCAL_VENV_PYTHON: &str = "scripts/transcript-env/bin/python3";

/// Where user records and the liked-video cache live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    /// Process memory; lost on restart
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID
    pub gcp_project_id: String,
    pub storage_backend: StorageBackend,

    // --- Summaries ---
    /// Gemini API key; summaries fail with a service error when absent
    pub google_ai_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    /// Free summaries per user per day
    pub free_daily_limit: u32,
    pub transcript_python: PathBuf,
    pub transcript_script: PathBuf,

    // --- Liked videos ---
    pub youtube_api_base: String,
    /// Page cap for the full export; `None` drains until the cursor runs out
    pub max_export_pages: Option<usize>,

    /// Upper bound on each call to YouTube, Gemini or the transcript helper
    pub collaborator_timeout: Duration,
    /// Extra allowed CORS origin (e.g. `chrome-extension://<id>`)
    pub extension_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
            Err(_) | Ok("firestore") => StorageBackend::Firestore,
            Ok("memory") => StorageBackend::Memory,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let is_production = env::var("APP_ENV").is_ok_and(|v| v == "production");

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            storage_backend,

            google_ai_api_key: env::var("GOOGLE_AI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| gemini::DEFAULT_MODEL.to_string()),
            gemini_api_base: env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| gemini::DEFAULT_API_BASE.to_string()),
            free_daily_limit: parse_or("FREE_DAILY_LIMIT", DEFAULT_FREE_LIMIT)?,
            transcript_python: env::var("TRANSCRIPT_PYTHON")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_python(is_production, Path::new(LOCAL_VENV_PYTHON))),
            transcript_script: env::var("TRANSCRIPT_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("scripts/script.py")),

            youtube_api_base: env::var("YOUTUBE_API_BASE")
                .unwrap_or_else(|_| youtube::DEFAULT_API_BASE.to_string()),
            max_export_pages: match env::var("MAX_EXPORT_PAGES") {
                Ok(_) => Some(parse_or::<usize>("MAX_EXPORT_PAGES", 0)?)
                    .filter(|&pages| pages > 0),
                Err(_) => None,
            },

            collaborator_timeout: Duration::from_secs(parse_or("COLLABORATOR_TIMEOUT_SECS", 45)?),
            extension_origin: env::var("EXTENSION_ORIGIN").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            storage_backend: StorageBackend::Memory,
            google_ai_api_key: Some("test-api-key".to_string()),
            gemini_model: gemini::DEFAULT_MODEL.to_string(),
            gemini_api_base: "http://127.0.0.1:9".to_string(),
            free_daily_limit: DEFAULT_FREE_LIMIT,
            transcript_python: PathBuf::from("python3"),
            transcript_script: PathBuf::from("scripts/script.py"),
            youtube_api_base: "http://127.0.0.1:9".to_string(),
            max_export_pages: None,
            collaborator_timeout: Duration::from_secs(5),
            extension_origin: Some("chrome-extension://testextensionid".to_string()),
        }
    }
}

/// System `python3` in production; otherwise the local venv if it exists.
fn default_python(is_production: bool, venv: &Path) -> PathBuf {
    if !is_production && venv.exists() {
        venv.to_path_buf()
    } else {
        PathBuf::from("python3")
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

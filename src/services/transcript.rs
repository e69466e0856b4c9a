// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transcript extraction via an external Python helper.
//!
//! The helper is invoked as `<python> <script> <video_id> <lang>`. It prints
//! the transcript on stdout and diagnostics on stderr; a nonzero exit status
//! means failure, and specific stderr substrings identify the cause.

use crate::models::VideoId;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Transcript collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// The interpreter runs but the transcript library is not installed.
    #[error(
        "Python environment setup error: Missing `youtube_transcript_api` module. \
         Please ensure Python dependencies are installed. ({0})"
    )]
    DependencyMissing(String),

    #[error(
        "Failed to fetch transcript: Invalid video URL or transcript not available \
         for this video (e.g., private video, no captions)."
    )]
    ContentUnavailable(String),

    #[error("Failed to start transcript service. Ensure Python and dependencies are installed. ({0})")]
    ProcessStart(String),

    #[error("Failed to fetch transcript from YouTube (exit code {code:?}).")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Failed to fetch transcript: timed out after {0:?}.")]
    Timeout(Duration),

    #[error("No transcript found for this video or transcript fetching failed silently.")]
    EmptyTranscript,
}

/// Source of transcript text for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript in `language` (two-letter code).
    ///
    /// Never returns an empty string; that is [`TranscriptError::EmptyTranscript`].
    async fn fetch(&self, video_id: &VideoId, language: &str) -> Result<String, TranscriptError>;
}

/// Map a failed run to an error kind from its stderr.
pub fn classify_failure(code: Option<i32>, stderr: &str) -> TranscriptError {
    if stderr.contains("ModuleNotFoundError") {
        return TranscriptError::DependencyMissing(last_line(stderr));
    }
    if stderr.contains("You provided an invalid video id")
        || stderr.contains("Could not retrieve a transcript")
    {
        return TranscriptError::ContentUnavailable(last_line(stderr));
    }
    TranscriptError::NonZeroExit {
        code,
        stderr: stderr.to_string(),
    }
}

fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Runs the transcript helper script as a subprocess.
#[derive(Debug, Clone)]
pub struct PythonTranscriptFetcher {
    python: PathBuf,
    script: PathBuf,
    timeout: Duration,
}

impl PythonTranscriptFetcher {
    pub fn new(python: impl Into<PathBuf>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TranscriptSource for PythonTranscriptFetcher {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> Result<String, TranscriptError> {
        tracing::debug!(
            python = %self.python.display(),
            video_id = %video_id,
            language,
            "Starting transcript helper"
        );

        let child = Command::new(&self.python)
            .arg(&self.script)
            .arg(video_id.as_str())
            .arg(language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranscriptError::ProcessStart(e.to_string()))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TranscriptError::Timeout(self.timeout))?
            .map_err(|e| TranscriptError::ProcessStart(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            tracing::warn!(
                video_id = %video_id,
                code = ?output.status.code(),
                stderr = %stderr,
                "Transcript helper failed"
            );
            return Err(classify_failure(output.status.code(), &stderr));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(TranscriptError::EmptyTranscript);
        }

        tracing::info!(
            video_id = %video_id,
            chars = transcript.chars().count(),
            "Transcript fetched"
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_missing_module() {
        let stderr = "Traceback (most recent call last):\n  File \"script.py\", line 3\n\
                      ModuleNotFoundError: No module named 'youtube_transcript_api'\n";
        match classify_failure(Some(1), stderr) {
            TranscriptError::DependencyMissing(detail) => {
                assert!(detail.contains("youtube_transcript_api"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_unavailable_and_generic() {
        let stderr = "Error: Could not retrieve a transcript for video ID abc. Reason: ...";
        assert!(matches!(
            classify_failure(Some(1), stderr),
            TranscriptError::ContentUnavailable(_)
        ));

        assert!(matches!(
            classify_failure(Some(2), "something else broke"),
            TranscriptError::NonZeroExit { code: Some(2), .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_process_start_error() {
        let fetcher = PythonTranscriptFetcher::new(
            "/nonexistent/python-for-tests",
            "script.py",
            Duration::from_secs(5),
        );
        let id = VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap();

        let err = fetcher.fetch(&id, "en").await.unwrap_err();
        assert!(matches!(err, TranscriptError::ProcessStart(_)));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summarization pipeline.
//!
//! Steps run in order and each one gates the next:
//! 1. Eligibility check
//! 2. Video URL parsing
//! 3. Transcript fetch
//! 4. Truncation to [`MAX_TRANSCRIPT_CHARS`]
//! 5. Generation, then usage recording
//!
//! Usage is recorded only after generation succeeds.

use crate::error::AppError;
use crate::models::{UserProfile, VideoId};
use crate::services::eligibility::{Eligibility, EligibilityChecker};
use crate::services::gemini::{compose_prompt, SummaryGenerator};
use crate::services::quota::QuotaLedger;
use crate::services::transcript::{TranscriptError, TranscriptSource};
use std::sync::Arc;

/// Longest transcript passed to the generator, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 15_000;

pub const DEFAULT_LANGUAGE: &str = "English";

/// A summary request from the extension.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub video_url: String,
    pub profile: UserProfile,
    /// Language name, e.g. "English"
    pub language: String,
}

/// Two-letter transcript language code for a language name.
pub fn language_code(language: &str) -> &'static str {
    match language {
        "Arabic" => "ar",
        "Turkish" => "tr",
        _ => "en",
    }
}

/// Cut `text` to at most `max_chars` characters.
///
/// Returns the original length in characters when truncation happened.
pub fn truncate_transcript(text: &mut String, max_chars: usize) -> Option<usize> {
    let (cut_at, _) = text.char_indices().nth(max_chars)?;
    let original = text.chars().count();
    text.truncate(cut_at);
    Some(original)
}

#[derive(Clone)]
pub struct SummaryCoordinator {
    eligibility: EligibilityChecker,
    ledger: QuotaLedger,
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<dyn SummaryGenerator>,
}

impl SummaryCoordinator {
    pub fn new(
        eligibility: EligibilityChecker,
        ledger: QuotaLedger,
        transcripts: Arc<dyn TranscriptSource>,
        generator: Arc<dyn SummaryGenerator>,
    ) -> Self {
        Self {
            eligibility,
            ledger,
            transcripts,
            generator,
        }
    }

    pub fn generator(&self) -> &Arc<dyn SummaryGenerator> {
        &self.generator
    }

    /// Run the pipeline and return the generated summary.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, AppError> {
        let user_id = request.profile.user_id.as_str();

        let eligibility = self.eligibility.check(&request.profile).await?;
        if let Eligibility::Denied { message, limit } = &eligibility {
            tracing::warn!(user_id, limit, "Summary refused: daily limit reached");
            return Err(AppError::QuotaExceeded {
                message: message.clone(),
                limit: *limit,
            });
        }

        let video_id = VideoId::from_url(&request.video_url).ok_or_else(|| {
            tracing::warn!(user_id, url = %request.video_url, "Invalid YouTube URL");
            AppError::InvalidVideoUrl
        })?;

        let lang = language_code(&request.language);
        let mut transcript = self.transcripts.fetch(&video_id, lang).await?;
        if transcript.is_empty() {
            return Err(TranscriptError::EmptyTranscript.into());
        }

        if let Some(original) = truncate_transcript(&mut transcript, MAX_TRANSCRIPT_CHARS) {
            tracing::warn!(
                video_id = %video_id,
                original_chars = original,
                max_chars = MAX_TRANSCRIPT_CHARS,
                "Transcript too long, truncated"
            );
        }

        let prompt = compose_prompt(&transcript, &request.language);
        let summary = self.generator.generate(&prompt).await?;

        if eligibility != Eligibility::Unlimited {
            self.ledger.increment(user_id).await?;
        }

        tracing::info!(
            user_id,
            video_id = %video_id,
            model = self.generator.model(),
            "Summary generated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(language_code("English"), "en");
        assert_eq!(language_code("Arabic"), "ar");
        assert_eq!(language_code("Turkish"), "tr");
        assert_eq!(language_code("Klingon"), "en");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let mut text = "█".repeat(10);
        assert_eq!(truncate_transcript(&mut text, 4), Some(10));
        assert_eq!(text.chars().count(), 4);

        let mut short = "abc".to_string();
        assert_eq!(truncate_transcript(&mut short, 3), None);
        assert_eq!(short, "abc");
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod eligibility;
pub mod fetch;
pub mod gemini;
pub mod pagination;
pub mod quota;
pub mod summary;
pub mod transcript;
pub mod youtube;

pub use eligibility::{Eligibility, EligibilityChecker, RemainingQuota};
pub use fetch::{FetchError, FetchStrategySelector, LikedVideoSource, Strategy, StrategyMode};
pub use gemini::{GeminiClient, GenerationError, SummaryGenerator};
pub use pagination::{DrainOutcome, PaginationAccumulator};
pub use quota::QuotaLedger;
pub use summary::{SummaryCoordinator, SummaryRequest};
pub use transcript::{PythonTranscriptFetcher, TranscriptError, TranscriptSource};
pub use youtube::YouTubeClient;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (quota records, updated inside transactions)
//! - Liked videos (accumulated "load more" results)

use crate::db::{collections, user_doc_id, LikedVideoStore, UserStore};
use crate::error::AppError;
use crate::models::{CacheAppend, FetchPage, LikedVideoCache, UserProfile, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Run a read-modify-write on one user document inside a transaction.
    ///
    /// `modify` sees the record read within the transaction, so conflicting
    /// writers make Firestore retry with fresh data. Returns `NotFound` when
    /// the document does not exist (nothing is written in that case).
    async fn update_user_atomic<F>(&self, user_id: &str, modify: F) -> Result<UserRecord, AppError>
    where
        F: Fn(&mut UserRecord) + Send + Sync + Clone + 'static,
    {
        let doc_id = user_doc_id(user_id);

        let updated = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.clone();
                let modify = modify.clone();
                Box::pin(async move {
                    let current: Option<UserRecord> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    let Some(mut record) = current else {
                        return Ok(None);
                    };

                    modify(&mut record);

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&doc_id)
                        .object(&record)
                        .add_to_transaction(transaction)?;

                    Ok(Some(record))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User transaction failed: {}", e)))?;

        updated.ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl UserStore for FirestoreDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_doc_id(user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_user(
        &self,
        profile: &UserProfile,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let doc_id = user_doc_id(&profile.user_id);
        let profile = profile.clone();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.clone();
                let profile = profile.clone();
                Box::pin(async move {
                    let existing: Option<UserRecord> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    let record = match existing {
                        Some(mut record) => {
                            record.apply_profile(&profile);
                            record
                        }
                        None => UserRecord::new(&profile, today, now),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&doc_id)
                        .object(&record)
                        .add_to_transaction(transaction)?;

                    Ok(record)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User upsert failed: {}", e)))
    }

    async fn increment_daily_count(&self, user_id: &str) -> Result<u32, AppError> {
        let record = self
            .update_user_atomic(user_id, |record| {
                record.daily_count = record.daily_count.saturating_add(1);
            })
            .await?;
        Ok(record.daily_count)
    }

    async fn reset_daily_count_if_stale(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<UserRecord, AppError> {
        self.update_user_atomic(user_id, move |record| {
            if record.reset_if_before(today) {
                tracing::debug!(user_id = %record.id, %today, "Daily count reset");
            }
        })
        .await
    }

    async fn set_pioneer(&self, user_id: &str, is_pioneer: bool) -> Result<UserRecord, AppError> {
        self.update_user_atomic(user_id, move |record| {
            record.is_pioneer = is_pioneer;
        })
        .await
    }
}

// ─── Liked Video Cache Operations ───────────────────────────

#[async_trait]
impl LikedVideoStore for FirestoreDb {
    async fn get_liked_videos(&self, user_id: &str) -> Result<Option<LikedVideoCache>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::LIKED_VIDEOS)
            .obj()
            .one(&user_doc_id(user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_liked_videos(
        &self,
        user_id: &str,
        cache: &LikedVideoCache,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LIKED_VIDEOS)
            .document_id(user_doc_id(user_id))
            .object(cache)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn append_liked_videos(
        &self,
        user_id: &str,
        page: &FetchPage,
        now: DateTime<Utc>,
    ) -> Result<CacheAppend, AppError> {
        let doc_id = user_doc_id(user_id);
        let page = page.clone();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.clone();
                let page = page.clone();
                Box::pin(async move {
                    let mut cache: LikedVideoCache = db
                        .fluent()
                        .select()
                        .by_id_in(collections::LIKED_VIDEOS)
                        .obj()
                        .one(&doc_id)
                        .await?
                        .unwrap_or_default();

                    let outcome = cache.append_page(&page, now);

                    db.fluent()
                        .update()
                        .in_col(collections::LIKED_VIDEOS)
                        .document_id(&doc_id)
                        .object(&cache)
                        .add_to_transaction(transaction)?;

                    Ok(outcome)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Liked video append failed: {}", e)))
    }
}

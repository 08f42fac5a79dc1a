//! SQLite fitting history repository.
//!
//! Implements `FittingResultRepository` from `codipop-core`. Subscribers get a
//! per-user `watch` channel that is refreshed from the database after every
//! write made through this repository, and on demand via [`refresh`].
//!
//! [`refresh`]: SqliteFittingResultRepository::refresh

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use codipop_core::repository::fitting_result::FittingResultRepository;
use codipop_types::error::RepositoryError;
use codipop_types::fitting::{FittingResult, FittingResultId};
use codipop_types::session::UserSession;
use sqlx::Row;
use tokio::sync::watch;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

type Senders = HashMap<String, Arc<watch::Sender<Vec<FittingResult>>>>;

/// SQLite-backed implementation of `FittingResultRepository`.
#[derive(Clone)]
pub struct SqliteFittingResultRepository {
    pool: DatabasePool,
    senders: Arc<Mutex<Senders>>,
}

impl SqliteFittingResultRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            senders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn sender_for(&self, user_id: &str) -> Option<Arc<watch::Sender<Vec<FittingResult>>>> {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.retain(|_, sender| sender.receiver_count() > 0);
        senders.get(user_id).cloned()
    }

    /// Re-read the user's list and notify subscribers if it differs from the
    /// last published one. Picks up writes made by other processes.
    pub async fn refresh(&self, session: &UserSession) {
        let Some(sender) = self.sender_for(&session.user_id) else {
            return;
        };

        match self.list(session).await {
            Ok(list) => {
                sender.send_if_modified(|current| {
                    if *current == list {
                        return false;
                    }
                    *current = list;
                    true
                });
            }
            Err(e) => tracing::warn!(user = %session.user_id, "failed to refresh history subscribers: {e}"),
        }
    }
}

struct FittingResultRow {
    id: String,
    image_url: String,
    is_liked: bool,
    created_at: String,
}

impl FittingResultRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            image_url: row.try_get("image_url")?,
            is_liked: row.try_get("is_liked")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_result(self) -> Result<FittingResult, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid result id: {e}")))?;

        Ok(FittingResult {
            id: FittingResultId::from_uuid(id),
            image_url: self.image_url,
            created_at: parse_datetime(&self.created_at)?,
            is_liked: self.is_liked,
        })
    }
}

impl FittingResultRepository for SqliteFittingResultRepository {
    async fn append(
        &self,
        session: &UserSession,
        image_url: &str,
    ) -> Result<FittingResult, RepositoryError> {
        let result = FittingResult {
            id: FittingResultId::new(),
            image_url: image_url.to_string(),
            created_at: Utc::now(),
            is_liked: false,
        };

        sqlx::query(
            "INSERT INTO fitting_results (id, user_id, image_url, is_liked, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(result.id.to_string())
        .bind(&session.user_id)
        .bind(&result.image_url)
        .bind(result.is_liked)
        .bind(format_datetime(&result.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        self.refresh(session).await;
        Ok(result)
    }

    async fn get(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> Result<Option<FittingResult>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM fitting_results WHERE user_id = ? AND id = ?")
            .bind(&session.user_id)
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let row = FittingResultRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(row.into_result()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, session: &UserSession) -> Result<Vec<FittingResult>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM fitting_results WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(&session.user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                FittingResultRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_result()
            })
            .collect()
    }

    async fn set_liked(
        &self,
        session: &UserSession,
        id: &FittingResultId,
        liked: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE fitting_results SET is_liked = ? WHERE user_id = ? AND id = ?")
            .bind(liked)
            .bind(&session.user_id)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.refresh(session).await;
        Ok(())
    }

    async fn delete(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM fitting_results WHERE user_id = ? AND id = ?")
            .bind(&session.user_id)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.refresh(session).await;
        Ok(())
    }

    async fn subscribe(
        &self,
        session: &UserSession,
    ) -> Result<watch::Receiver<Vec<FittingResult>>, RepositoryError> {
        let current = self.list(session).await?;

        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        let sender = senders
            .entry(session.user_id.clone())
            .or_insert_with(|| Arc::new(watch::channel(Vec::new()).0));
        sender.send_replace(current);
        Ok(sender.subscribe())
    }
}

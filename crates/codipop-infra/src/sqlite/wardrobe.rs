//! SQLite wardrobe repository.

use chrono::Utc;
use codipop_core::repository::wardrobe::WardrobeRepository;
use codipop_types::error::RepositoryError;
use codipop_types::garment::{GarmentCategory, GarmentRef};
use codipop_types::session::UserSession;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `WardrobeRepository`.
#[derive(Clone)]
pub struct SqliteWardrobeRepository {
    pool: DatabasePool,
}

impl SqliteWardrobeRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct WardrobeRow {
    id: String,
    image_url: String,
    category: Option<String>,
    created_at: String,
}

impl WardrobeRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            image_url: row.try_get("image_url")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_garment(self) -> Result<GarmentRef, RepositoryError> {
        // Unknown tags are kept as uncategorised rather than failing the listing.
        let category = self.category.as_deref().and_then(|c| {
            c.parse::<GarmentCategory>()
                .map_err(|e| tracing::debug!(garment_id = %self.id, "{e}"))
                .ok()
        });

        Ok(GarmentRef {
            created_at: parse_datetime(&self.created_at)?,
            id: self.id,
            image_url: self.image_url,
            category,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<GarmentRef>, RepositoryError> {
    rows.iter()
        .map(|row| {
            WardrobeRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_garment()
        })
        .collect()
}

impl WardrobeRepository for SqliteWardrobeRepository {
    async fn add(
        &self,
        session: &UserSession,
        image_url: &str,
        category: Option<GarmentCategory>,
    ) -> Result<GarmentRef, RepositoryError> {
        let garment = GarmentRef {
            id: Uuid::now_v7().to_string(),
            image_url: image_url.to_string(),
            category,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO wardrobe_items (id, user_id, image_url, category, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&garment.id)
        .bind(&session.user_id)
        .bind(&garment.image_url)
        .bind(garment.category.map(|c| c.to_string()))
        .bind(format_datetime(&garment.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(garment)
    }

    async fn list(&self, session: &UserSession) -> Result<Vec<GarmentRef>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM wardrobe_items WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(&session.user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn get_many(
        &self,
        session: &UserSession,
        ids: &[String],
    ) -> Result<Vec<GarmentRef>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM wardrobe_items WHERE user_id = ? AND id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(&session.user_id);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let found = map_rows(&rows)?;

        // Restore the caller's order; ids that no longer exist are skipped.
        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|g| g.id == *id).cloned())
            .collect())
    }

    async fn delete(&self, session: &UserSession, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wardrobe_items WHERE user_id = ? AND id = ?")
            .bind(&session.user_id)
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

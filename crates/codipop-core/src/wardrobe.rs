//! Wardrobe service: saving, listing, pruning, and recommending garments.

use std::collections::BTreeMap;

use codipop_types::error::{RepositoryError, WardrobeError};
use codipop_types::garment::{CategoryFilter, GarmentCategory, GarmentRef};
use codipop_types::session::UserSession;
use serde::Serialize;
use tracing::{info, warn};

use crate::repository::wardrobe::WardrobeRepository;
use crate::storage::blob_store::BlobStore;

/// Number of items returned with a recommendation.
const RECOMMENDED_ITEMS: usize = 3;

/// Suggestion built from the category the user saves most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub category: GarmentCategory,
    /// Newest garments of `category`, at most three.
    pub items: Vec<GarmentRef>,
    pub total_items: usize,
    pub category_counts: BTreeMap<GarmentCategory, usize>,
}

/// Per-user wardrobe operations.
///
/// Generic over the wardrobe repository and the blob store holding the images.
pub struct WardrobeService<W: WardrobeRepository, B: BlobStore> {
    repo: W,
    blobs: B,
}

impl<W: WardrobeRepository, B: BlobStore> WardrobeService<W, B> {
    pub fn new(repo: W, blobs: B) -> Self {
        Self { repo, blobs }
    }

    /// Upload an image to durable storage and record it in the wardrobe.
    pub async fn save_garment(
        &self,
        session: &UserSession,
        filename: &str,
        data: &[u8],
        category: Option<GarmentCategory>,
    ) -> Result<GarmentRef, WardrobeError> {
        if data.is_empty() {
            return Err(WardrobeError::InvalidImage(format!("'{filename}' is empty")));
        }

        let name = base_name(filename)
            .ok_or_else(|| WardrobeError::InvalidImage(format!("invalid file name '{filename}'")))?;

        let url = self
            .blobs
            .upload(session, name, data)
            .await
            .map_err(|e| WardrobeError::Upload(e.to_string()))?;

        let garment = self
            .repo
            .add(session, &url, category)
            .await
            .map_err(storage_error)?;

        info!(garment_id = %garment.id, bytes = data.len(), "saved garment");
        Ok(garment)
    }

    /// Garments passing `filter`, newest first.
    pub async fn list(
        &self,
        session: &UserSession,
        filter: CategoryFilter,
    ) -> Result<Vec<GarmentRef>, WardrobeError> {
        let all = self.repo.list(session).await.map_err(storage_error)?;
        Ok(all.into_iter().filter(|g| filter.matches(g)).collect())
    }

    pub async fn delete(&self, session: &UserSession, id: &str) -> Result<(), WardrobeError> {
        self.repo.delete(session, id).await.map_err(|e| match e {
            RepositoryError::NotFound => WardrobeError::NotFound,
            other => storage_error(other),
        })?;
        info!(garment_id = %id, "deleted garment");
        Ok(())
    }

    /// Delete garments whose image points at a non-durable location.
    ///
    /// Returns how many were removed. Individual failures are logged and skipped.
    pub async fn cleanup_invalid(&self, session: &UserSession) -> Result<usize, WardrobeError> {
        let all = self.repo.list(session).await.map_err(storage_error)?;

        let mut removed = 0;
        for garment in all.iter().filter(|g| is_transient_url(&g.image_url)) {
            match self.repo.delete(session, &garment.id).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(garment_id = %garment.id, "failed to remove stale garment: {e}"),
            }
        }

        if removed > 0 {
            info!(removed, "removed garments with non-durable image paths");
        }
        Ok(removed)
    }

    /// Recommend the most common category. `None` if no garment is categorised.
    ///
    /// Ties go to the category listed first in [`GarmentCategory::ALL`].
    pub async fn recommend(
        &self,
        session: &UserSession,
    ) -> Result<Option<Recommendation>, WardrobeError> {
        let all = self.repo.list(session).await.map_err(storage_error)?;

        let mut category_counts: BTreeMap<GarmentCategory, usize> = BTreeMap::new();
        for category in all.iter().filter_map(|g| g.category) {
            *category_counts.entry(category).or_default() += 1;
        }

        let best = GarmentCategory::ALL
            .iter()
            .filter_map(|c| category_counts.get(c).map(|n| (*c, *n)))
            .fold(None::<(GarmentCategory, usize)>, |best, (c, n)| match best {
                Some((_, top)) if top >= n => best,
                _ => Some((c, n)),
            });

        let Some((category, _)) = best else {
            return Ok(None);
        };

        let items = all
            .iter()
            .filter(|g| g.category == Some(category))
            .take(RECOMMENDED_ITEMS)
            .cloned()
            .collect();

        Ok(Some(Recommendation {
            category,
            items,
            total_items: all.len(),
            category_counts,
        }))
    }
}

/// Picker temp files and `file://` URIs do not survive app restarts.
fn is_transient_url(url: &str) -> bool {
    url.starts_with("file://") || url.contains("/cache/")
}

fn base_name(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
}

fn storage_error(e: RepositoryError) -> WardrobeError {
    WardrobeError::StorageError(e.to_string())
}

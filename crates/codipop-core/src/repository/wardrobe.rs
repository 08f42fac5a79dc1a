//! Wardrobe repository trait definition.

use codipop_types::error::RepositoryError;
use codipop_types::garment::{GarmentCategory, GarmentRef};
use codipop_types::session::UserSession;

/// Repository trait for the per-user wardrobe collection.
pub trait WardrobeRepository: Send + Sync {
    /// Record a garment image. Returns the created garment.
    fn add(
        &self,
        session: &UserSession,
        image_url: &str,
        category: Option<GarmentCategory>,
    ) -> impl std::future::Future<Output = Result<GarmentRef, RepositoryError>> + Send;

    /// List all garments, newest first.
    fn list(
        &self,
        session: &UserSession,
    ) -> impl std::future::Future<Output = Result<Vec<GarmentRef>, RepositoryError>> + Send;

    /// Fetch the given ids in the order requested. Missing ids are skipped.
    fn get_many(
        &self,
        session: &UserSession,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<GarmentRef>, RepositoryError>> + Send;

    /// Permanently delete a garment. Returns `NotFound` if it does not exist.
    fn delete(
        &self,
        session: &UserSession,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

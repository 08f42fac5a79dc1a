//! Fitting result repository trait definition.

use codipop_types::error::RepositoryError;
use codipop_types::fitting::{FittingResult, FittingResultId};
use codipop_types::session::UserSession;
use tokio::sync::watch;

/// Repository trait for the per-user fitting history collection.
///
/// Implementations live in codipop-infra (e.g., SqliteFittingResultRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait FittingResultRepository: Send + Sync {
    /// Append a new result stamped with the store's own clock. Returns the record.
    fn append(
        &self,
        session: &UserSession,
        image_url: &str,
    ) -> impl std::future::Future<Output = Result<FittingResult, RepositoryError>> + Send;

    /// Get a single result by ID.
    fn get(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> impl std::future::Future<Output = Result<Option<FittingResult>, RepositoryError>> + Send;

    /// List all results, newest first.
    fn list(
        &self,
        session: &UserSession,
    ) -> impl std::future::Future<Output = Result<Vec<FittingResult>, RepositoryError>> + Send;

    /// Update the liked flag. Returns `NotFound` if the record does not exist.
    fn set_liked(
        &self,
        session: &UserSession,
        id: &FittingResultId,
        liked: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Permanently delete a result. Returns `NotFound` if the record does not exist.
    fn delete(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Subscribe to the user's list. The receiver holds the current list
    /// (newest first) and is updated after every append, update, or delete.
    fn subscribe(
        &self,
        session: &UserSession,
    ) -> impl std::future::Future<
        Output = Result<watch::Receiver<Vec<FittingResult>>, RepositoryError>,
    > + Send;
}

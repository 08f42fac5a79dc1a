//! Blob store trait.
//!
//! Durable storage for garment images. An upload returns a URL that later
//! resolves to the same bytes.

use codipop_types::error::RepositoryError;
use codipop_types::session::UserSession;

/// Trait for per-user image uploads.
pub trait BlobStore: Send + Sync {
    /// Store `data` under the user's closet path and return a resolvable URL.
    fn upload(
        &self,
        session: &UserSession,
        filename: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String, RepositoryError>> + Send;
}

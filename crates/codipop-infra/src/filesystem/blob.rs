//! Local blob store for garment images.
//!
//! Layout: `{root}/{user_id}/closet/{uuid}_{filename}`. The returned URL is
//! the absolute file path, which stays valid across runs.

use std::path::{Path, PathBuf};

use codipop_core::storage::blob_store::BlobStore;
use codipop_types::error::RepositoryError;
use codipop_types::session::UserSession;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Store blobs under `{data_dir}/blobs`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("blobs"),
        }
    }

    fn closet_dir(&self, user_id: &str) -> Result<PathBuf, RepositoryError> {
        if !is_safe_segment(user_id) {
            return Err(RepositoryError::Query(format!("invalid user id '{user_id}'")));
        }
        Ok(self.root.join(user_id).join("closet"))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        session: &UserSession,
        filename: &str,
        data: &[u8],
    ) -> Result<String, RepositoryError> {
        if !is_safe_segment(filename) {
            return Err(RepositoryError::Query(format!("invalid file name '{filename}'")));
        }

        let dir = self.closet_dir(&session.user_id)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to create {}: {e}", dir.display())))?;

        let path = dir.join(format!("{}_{filename}", Uuid::now_v7()));
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to write {}: {e}", path.display())))?;

        let path = tokio::fs::canonicalize(&path).await.unwrap_or(path);
        tracing::debug!(path = %path.display(), bytes = data.len(), "stored blob");
        Ok(path.display().to_string())
    }
}

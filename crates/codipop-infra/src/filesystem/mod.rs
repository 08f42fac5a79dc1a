//! Filesystem adapters for Codipop.
//!
//! Provides the local [`BlobStore`](codipop_core::storage::blob_store::BlobStore)
//! implementation and data directory resolution.

pub mod blob;

use std::path::PathBuf;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CODIPOP_DATA_DIR` environment variable
/// 2. `~/.codipop`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CODIPOP_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".codipop");
    }

    // Last resort: current directory
    PathBuf::from(".codipop")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is the only one touching CODIPOP_DATA_DIR and restores it immediately.
        unsafe {
            std::env::set_var("CODIPOP_DATA_DIR", "/tmp/test-codipop");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-codipop"));
        unsafe {
            std::env::remove_var("CODIPOP_DATA_DIR");
        }
    }
}

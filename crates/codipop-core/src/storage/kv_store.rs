//! Key-value store trait.
//!
//! Defines the interface for durable device-local key-value storage
//! (quota record, onboarding flag). Implementations live in codipop-infra.

use codipop_types::error::RepositoryError;

/// Trait for persisted string key-value storage.
///
/// Values are opaque strings; callers that store structured data encode it
/// as JSON themselves. Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

use thiserror::Error;

/// Errors from repository operations (used by trait definitions in codipop-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failures of a single compositor call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("compositor request failed: {0}")]
    Transport(String),

    #[error("compositor returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("compositor rejected the request: {0}")]
    Rejected(String),

    #[error("malformed compositor response: {0}")]
    Malformed(String),

    #[error("compositor did not respond within {secs}s")]
    Timeout { secs: u64 },

    #[error("failed to read image '{uri}': {reason}")]
    ImageRead { uri: String, reason: String },
}

/// Errors surfaced by a try-on invocation.
///
/// Storage faults on the quota record and stale responses are handled inside
/// the coordinator and never appear here.
#[derive(Debug, Error)]
pub enum FittingError {
    #[error("{0}")]
    Validation(String),

    #[error("daily try-on limit of {limit} reached; available again tomorrow")]
    QuotaExceeded { limit: u32 },

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Errors related to wardrobe operations.
#[derive(Debug, Error)]
pub enum WardrobeError {
    #[error("garment not found")]
    NotFound,

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to fitting history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("fitting result not found")]
    NotFound,

    #[error("storage error: {0}")]
    StorageError(String),
}

//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod fitting_result;
pub mod kv;
pub mod pool;
pub mod wardrobe;

use chrono::{DateTime, SecondsFormat, Utc};
use codipop_types::error::RepositoryError;

/// Fixed-width RFC 3339 so that text order matches time order in `ORDER BY`.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

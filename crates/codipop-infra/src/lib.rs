//! Infrastructure layer for Codipop.
//!
//! Contains implementations of the traits defined in `codipop-core`:
//! SQLite storage, the HTTP compositor client, and the local blob store.

pub mod config;
pub mod filesystem;
pub mod http;
pub mod sqlite;

//! Storage abstractions for Codipop.
//!
//! Defines traits for the device-local key-value store and for blob storage
//! of garment images. Implementations live in codipop-infra.

pub mod blob_store;
pub mod kv_store;

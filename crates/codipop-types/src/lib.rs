//! Shared domain types for Codipop.
//!
//! This crate contains the domain types used across the Codipop fitting client:
//! garments, fitting results, the daily quota record, history groups, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod fitting;
pub mod garment;
pub mod history;
pub mod quota;
pub mod session;

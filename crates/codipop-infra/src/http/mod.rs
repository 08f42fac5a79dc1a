//! HTTP adapters.

pub mod compositor;

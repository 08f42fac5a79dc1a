//! Virtual fitting: the compositor port and the request orchestrator.

pub mod compositor;
pub mod orchestrator;

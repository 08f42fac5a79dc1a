//! Repository trait definitions (ports).
//!
//! These traits define the remote document collections that the
//! infrastructure layer (codipop-infra) implements. The core crate never
//! depends on any specific storage technology.

pub mod fitting_result;
pub mod wardrobe;

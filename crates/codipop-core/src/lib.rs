//! Fitting session coordinator and repository trait definitions for Codipop.
//!
//! This crate defines the "ports" (storage, compositor, and repository traits)
//! that the infrastructure layer implements, plus the coordinator logic built
//! on top of them. It depends only on `codipop-types` -- never on
//! `codipop-infra` or any database/IO crate.

pub mod clock;
pub mod fitting;
pub mod history;
pub mod onboarding;
pub mod quota;
pub mod repository;
pub mod selection;
pub mod storage;
pub mod wardrobe;

#[cfg(test)]
pub(crate) mod test_support;

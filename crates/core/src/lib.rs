//! Domain primitives for the tapeshelf cabinet/cassette hierarchy.
//!
//! This crate has no internal dependencies so it can be shared by the store,
//! the hierarchy manager and the HTTP layer alike.

pub mod error;
pub mod shelf;
pub mod types;
pub mod validation;

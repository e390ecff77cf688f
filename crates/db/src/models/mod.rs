//! Record structs and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` record struct matching the database row
//! - `Deserialize` request DTOs accepted by the hierarchy manager

pub mod cabinet;
pub mod cassette;

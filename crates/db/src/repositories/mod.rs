//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&mut PgConnection` as the first argument, so they can run
//! against a pooled connection or inside a transaction alike.

pub mod cabinet_repo;
pub mod cassette_repo;

pub use cabinet_repo::CabinetRepo;
pub use cassette_repo::CassetteRepo;

//! Cassette record and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tapeshelf_core::types::{EntityId, Timestamp};

/// A row from the `cassettes` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Cassette {
    pub id: EntityId,
    pub cabinet_id: EntityId,
    pub shelf: i32,
    pub movie_title_en: String,
    pub release_year: i32,
    pub director: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for adding a cassette.
///
/// The parent is resolved from `cabinet_id` when present, otherwise from
/// `cabinet_letter` (first cabinet with that letter).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCassette {
    pub cabinet_id: Option<EntityId>,
    pub cabinet_letter: Option<String>,
    pub shelf: i32,
    pub movie_title_en: String,
    pub release_year: i32,
    pub director: Option<String>,
}

/// DTO for replacing a cassette. Every field is required; there is no
/// partial patch.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCassette {
    pub cabinet_id: EntityId,
    pub shelf: i32,
    pub movie_title_en: String,
    pub release_year: i32,
    pub director: Option<String>,
}

/// Case-insensitive substring filters. Both filters must match when both
/// are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CassetteSearch {
    pub title: Option<String>,
    pub director: Option<String>,
}

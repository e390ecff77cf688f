//! Cabinet record and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tapeshelf_core::types::{EntityId, Timestamp};

/// A row from the `cabinets` table.
///
/// Cabinets never change after creation. Membership of cassettes is computed
/// by querying `cassettes.cabinet_id`; the cabinet holds no list.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Cabinet {
    pub id: EntityId,
    /// Single uppercase ASCII letter. Not unique across cabinets.
    pub letter: String,
    pub created_at: Timestamp,
}

/// DTO for creating a cabinet.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCabinet {
    pub letter: String,
}

//! Cabinet operations.

use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::{new_id, now, EntityId};
use tapeshelf_core::validation::validate_letter;
use tapeshelf_db::models::cabinet::{Cabinet, CreateCabinet};
use tapeshelf_db::{LockMode, StoreTx};

use crate::manager::{lock_cabinet, require_cabinet, HierarchyManager};
use crate::projection::{CabinetSummary, Deleted};

impl HierarchyManager {
    /// Create a cabinet. A new cabinet has no cassettes, so its four shelves
    /// are reported empty without querying.
    pub async fn create_cabinet(&self, input: &CreateCabinet) -> Result<CabinetSummary, CoreError> {
        let letter = validate_letter(&input.letter)?;
        let cabinet = Cabinet {
            id: new_id(),
            letter: letter.to_string(),
            created_at: now(),
        };

        let mut tx = self.begin().await?;
        tx.insert_cabinet(&cabinet).await?;
        tx.commit().await?;

        tracing::info!(cabinet_id = %cabinet.id, %letter, "Cabinet created");
        Ok(CabinetSummary::empty(cabinet))
    }

    /// All cabinets in store order, each with shelf occupancy.
    pub async fn list_cabinets(&self) -> Result<Vec<CabinetSummary>, CoreError> {
        let mut tx = self.begin().await?;
        let cabinets = tx.list_cabinets().await?;
        summarize_all(tx.as_mut(), cabinets).await
    }

    pub async fn get_cabinet(&self, id: EntityId) -> Result<CabinetSummary, CoreError> {
        let mut tx = self.begin().await?;
        let cabinet = require_cabinet(tx.as_mut(), id).await?;
        summarize(tx.as_mut(), cabinet).await
    }

    /// Every cabinet carrying `letter`. Fails with `LetterNotFound` when
    /// there are none.
    pub async fn get_cabinets_by_letter(
        &self,
        letter: &str,
    ) -> Result<Vec<CabinetSummary>, CoreError> {
        let letter = validate_letter(letter)?;
        let mut tx = self.begin().await?;
        let cabinets = tx.list_cabinets_by_letter(letter).await?;
        if cabinets.is_empty() {
            return Err(CoreError::LetterNotFound { letter });
        }
        summarize_all(tx.as_mut(), cabinets).await
    }

    /// Delete an empty cabinet.
    ///
    /// The cabinet row stays exclusively locked from the emptiness check to
    /// the delete, so no cassette can be attached in between.
    pub async fn delete_cabinet(&self, id: EntityId) -> Result<Deleted, CoreError> {
        let mut tx = self.begin().await?;
        let cabinet = lock_cabinet(tx.as_mut(), id, LockMode::Exclusive).await?;

        let count = tx.count_cassettes_by_cabinet(id).await?;
        if count > 0 {
            tracing::warn!(cabinet_id = %id, count, "Refused to delete non-empty cabinet");
            return Err(CoreError::Conflict(format!(
                "Cannot delete non-empty cabinet: it still holds {count} cassette(s)"
            )));
        }

        if !tx.delete_cabinet(id).await? {
            return Err(CoreError::cabinet_not_found(id));
        }
        tx.commit().await?;

        tracing::info!(cabinet_id = %id, letter = %cabinet.letter, "Cabinet deleted");
        Ok(Deleted {
            message: "Cabinet deleted successfully".to_string(),
            id,
        })
    }
}

async fn summarize(tx: &mut dyn StoreTx, cabinet: Cabinet) -> Result<CabinetSummary, CoreError> {
    let cassettes = tx.list_cassettes_by_cabinet(cabinet.id).await?;
    Ok(CabinetSummary::new(cabinet, &cassettes))
}

async fn summarize_all(
    tx: &mut dyn StoreTx,
    cabinets: Vec<Cabinet>,
) -> Result<Vec<CabinetSummary>, CoreError> {
    let mut summaries = Vec::with_capacity(cabinets.len());
    for cabinet in cabinets {
        summaries.push(summarize(tx, cabinet).await?);
    }
    Ok(summaries)
}

//! Shelf and cabinet content views.

use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::EntityId;
use tapeshelf_core::validation::{validate_letter, validate_shelf};
use tapeshelf_db::StoreTx;

use crate::manager::{require_cabinet, HierarchyManager};
use crate::projection::{CabinetView, LetterView, ShelfEntry, ShelfView};

impl HierarchyManager {
    /// A cabinet with the contents of all four shelves.
    pub async fn view_cabinet(&self, id: EntityId) -> Result<CabinetView, CoreError> {
        let mut tx = self.begin().await?;
        let cabinet = require_cabinet(tx.as_mut(), id).await?;
        let cassettes = tx.list_cassettes_by_cabinet(id).await?;
        Ok(CabinetView::new(cabinet, cassettes))
    }

    /// Contents of every cabinet carrying `letter`.
    pub async fn view_cabinets_by_letter(&self, letter: &str) -> Result<LetterView, CoreError> {
        let letter = validate_letter(letter)?;
        let mut tx = self.begin().await?;
        let cabinets = tx.list_cabinets_by_letter(letter).await?;
        if cabinets.is_empty() {
            return Err(CoreError::LetterNotFound { letter });
        }

        let mut views = Vec::with_capacity(cabinets.len());
        for cabinet in cabinets {
            let cassettes = tx.list_cassettes_by_cabinet(cabinet.id).await?;
            views.push(CabinetView::new(cabinet, cassettes));
        }
        Ok(LetterView {
            letter: letter.to_string(),
            cabinet_count: views.len(),
            cabinets: views,
        })
    }

    /// The cassettes on one shelf of one cabinet.
    pub async fn view_shelf(
        &self,
        cabinet_id: EntityId,
        shelf: i32,
    ) -> Result<ShelfView, CoreError> {
        let mut tx = self.begin().await?;
        let cabinet = require_cabinet(tx.as_mut(), cabinet_id).await?;
        let shelf = validate_shelf(shelf)?;

        let cassettes: Vec<ShelfEntry> = tx
            .list_cassettes_by_cabinet_and_shelf(cabinet_id, shelf)
            .await?
            .into_iter()
            .map(ShelfEntry::from)
            .collect();
        Ok(ShelfView {
            cabinet_id: cabinet.id,
            cabinet_letter: cabinet.letter,
            shelf,
            cassette_count: cassettes.len(),
            cassettes,
        })
    }
}

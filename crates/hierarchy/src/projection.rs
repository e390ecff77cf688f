//! Read-only views assembled from cabinet and cassette records.
//!
//! Shelves are always reported as a fixed array of four, indexed by shelf
//! number minus one. Empty shelves are present with a zero count.

use serde::Serialize;
use tapeshelf_core::shelf::{group_by_shelf, SHELF_COUNT, SHELVES};
use tapeshelf_core::types::{EntityId, Timestamp};
use tapeshelf_db::models::cabinet::Cabinet;
use tapeshelf_db::models::cassette::Cassette;

/// Occupancy of one shelf: how many cassettes and which ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfSummary {
    pub shelf: i32,
    pub cassette_count: usize,
    pub cassette_ids: Vec<EntityId>,
}

/// A cabinet with per-shelf occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CabinetSummary {
    pub id: EntityId,
    pub letter: String,
    pub created_at: Timestamp,
    pub shelves: [ShelfSummary; SHELF_COUNT],
}

impl CabinetSummary {
    /// Summarize a cabinet from the cassettes that reference it.
    pub fn new(cabinet: Cabinet, cassettes: &[Cassette]) -> Self {
        let mut grouped = group_by_shelf(cassettes, |c| c.shelf);
        let shelves = std::array::from_fn(|i| {
            let ids: Vec<EntityId> = std::mem::take(&mut grouped[i])
                .into_iter()
                .map(|c| c.id)
                .collect();
            ShelfSummary {
                shelf: SHELVES[i],
                cassette_count: ids.len(),
                cassette_ids: ids,
            }
        });
        Self {
            id: cabinet.id,
            letter: cabinet.letter,
            created_at: cabinet.created_at,
            shelves,
        }
    }

    /// Summary of a cabinet known to hold nothing.
    pub fn empty(cabinet: Cabinet) -> Self {
        Self::new(cabinet, &[])
    }

    /// Look up a shelf by its number (1-4).
    pub fn shelf(&self, shelf: i32) -> Option<&ShelfSummary> {
        self.shelves.iter().find(|s| s.shelf == shelf)
    }

    pub fn total_cassettes(&self) -> usize {
        self.shelves.iter().map(|s| s.cassette_count).sum()
    }
}

/// A cassette as listed on a shelf, without the redundant cabinet and shelf
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfEntry {
    pub id: EntityId,
    pub movie_title_en: String,
    pub release_year: i32,
    pub director: Option<String>,
}

impl From<Cassette> for ShelfEntry {
    fn from(cassette: Cassette) -> Self {
        Self {
            id: cassette.id,
            movie_title_en: cassette.movie_title_en,
            release_year: cassette.release_year,
            director: cassette.director,
        }
    }
}

/// The cassettes on one shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfContents {
    pub shelf: i32,
    pub cassette_count: usize,
    pub cassettes: Vec<ShelfEntry>,
}

/// A cabinet with the full contents of each shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CabinetView {
    pub id: EntityId,
    pub letter: String,
    pub created_at: Timestamp,
    pub total_cassettes: usize,
    pub shelves: [ShelfContents; SHELF_COUNT],
}

impl CabinetView {
    pub fn new(cabinet: Cabinet, cassettes: Vec<Cassette>) -> Self {
        let total_cassettes = cassettes.len();
        let mut grouped = group_by_shelf(cassettes, |c| c.shelf);
        let shelves = std::array::from_fn(|i| {
            let entries: Vec<ShelfEntry> = std::mem::take(&mut grouped[i])
                .into_iter()
                .map(ShelfEntry::from)
                .collect();
            ShelfContents {
                shelf: SHELVES[i],
                cassette_count: entries.len(),
                cassettes: entries,
            }
        });
        Self {
            id: cabinet.id,
            letter: cabinet.letter,
            created_at: cabinet.created_at,
            total_cassettes,
            shelves,
        }
    }

    pub fn shelf(&self, shelf: i32) -> Option<&ShelfContents> {
        self.shelves.iter().find(|s| s.shelf == shelf)
    }
}

/// Every cabinet sharing one letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterView {
    pub letter: String,
    pub cabinet_count: usize,
    pub cabinets: Vec<CabinetView>,
}

/// One shelf of one cabinet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfView {
    pub cabinet_id: EntityId,
    pub cabinet_letter: String,
    pub shelf: i32,
    pub cassette_count: usize,
    pub cassettes: Vec<ShelfEntry>,
}

/// A search result: the cassette plus its cabinet's letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub cassette: Cassette,
    /// `"Unknown"` when the referenced cabinet no longer exists.
    pub cabinet_letter: String,
}

/// Confirmation returned by delete operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub message: String,
    pub id: EntityId,
}

//! The storage hierarchy manager.
//!
//! [`HierarchyManager`] applies the validation rules and composite
//! operations over cabinets and cassettes, talking to persistence only
//! through [`tapeshelf_db::RecordStore`]. Every public operation runs inside
//! one store transaction and either commits in full or leaves no trace.

mod cabinets;
mod cassettes;
mod manager;
pub mod projection;
mod views;

pub use manager::HierarchyManager;
pub use projection::{
    CabinetSummary, CabinetView, Deleted, LetterView, SearchHit, ShelfContents, ShelfEntry,
    ShelfSummary, ShelfView,
};

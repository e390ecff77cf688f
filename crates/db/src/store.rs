//! The record store contract.
//!
//! The hierarchy manager only ever talks to these traits. Any backend
//! (PostgreSQL, in-memory) implements them to provide durable keyed storage
//! for cabinets and cassettes.

use async_trait::async_trait;
use tapeshelf_core::types::EntityId;

use crate::error::StoreError;
use crate::models::cabinet::Cabinet;
use crate::models::cassette::{Cassette, CassetteSearch};

/// Row lock strength taken on a cabinet inside a transaction.
///
/// `Shared` is held while a cassette is attached to the cabinet; `Exclusive`
/// while the cabinet is checked for emptiness and deleted. Shared locks do not
/// conflict with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Entry point of a storage backend.
///
/// Implementations must be thread-safe and cheap to share behind an `Arc`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a transaction scope. Everything done through the returned handle
    /// becomes visible to others on [`StoreTx::commit`] and is discarded if
    /// the handle is dropped first.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Operations available inside one transaction.
///
/// List operations return records in store order, which is creation order.
#[async_trait]
pub trait StoreTx: Send {
    /// Insert a cabinet. Fails with [`StoreError::Duplicate`] on id reuse.
    async fn insert_cabinet(&mut self, cabinet: &Cabinet) -> Result<(), StoreError>;

    async fn get_cabinet(&mut self, id: EntityId) -> Result<Option<Cabinet>, StoreError>;

    /// Fetch a cabinet and hold a row lock on it until the transaction ends.
    async fn lock_cabinet(
        &mut self,
        id: EntityId,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError>;

    async fn list_cabinets(&mut self) -> Result<Vec<Cabinet>, StoreError>;

    async fn list_cabinets_by_letter(&mut self, letter: char) -> Result<Vec<Cabinet>, StoreError>;

    /// The first cabinet with `letter` in store order, locked with `mode`.
    async fn first_cabinet_by_letter(
        &mut self,
        letter: char,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError>;

    /// Delete a cabinet together with every cassette referencing it.
    /// Returns `false` if no such cabinet existed.
    async fn delete_cabinet(&mut self, id: EntityId) -> Result<bool, StoreError>;

    /// Insert a cassette. Fails with [`StoreError::Duplicate`] on id reuse.
    async fn insert_cassette(&mut self, cassette: &Cassette) -> Result<(), StoreError>;

    async fn get_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError>;

    /// Fetch a cassette and hold an exclusive row lock on it.
    async fn lock_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError>;

    async fn list_cassettes(&mut self) -> Result<Vec<Cassette>, StoreError>;

    async fn list_cassettes_by_cabinet(
        &mut self,
        cabinet_id: EntityId,
    ) -> Result<Vec<Cassette>, StoreError>;

    async fn list_cassettes_by_cabinet_and_shelf(
        &mut self,
        cabinet_id: EntityId,
        shelf: i32,
    ) -> Result<Vec<Cassette>, StoreError>;

    /// Case-insensitive substring search. Unset filters match everything.
    async fn search_cassettes(
        &mut self,
        search: &CassetteSearch,
    ) -> Result<Vec<Cassette>, StoreError>;

    /// Replace every mutable field of the cassette with `cassette.id`.
    /// `created_at` is never changed. Returns `false` if no row matched.
    async fn update_cassette(&mut self, cassette: &Cassette) -> Result<bool, StoreError>;

    /// Returns `false` if no such cassette existed.
    async fn delete_cassette(&mut self, id: EntityId) -> Result<bool, StoreError>;

    async fn count_cassettes_by_cabinet(&mut self, cabinet_id: EntityId)
        -> Result<i64, StoreError>;

    /// Make every change in this scope visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

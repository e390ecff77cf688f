//! In-memory record store for tests and database-less runs.
//!
//! Committed rows live in insertion-ordered tables behind a `std` read/write
//! lock that is only held for the duration of a lookup or a commit, never
//! across an `.await`. A transaction reads through to the committed tables
//! and keeps its own writes in an overlay that is applied in one step on
//! commit, so other transactions see either none or all of it.
//!
//! Row locks are per-record `tokio` read/write locks held until the
//! transaction ends: `LockMode::Shared` takes the read side,
//! `LockMode::Exclusive` the write side. Transactions on different cabinets
//! never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use indexmap::IndexMap;
use tapeshelf_core::types::EntityId;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock as RowLock};

use crate::error::StoreError;
use crate::models::cabinet::Cabinet;
use crate::models::cassette::{Cassette, CassetteSearch};
use crate::store::{LockMode, RecordStore, StoreTx};

#[derive(Debug, Default)]
struct Tables {
    cabinets: IndexMap<EntityId, Cabinet>,
    cassettes: IndexMap<EntityId, Cassette>,
}

type RowLocks = Mutex<HashMap<EntityId, Arc<RowLock<()>>>>;

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    cabinet_locks: RowLocks,
    cassette_locks: RowLocks,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-memory implementation of [`RecordStore`].
///
/// Store order is insertion order. Data is lost when the last clone is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    shared: Arc<Shared>,
}

impl MemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.shared),
            overlay: Overlay::default(),
            cabinet_guards: HashMap::new(),
            cassette_guards: HashMap::new(),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

enum RowGuard {
    Shared(#[allow(dead_code)] OwnedRwLockReadGuard<()>),
    Exclusive(#[allow(dead_code)] OwnedRwLockWriteGuard<()>),
}

impl RowGuard {
    fn mode(&self) -> LockMode {
        match self {
            RowGuard::Shared(_) => LockMode::Shared,
            RowGuard::Exclusive(_) => LockMode::Exclusive,
        }
    }
}

/// Uncommitted writes of one transaction. `None` marks a deleted row.
#[derive(Default)]
struct Overlay {
    cabinets: IndexMap<EntityId, Option<Cabinet>>,
    cassettes: IndexMap<EntityId, Option<Cassette>>,
    /// Cabinets deleted here; their cassettes are swept on commit.
    cascades: Vec<EntityId>,
    inserted_cabinets: Vec<EntityId>,
    inserted_cassettes: Vec<EntityId>,
}

struct MemoryTx {
    shared: Arc<Shared>,
    overlay: Overlay,
    cabinet_guards: HashMap<EntityId, RowGuard>,
    cassette_guards: HashMap<EntityId, RowGuard>,
}

/// Committed rows with the overlay applied, in store order, filtered by `keep`.
fn merged<T: Clone>(
    live: &IndexMap<EntityId, T>,
    staged: &IndexMap<EntityId, Option<T>>,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    let committed = live.iter().filter_map(|(id, row)| match staged.get(id) {
        Some(staged) => staged.as_ref(),
        None => Some(row),
    });
    let fresh = staged
        .iter()
        .filter(|(id, _)| !live.contains_key(*id))
        .filter_map(|(_, row)| row.as_ref());
    committed.chain(fresh).filter(|row| keep(row)).cloned().collect()
}

fn row_lock(locks: &RowLocks, id: EntityId) -> Arc<RowLock<()>> {
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(id).or_default())
}

/// Take a row lock unless this transaction already holds one at least as
/// strong. A shared lock is released before the exclusive one is awaited.
async fn acquire(
    locks: &RowLocks,
    held: &mut HashMap<EntityId, RowGuard>,
    id: EntityId,
    mode: LockMode,
) {
    match held.get(&id).map(RowGuard::mode) {
        Some(LockMode::Exclusive) => return,
        Some(LockMode::Shared) if mode == LockMode::Shared => return,
        Some(LockMode::Shared) => {
            held.remove(&id);
        }
        None => {}
    }

    let lock = row_lock(locks, id);
    let guard = match mode {
        LockMode::Shared => RowGuard::Shared(lock.read_owned().await),
        LockMode::Exclusive => RowGuard::Exclusive(lock.write_owned().await),
    };
    held.insert(id, guard);
}

/// Drop lock entries for deleted rows that nobody else is holding or waiting on.
fn prune(locks: &RowLocks, ids: &[EntityId]) {
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    for id in ids {
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }
}

impl MemoryTx {
    fn cabinet(&self, id: EntityId) -> Option<Cabinet> {
        match self.overlay.cabinets.get(&id) {
            Some(staged) => staged.clone(),
            None => self.shared.read().cabinets.get(&id).cloned(),
        }
    }

    fn cabinets_where(&self, pred: impl Fn(&Cabinet) -> bool) -> Vec<Cabinet> {
        let live = self.shared.read();
        merged(&live.cabinets, &self.overlay.cabinets, pred)
    }

    fn cascaded(&self, cassette: &Cassette) -> bool {
        self.overlay.cascades.contains(&cassette.cabinet_id)
    }

    fn cassette(&self, id: EntityId) -> Option<Cassette> {
        let row = match self.overlay.cassettes.get(&id) {
            Some(staged) => staged.clone(),
            None => self.shared.read().cassettes.get(&id).cloned(),
        };
        row.filter(|c| !self.cascaded(c))
    }

    fn cassettes_where(&self, pred: impl Fn(&Cassette) -> bool) -> Vec<Cassette> {
        let live = self.shared.read();
        merged(&live.cassettes, &self.overlay.cassettes, |c| {
            !self.cascaded(c) && pred(c)
        })
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_cabinet(&mut self, cabinet: &Cabinet) -> Result<(), StoreError> {
        if self.cabinet(cabinet.id).is_some() {
            return Err(StoreError::Duplicate {
                entity: "Cabinet",
                id: cabinet.id,
            });
        }
        self.overlay
            .cabinets
            .insert(cabinet.id, Some(cabinet.clone()));
        self.overlay.inserted_cabinets.push(cabinet.id);
        Ok(())
    }

    async fn get_cabinet(&mut self, id: EntityId) -> Result<Option<Cabinet>, StoreError> {
        Ok(self.cabinet(id))
    }

    async fn lock_cabinet(
        &mut self,
        id: EntityId,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError> {
        acquire(&self.shared.cabinet_locks, &mut self.cabinet_guards, id, mode).await;
        Ok(self.cabinet(id))
    }

    async fn list_cabinets(&mut self) -> Result<Vec<Cabinet>, StoreError> {
        Ok(self.cabinets_where(|_| true))
    }

    async fn list_cabinets_by_letter(&mut self, letter: char) -> Result<Vec<Cabinet>, StoreError> {
        let letter = letter.to_string();
        Ok(self.cabinets_where(|c| c.letter == letter))
    }

    async fn first_cabinet_by_letter(
        &mut self,
        letter: char,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError> {
        let letter = letter.to_string();
        // A candidate deleted while we waited for its lock drops out of the
        // next lookup.
        loop {
            let Some(candidate) = self.cabinets_where(|c| c.letter == letter).into_iter().next()
            else {
                return Ok(None);
            };
            if let Some(cabinet) = self.lock_cabinet(candidate.id, mode).await? {
                return Ok(Some(cabinet));
            }
        }
    }

    async fn delete_cabinet(&mut self, id: EntityId) -> Result<bool, StoreError> {
        if self.cabinet(id).is_none() {
            return Ok(false);
        }
        for cassette in self.cassettes_where(|c| c.cabinet_id == id) {
            self.overlay.cassettes.insert(cassette.id, None);
        }
        self.overlay.cabinets.insert(id, None);
        self.overlay.cascades.push(id);
        Ok(true)
    }

    async fn insert_cassette(&mut self, cassette: &Cassette) -> Result<(), StoreError> {
        if self.cassette(cassette.id).is_some() {
            return Err(StoreError::Duplicate {
                entity: "Cassette",
                id: cassette.id,
            });
        }
        self.overlay
            .cassettes
            .insert(cassette.id, Some(cassette.clone()));
        self.overlay.inserted_cassettes.push(cassette.id);
        Ok(())
    }

    async fn get_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError> {
        Ok(self.cassette(id))
    }

    async fn lock_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError> {
        acquire(
            &self.shared.cassette_locks,
            &mut self.cassette_guards,
            id,
            LockMode::Exclusive,
        )
        .await;
        Ok(self.cassette(id))
    }

    async fn list_cassettes(&mut self) -> Result<Vec<Cassette>, StoreError> {
        Ok(self.cassettes_where(|_| true))
    }

    async fn list_cassettes_by_cabinet(
        &mut self,
        cabinet_id: EntityId,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(self.cassettes_where(|c| c.cabinet_id == cabinet_id))
    }

    async fn list_cassettes_by_cabinet_and_shelf(
        &mut self,
        cabinet_id: EntityId,
        shelf: i32,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(self.cassettes_where(|c| c.cabinet_id == cabinet_id && c.shelf == shelf))
    }

    async fn search_cassettes(
        &mut self,
        search: &CassetteSearch,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(self.cassettes_where(|c| {
            let title_ok = search
                .title
                .as_deref()
                .map_or(true, |t| contains_ci(&c.movie_title_en, t));
            let director_ok = search.director.as_deref().map_or(true, |d| {
                c.director.as_deref().is_some_and(|cd| contains_ci(cd, d))
            });
            title_ok && director_ok
        }))
    }

    async fn update_cassette(&mut self, cassette: &Cassette) -> Result<bool, StoreError> {
        let Some(existing) = self.cassette(cassette.id) else {
            return Ok(false);
        };
        let updated = Cassette {
            created_at: existing.created_at,
            ..cassette.clone()
        };
        self.overlay.cassettes.insert(cassette.id, Some(updated));
        Ok(true)
    }

    async fn delete_cassette(&mut self, id: EntityId) -> Result<bool, StoreError> {
        if self.cassette(id).is_none() {
            return Ok(false);
        }
        self.overlay.cassettes.insert(id, None);
        Ok(true)
    }

    async fn count_cassettes_by_cabinet(
        &mut self,
        cabinet_id: EntityId,
    ) -> Result<i64, StoreError> {
        let count = self.cassettes_where(|c| c.cabinet_id == cabinet_id).len();
        Ok(count as i64)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            shared,
            overlay,
            cabinet_guards,
            cassette_guards,
        } = *self;
        let Overlay {
            cabinets,
            cassettes,
            cascades,
            inserted_cabinets,
            inserted_cassettes,
        } = overlay;

        let mut deleted_cabinets = Vec::new();
        let mut deleted_cassettes = Vec::new();
        {
            let mut tables = shared.write();

            // Ids committed by someone else since they were checked.
            if let Some(&id) = inserted_cabinets
                .iter()
                .find(|id| tables.cabinets.contains_key(*id))
            {
                return Err(StoreError::Duplicate {
                    entity: "Cabinet",
                    id,
                });
            }
            if let Some(&id) = inserted_cassettes
                .iter()
                .find(|id| tables.cassettes.contains_key(*id))
            {
                return Err(StoreError::Duplicate {
                    entity: "Cassette",
                    id,
                });
            }

            if !cascades.is_empty() {
                tables
                    .cassettes
                    .retain(|_, c| !cascades.contains(&c.cabinet_id));
            }
            for (id, row) in cabinets {
                match row {
                    Some(cabinet) => {
                        tables.cabinets.insert(id, cabinet);
                    }
                    None => {
                        tables.cabinets.shift_remove(&id);
                        deleted_cabinets.push(id);
                    }
                }
            }
            for (id, row) in cassettes {
                match row {
                    Some(cassette) => {
                        tables.cassettes.insert(id, cassette);
                    }
                    None => {
                        tables.cassettes.shift_remove(&id);
                        deleted_cassettes.push(id);
                    }
                }
            }
        }

        drop(cabinet_guards);
        drop(cassette_guards);
        prune(&shared.cabinet_locks, &deleted_cabinets);
        prune(&shared.cassette_locks, &deleted_cassettes);
        Ok(())
    }
}

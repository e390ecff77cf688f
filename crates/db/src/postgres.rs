//! PostgreSQL-backed [`RecordStore`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tapeshelf_core::types::EntityId;

use crate::error::StoreError;
use crate::models::cabinet::Cabinet;
use crate::models::cassette::{Cassette, CassetteSearch};
use crate::repositories::{CabinetRepo, CassetteRepo};
use crate::store::{LockMode, RecordStore, StoreTx};

/// Record store over a PostgreSQL connection pool.
///
/// Every [`StoreTx`] is a database transaction on one pooled connection. The
/// connection returns to the pool when the transaction is committed or
/// dropped (dropping rolls back).
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn insert_cabinet(&mut self, cabinet: &Cabinet) -> Result<(), StoreError> {
        CabinetRepo::insert(&mut self.tx, cabinet)
            .await
            .map_err(|e| StoreError::on_insert(e, "Cabinet", cabinet.id))
    }

    async fn get_cabinet(&mut self, id: EntityId) -> Result<Option<Cabinet>, StoreError> {
        Ok(CabinetRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn lock_cabinet(
        &mut self,
        id: EntityId,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError> {
        Ok(CabinetRepo::find_by_id_locked(&mut self.tx, id, mode).await?)
    }

    async fn list_cabinets(&mut self) -> Result<Vec<Cabinet>, StoreError> {
        Ok(CabinetRepo::list(&mut self.tx).await?)
    }

    async fn list_cabinets_by_letter(&mut self, letter: char) -> Result<Vec<Cabinet>, StoreError> {
        Ok(CabinetRepo::list_by_letter(&mut self.tx, letter).await?)
    }

    async fn first_cabinet_by_letter(
        &mut self,
        letter: char,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, StoreError> {
        Ok(CabinetRepo::first_by_letter(&mut self.tx, letter, mode).await?)
    }

    async fn delete_cabinet(&mut self, id: EntityId) -> Result<bool, StoreError> {
        Ok(CabinetRepo::delete_with_cassettes(&mut self.tx, id).await?)
    }

    async fn insert_cassette(&mut self, cassette: &Cassette) -> Result<(), StoreError> {
        CassetteRepo::insert(&mut self.tx, cassette)
            .await
            .map_err(|e| StoreError::on_insert(e, "Cassette", cassette.id))
    }

    async fn get_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError> {
        Ok(CassetteRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn lock_cassette(&mut self, id: EntityId) -> Result<Option<Cassette>, StoreError> {
        Ok(CassetteRepo::find_by_id_for_update(&mut self.tx, id).await?)
    }

    async fn list_cassettes(&mut self) -> Result<Vec<Cassette>, StoreError> {
        Ok(CassetteRepo::list(&mut self.tx).await?)
    }

    async fn list_cassettes_by_cabinet(
        &mut self,
        cabinet_id: EntityId,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(CassetteRepo::list_by_cabinet(&mut self.tx, cabinet_id).await?)
    }

    async fn list_cassettes_by_cabinet_and_shelf(
        &mut self,
        cabinet_id: EntityId,
        shelf: i32,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(CassetteRepo::list_by_cabinet_and_shelf(&mut self.tx, cabinet_id, shelf).await?)
    }

    async fn search_cassettes(
        &mut self,
        search: &CassetteSearch,
    ) -> Result<Vec<Cassette>, StoreError> {
        Ok(CassetteRepo::search(&mut self.tx, search).await?)
    }

    async fn update_cassette(&mut self, cassette: &Cassette) -> Result<bool, StoreError> {
        Ok(CassetteRepo::update(&mut self.tx, cassette).await?)
    }

    async fn delete_cassette(&mut self, id: EntityId) -> Result<bool, StoreError> {
        Ok(CassetteRepo::delete(&mut self.tx, id).await?)
    }

    async fn count_cassettes_by_cabinet(
        &mut self,
        cabinet_id: EntityId,
    ) -> Result<i64, StoreError> {
        Ok(CassetteRepo::count_by_cabinet(&mut self.tx, cabinet_id).await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

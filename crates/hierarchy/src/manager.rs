use std::sync::Arc;

use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::EntityId;
use tapeshelf_db::models::cabinet::Cabinet;
use tapeshelf_db::{LockMode, RecordStore, StoreTx};

/// Composite operations over the cabinet/cassette hierarchy.
///
/// Cheap to clone; the store handle is shared. Operations are split across
/// the `cabinets`, `cassettes` and `views` modules.
#[derive(Clone)]
pub struct HierarchyManager {
    store: Arc<dyn RecordStore>,
}

impl HierarchyManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub(crate) async fn begin(&self) -> Result<Box<dyn StoreTx>, CoreError> {
        Ok(self.store.begin().await?)
    }
}

/// Fetch a cabinet or fail with `NotFound`.
pub(crate) async fn require_cabinet(
    tx: &mut dyn StoreTx,
    id: EntityId,
) -> Result<Cabinet, CoreError> {
    tx.get_cabinet(id)
        .await?
        .ok_or(CoreError::cabinet_not_found(id))
}

/// Lock a cabinet or fail with `NotFound`.
pub(crate) async fn lock_cabinet(
    tx: &mut dyn StoreTx,
    id: EntityId,
    mode: LockMode,
) -> Result<Cabinet, CoreError> {
    tx.lock_cabinet(id, mode)
        .await?
        .ok_or(CoreError::cabinet_not_found(id))
}

//! Repository for the `cabinets` table.

use sqlx::PgConnection;
use tapeshelf_core::types::EntityId;

use crate::models::cabinet::Cabinet;
use crate::store::LockMode;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, letter, created_at";

/// Store order for cabinet listings.
const ORDER: &str = "ORDER BY created_at ASC, id ASC";

/// Provides CRUD operations for cabinets.
pub struct CabinetRepo;

impl CabinetRepo {
    /// Insert a cabinet with a caller-generated id.
    pub async fn insert(conn: &mut PgConnection, cabinet: &Cabinet) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO cabinets (id, letter, created_at) VALUES ($1, $2, $3)")
            .bind(cabinet.id)
            .bind(&cabinet.letter)
            .bind(cabinet.created_at)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Find a cabinet by id.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: EntityId,
    ) -> Result<Option<Cabinet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cabinets WHERE id = $1");
        sqlx::query_as::<_, Cabinet>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a cabinet by id and lock its row until the transaction ends.
    pub async fn find_by_id_locked(
        conn: &mut PgConnection,
        id: EntityId,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cabinets WHERE id = $1 {}",
            lock_clause(mode)
        );
        sqlx::query_as::<_, Cabinet>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all cabinets in store order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Cabinet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cabinets {ORDER}");
        sqlx::query_as::<_, Cabinet>(&query).fetch_all(conn).await
    }

    /// List cabinets carrying `letter` in store order.
    pub async fn list_by_letter(
        conn: &mut PgConnection,
        letter: char,
    ) -> Result<Vec<Cabinet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cabinets WHERE letter = $1 {ORDER}");
        sqlx::query_as::<_, Cabinet>(&query)
            .bind(letter.to_string())
            .fetch_all(conn)
            .await
    }

    /// The first cabinet carrying `letter`, locked with `mode`.
    pub async fn first_by_letter(
        conn: &mut PgConnection,
        letter: char,
        mode: LockMode,
    ) -> Result<Option<Cabinet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cabinets WHERE letter = $1 {ORDER} LIMIT 1 {}",
            lock_clause(mode)
        );
        sqlx::query_as::<_, Cabinet>(&query)
            .bind(letter.to_string())
            .fetch_optional(conn)
            .await
    }

    /// Delete a cabinet and cascade to its cassettes.
    ///
    /// Both statements run on the caller's connection, so inside a
    /// transaction they commit or roll back together. Returns `true` if the
    /// cabinet row was removed.
    pub async fn delete_with_cassettes(
        conn: &mut PgConnection,
        id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query("DELETE FROM cassettes WHERE cabinet_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM cabinets WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn lock_clause(mode: LockMode) -> &'static str {
    match mode {
        LockMode::Shared => "FOR SHARE",
        LockMode::Exclusive => "FOR UPDATE",
    }
}

//! Repository for the `cassettes` table.

use sqlx::PgConnection;
use tapeshelf_core::types::EntityId;

use crate::models::cassette::{Cassette, CassetteSearch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, cabinet_id, shelf, movie_title_en, release_year, director, created_at";

/// Store order for cassette listings.
const ORDER: &str = "ORDER BY created_at ASC, id ASC";

/// Provides CRUD operations for cassettes.
pub struct CassetteRepo;

impl CassetteRepo {
    /// Insert a cassette with a caller-generated id.
    pub async fn insert(conn: &mut PgConnection, cassette: &Cassette) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO cassettes
                (id, cabinet_id, shelf, movie_title_en, release_year, director, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(cassette.id)
        .bind(cassette.cabinet_id)
        .bind(cassette.shelf)
        .bind(&cassette.movie_title_en)
        .bind(cassette.release_year)
        .bind(&cassette.director)
        .bind(cassette.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Find a cassette by id.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: EntityId,
    ) -> Result<Option<Cassette>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cassettes WHERE id = $1");
        sqlx::query_as::<_, Cassette>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a cassette by id and hold `FOR UPDATE` on its row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: EntityId,
    ) -> Result<Option<Cassette>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cassettes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Cassette>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List every cassette in store order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Cassette>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cassettes {ORDER}");
        sqlx::query_as::<_, Cassette>(&query).fetch_all(conn).await
    }

    /// List cassettes referencing a cabinet.
    pub async fn list_by_cabinet(
        conn: &mut PgConnection,
        cabinet_id: EntityId,
    ) -> Result<Vec<Cassette>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cassettes WHERE cabinet_id = $1 {ORDER}");
        sqlx::query_as::<_, Cassette>(&query)
            .bind(cabinet_id)
            .fetch_all(conn)
            .await
    }

    /// List cassettes on one shelf of one cabinet.
    pub async fn list_by_cabinet_and_shelf(
        conn: &mut PgConnection,
        cabinet_id: EntityId,
        shelf: i32,
    ) -> Result<Vec<Cassette>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cassettes WHERE cabinet_id = $1 AND shelf = $2 {ORDER}"
        );
        sqlx::query_as::<_, Cassette>(&query)
            .bind(cabinet_id)
            .bind(shelf)
            .fetch_all(conn)
            .await
    }

    /// Case-insensitive substring search on title and/or director using ILIKE.
    ///
    /// `NULL` filters are skipped; a cassette without a director never
    /// matches a director filter.
    pub async fn search(
        conn: &mut PgConnection,
        search: &CassetteSearch,
    ) -> Result<Vec<Cassette>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cassettes
             WHERE ($1::text IS NULL OR movie_title_en ILIKE '%' || $1 || '%' ESCAPE '\\')
               AND ($2::text IS NULL OR director ILIKE '%' || $2 || '%' ESCAPE '\\')
             {ORDER}"
        );
        sqlx::query_as::<_, Cassette>(&query)
            .bind(search.title.as_deref().map(escape_like))
            .bind(search.director.as_deref().map(escape_like))
            .fetch_all(conn)
            .await
    }

    /// Replace all mutable columns. Returns `true` if a row was updated.
    pub async fn update(conn: &mut PgConnection, cassette: &Cassette) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE cassettes SET
                cabinet_id = $2,
                shelf = $3,
                movie_title_en = $4,
                release_year = $5,
                director = $6
             WHERE id = $1",
        )
        .bind(cassette.id)
        .bind(cassette.cabinet_id)
        .bind(cassette.shelf)
        .bind(&cassette.movie_title_en)
        .bind(cassette.release_year)
        .bind(&cassette.director)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a cassette. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cassettes WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count cassettes referencing a cabinet.
    pub async fn count_by_cabinet(
        conn: &mut PgConnection,
        cabinet_id: EntityId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cassettes WHERE cabinet_id = $1")
                .bind(cabinet_id)
                .fetch_one(conn)
                .await?;
        Ok(count)
    }
}

/// Escape `\`, `%` and `_` so user input matches literally inside a LIKE
/// pattern using `ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

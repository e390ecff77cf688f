//! Cassette operations.

use std::collections::HashMap;

use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::{new_id, now, EntityId};
use tapeshelf_core::validation::{
    validate_letter, validate_optional_text, validate_required_text, validate_shelf,
    validate_year,
};
use tapeshelf_db::models::cabinet::Cabinet;
use tapeshelf_db::models::cassette::{Cassette, CassetteSearch, CreateCassette, UpdateCassette};
use tapeshelf_db::{LockMode, StoreTx};

use crate::manager::{lock_cabinet, HierarchyManager};
use crate::projection::{Deleted, SearchHit};

/// Letter reported for a search hit whose cabinet has vanished.
const UNKNOWN_LETTER: &str = "Unknown";

/// Validated cassette fields, shared by add and update.
struct CassetteFields {
    shelf: i32,
    movie_title_en: String,
    release_year: i32,
    director: Option<String>,
}

impl CassetteFields {
    fn validate(
        shelf: i32,
        movie_title_en: &str,
        release_year: i32,
        director: Option<&str>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            shelf: validate_shelf(shelf)?,
            release_year: validate_year(release_year)?,
            movie_title_en: validate_required_text(movie_title_en, "Movie title")?,
            director: validate_optional_text(director, "Director")?,
        })
    }
}

impl HierarchyManager {
    /// Add a cassette to a cabinet.
    ///
    /// The parent is `cabinet_id` when given. Otherwise `cabinet_letter`
    /// binds to the first cabinet with that letter in store order; when
    /// several cabinets share the letter the choice is that first one, always.
    /// The parent stays share-locked until commit so it cannot be deleted
    /// underneath the insert.
    pub async fn add_cassette(&self, input: &CreateCassette) -> Result<Cassette, CoreError> {
        let mut tx = self.begin().await?;
        let cabinet = resolve_parent(tx.as_mut(), input).await?;

        let fields = CassetteFields::validate(
            input.shelf,
            &input.movie_title_en,
            input.release_year,
            input.director.as_deref(),
        )?;
        let cassette = Cassette {
            id: new_id(),
            cabinet_id: cabinet.id,
            shelf: fields.shelf,
            movie_title_en: fields.movie_title_en,
            release_year: fields.release_year,
            director: fields.director,
            created_at: now(),
        };

        tx.insert_cassette(&cassette).await?;
        tx.commit().await?;

        tracing::info!(
            cassette_id = %cassette.id,
            cabinet_id = %cabinet.id,
            letter = %cabinet.letter,
            shelf = cassette.shelf,
            "Cassette added",
        );
        Ok(cassette)
    }

    pub async fn get_cassette(&self, id: EntityId) -> Result<Cassette, CoreError> {
        let mut tx = self.begin().await?;
        tx.get_cassette(id)
            .await?
            .ok_or(CoreError::cassette_not_found(id))
    }

    pub async fn list_cassettes(&self) -> Result<Vec<Cassette>, CoreError> {
        let mut tx = self.begin().await?;
        Ok(tx.list_cassettes().await?)
    }

    /// Case-insensitive substring search on title and/or director, each hit
    /// tagged with its cabinet's letter.
    ///
    /// Blank filters count as absent; at least one must remain.
    pub async fn search_cassettes(
        &self,
        search: &CassetteSearch,
    ) -> Result<Vec<SearchHit>, CoreError> {
        let search = CassetteSearch {
            title: non_blank(search.title.as_deref()),
            director: non_blank(search.director.as_deref()),
        };
        if search.title.is_none() && search.director.is_none() {
            return Err(CoreError::BadRequest(
                "At least one of title or director must be provided".to_string(),
            ));
        }

        let mut tx = self.begin().await?;
        let cassettes = tx.search_cassettes(&search).await?;

        let mut letters: HashMap<EntityId, String> = HashMap::new();
        let mut hits = Vec::with_capacity(cassettes.len());
        for cassette in cassettes {
            let letter = match letters.get(&cassette.cabinet_id) {
                Some(letter) => letter.clone(),
                None => {
                    let letter = match tx.get_cabinet(cassette.cabinet_id).await? {
                        Some(cabinet) => cabinet.letter,
                        None => {
                            tracing::warn!(
                                cassette_id = %cassette.id,
                                cabinet_id = %cassette.cabinet_id,
                                "Cassette references a missing cabinet",
                            );
                            UNKNOWN_LETTER.to_string()
                        }
                    };
                    letters.insert(cassette.cabinet_id, letter.clone());
                    letter
                }
            };
            hits.push(SearchHit {
                cassette,
                cabinet_letter: letter,
            });
        }
        Ok(hits)
    }

    /// Replace every mutable field of a cassette. `id` and `created_at` are
    /// kept. The new parent must be given by id and must exist.
    pub async fn update_cassette(
        &self,
        id: EntityId,
        input: &UpdateCassette,
    ) -> Result<Cassette, CoreError> {
        let mut tx = self.begin().await?;
        let existing = tx
            .lock_cassette(id)
            .await?
            .ok_or(CoreError::cassette_not_found(id))?;
        let cabinet = lock_cabinet(tx.as_mut(), input.cabinet_id, LockMode::Shared).await?;

        let fields = CassetteFields::validate(
            input.shelf,
            &input.movie_title_en,
            input.release_year,
            input.director.as_deref(),
        )?;
        let updated = Cassette {
            id: existing.id,
            cabinet_id: cabinet.id,
            shelf: fields.shelf,
            movie_title_en: fields.movie_title_en,
            release_year: fields.release_year,
            director: fields.director,
            created_at: existing.created_at,
        };

        if !tx.update_cassette(&updated).await? {
            return Err(CoreError::cassette_not_found(id));
        }
        tx.commit().await?;

        tracing::info!(
            cassette_id = %id,
            from_cabinet = %existing.cabinet_id,
            to_cabinet = %cabinet.id,
            shelf = updated.shelf,
            "Cassette updated",
        );
        Ok(updated)
    }

    /// Delete a cassette unconditionally.
    pub async fn delete_cassette(&self, id: EntityId) -> Result<Deleted, CoreError> {
        let mut tx = self.begin().await?;
        if tx.lock_cassette(id).await?.is_none() {
            return Err(CoreError::cassette_not_found(id));
        }
        if !tx.delete_cassette(id).await? {
            return Err(CoreError::cassette_not_found(id));
        }
        tx.commit().await?;

        tracing::info!(cassette_id = %id, "Cassette deleted");
        Ok(Deleted {
            message: "Cassette deleted successfully".to_string(),
            id,
        })
    }
}

/// Resolve and share-lock the parent cabinet of a new cassette.
async fn resolve_parent(
    tx: &mut dyn StoreTx,
    input: &CreateCassette,
) -> Result<Cabinet, CoreError> {
    if let Some(cabinet_id) = input.cabinet_id {
        return lock_cabinet(tx, cabinet_id, LockMode::Shared).await;
    }

    let Some(raw_letter) = input.cabinet_letter.as_deref() else {
        return Err(CoreError::BadRequest(
            "Either cabinet_id or cabinet_letter must be provided".to_string(),
        ));
    };
    let letter = validate_letter(raw_letter)?;

    let cabinet = tx
        .first_cabinet_by_letter(letter, LockMode::Shared)
        .await?
        .ok_or_else(|| {
            CoreError::PreconditionFailed(format!(
                "No cabinet with letter {letter} exists; create a cabinet first"
            ))
        })?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let sharing = tx.list_cabinets_by_letter(letter).await?.len();
        if sharing > 1 {
            tracing::debug!(
                %letter,
                sharing,
                chosen = %cabinet.id,
                "Letter matches several cabinets; using the first",
            );
        }
    }
    Ok(cabinet)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

//! Handlers for the `/cassettes` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tapeshelf_core::types::EntityId;
use tapeshelf_db::models::cassette::{Cassette, CassetteSearch, CreateCassette, UpdateCassette};
use tapeshelf_hierarchy::{Deleted, SearchHit};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

/// POST /api/v1/cassettes
///
/// The parent is named by `cabinet_id` or, failing that, `cabinet_letter`.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCassette>,
) -> AppResult<(StatusCode, Json<Cassette>)> {
    let cassette = state.manager.add_cassette(&input).await?;
    Ok((StatusCode::CREATED, Json(cassette)))
}

/// GET /api/v1/cassettes
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Cassette>>> {
    let cassettes = state.manager.list_cassettes().await?;
    Ok(Json(cassettes))
}

/// GET /api/v1/cassettes/search?title=&director=
pub async fn search(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CassetteSearch>,
) -> AppResult<Json<Vec<SearchHit>>> {
    let hits = state.manager.search_cassettes(&params).await?;
    Ok(Json(hits))
}

/// GET /api/v1/cassettes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<Cassette>> {
    let cassette = state.manager.get_cassette(id).await?;
    Ok(Json(cassette))
}

/// PUT /api/v1/cassettes/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
    AppJson(input): AppJson<UpdateCassette>,
) -> AppResult<Json<Cassette>> {
    let cassette = state.manager.update_cassette(id, &input).await?;
    Ok(Json(cassette))
}

/// DELETE /api/v1/cassettes/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<Deleted>> {
    let deleted = state.manager.delete_cassette(id).await?;
    Ok(Json(deleted))
}

//! Handlers for the `/cabinets` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tapeshelf_core::types::EntityId;
use tapeshelf_db::models::cabinet::CreateCabinet;
use tapeshelf_hierarchy::{CabinetSummary, CabinetView, Deleted, LetterView, ShelfView};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

/// POST /api/v1/cabinets
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCabinet>,
) -> AppResult<(StatusCode, Json<CabinetSummary>)> {
    let cabinet = state.manager.create_cabinet(&input).await?;
    Ok((StatusCode::CREATED, Json(cabinet)))
}

/// GET /api/v1/cabinets
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CabinetSummary>>> {
    let cabinets = state.manager.list_cabinets().await?;
    Ok(Json(cabinets))
}

/// GET /api/v1/cabinets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<CabinetSummary>> {
    let cabinet = state.manager.get_cabinet(id).await?;
    Ok(Json(cabinet))
}

/// DELETE /api/v1/cabinets/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<Deleted>> {
    let deleted = state.manager.delete_cabinet(id).await?;
    Ok(Json(deleted))
}

/// GET /api/v1/cabinets/{id}/view
pub async fn view(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<CabinetView>> {
    let view = state.manager.view_cabinet(id).await?;
    Ok(Json(view))
}

/// GET /api/v1/cabinets/{id}/shelves/{shelf}
pub async fn view_shelf(
    State(state): State<AppState>,
    AppPath((id, shelf)): AppPath<(EntityId, i32)>,
) -> AppResult<Json<ShelfView>> {
    let view = state.manager.view_shelf(id, shelf).await?;
    Ok(Json(view))
}

/// GET /api/v1/cabinets/by-letter/{letter}
pub async fn list_by_letter(
    State(state): State<AppState>,
    AppPath(letter): AppPath<String>,
) -> AppResult<Json<Vec<CabinetSummary>>> {
    let cabinets = state.manager.get_cabinets_by_letter(&letter).await?;
    Ok(Json(cabinets))
}

/// GET /api/v1/cabinets/by-letter/{letter}/view
pub async fn view_by_letter(
    State(state): State<AppState>,
    AppPath(letter): AppPath<String>,
) -> AppResult<Json<LetterView>> {
    let view = state.manager.view_cabinets_by_letter(&letter).await?;
    Ok(Json(view))
}

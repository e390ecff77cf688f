//! Route definitions for the `/cabinets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cabinet;
use crate::state::AppState;

/// Routes mounted at `/cabinets`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// DELETE /{id}                          -> delete
/// GET    /{id}/view                     -> view
/// GET    /{id}/shelves/{shelf}          -> view_shelf
/// GET    /by-letter/{letter}            -> list_by_letter
/// GET    /by-letter/{letter}/view       -> view_by_letter
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cabinet::list).post(cabinet::create))
        .route("/{id}", get(cabinet::get_by_id).delete(cabinet::delete))
        .route("/{id}/view", get(cabinet::view))
        .route("/{id}/shelves/{shelf}", get(cabinet::view_shelf))
        .route("/by-letter/{letter}", get(cabinet::list_by_letter))
        .route("/by-letter/{letter}/view", get(cabinet::view_by_letter))
}

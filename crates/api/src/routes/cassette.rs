//! Route definitions for the `/cassettes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cassette;
use crate::state::AppState;

/// Routes mounted at `/cassettes`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /search           -> search
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cassette::list).post(cassette::create))
        .route("/search", get(cassette::search))
        .route(
            "/{id}",
            get(cassette::get_by_id)
                .put(cassette::update)
                .delete(cassette::delete),
        )
}

pub mod cabinet;
pub mod cassette;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cabinets                                   list, create
/// /cabinets/{id}                              get, delete
/// /cabinets/{id}/view                         cabinet with shelf contents
/// /cabinets/{id}/shelves/{shelf}              one shelf
/// /cabinets/by-letter/{letter}                cabinets sharing a letter
/// /cabinets/by-letter/{letter}/view           their contents
///
/// /cassettes                                  list, add
/// /cassettes/search                           title / director search
/// /cassettes/{id}                             get, replace, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cabinets", cabinet::router())
        .nest("/cassettes", cassette::router())
}

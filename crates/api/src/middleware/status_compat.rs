//! Legacy status code compatibility.
//!
//! Existing clients expect every failure to come back as 400. With
//! `LEGACY_STATUS_CODES` enabled, error responses produced by
//! [`AppError`](crate::error::AppError) with status 404 or 409 are
//! rewritten to 400. The JSON body, including its `code`, is untouched.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ErrorCode;
use crate::state::AppState;

pub async fn legacy_status_codes(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if state.config.legacy_status_codes {
        downgrade(&mut response);
    }
    response
}

fn downgrade(response: &mut Response) {
    let rewrite = matches!(
        response.status(),
        StatusCode::NOT_FOUND | StatusCode::CONFLICT
    ) && response.extensions().get::<ErrorCode>().is_some();

    if rewrite {
        *response.status_mut() = StatusCode::BAD_REQUEST;
    }
}

//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::HttpError;
use crate::web::{cookie::session_id_from_headers, state::AppState};

/// Middleware that validates the session cookie.
///
/// If valid, inserts the session's `SessionSnapshot` into request extensions for
/// handlers to use. If missing, unknown or expired, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let session_id = session_id_from_headers(req.headers()).map(str::to_string);

    let snapshot = state
        .sessions
        .require_session(session_id.as_deref())
        .await?;

    req.extensions_mut().insert(snapshot);
    Ok(next.run(req).await)
}

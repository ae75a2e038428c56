//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::HttpError;
use crate::web::state::AppState;

/// Middleware that validates the bearer token and extracts the user_id.
///
/// If valid, inserts the user_id (`Uuid`) into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user_id = state.auth.authenticate(authorization)?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

//! services/api/src/web/middleware.rs
//!
//! Session middleware that ties every request to a player's session id.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use guessing_game_core::SessionId;
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::state::AppState;

/// Middleware that resolves the signed session cookie into a `SessionId`.
///
/// The id is inserted into request extensions for handlers to use. A missing
/// or badly signed cookie gets a freshly minted id, which is handed back to
/// the client through `Set-Cookie` on the response.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. Look for a valid cookie
    let existing = state.signer.read(req.headers());
    let is_new = existing.is_none();
    let session_id = existing.unwrap_or_else(SessionId::generate);
    if is_new {
        debug!(session = %session_id, "Issuing new session id");
    }

    // 2. Make the id available to handlers
    req.extensions_mut().insert(session_id.clone());

    // 3. Run the handler
    let mut response = next.run(req).await;

    // 4. Hand a new id to the client
    if is_new {
        match HeaderValue::from_str(&state.signer.set_cookie(&session_id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }

    response
}

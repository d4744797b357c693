//! Bearer token resolution middleware.
//!
//! Translates `Authorization: Bearer <token>` into an
//! `Extension<Option<Actor>>` for downstream handlers. This layer never
//! rejects a request: the best-effort badge endpoints answer
//! unauthenticated callers with zero snapshots, so whether a missing
//! actor is a 401 or a zero is the endpoint's call.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::api::types::{hash_token, Actor, ApiContext};
use crate::db::repository;

/// Resolve the caller's session token into an `Option<Actor>` request
/// extension.
pub async fn resolve_actor(
    State(ctx): State<ApiContext>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let actor = token.and_then(|token| lookup_actor(&ctx, &token));
    req.extensions_mut().insert(actor);
    next.run(req).await
}

/// Session lookup. Unknown tokens and lookup failures both resolve to
/// `None`; failures are logged, never surfaced here.
fn lookup_actor(ctx: &ApiContext, token: &str) -> Option<Actor> {
    let conn = match ctx.state.open_db() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!("actor resolution skipped, database unavailable: {e}");
            return None;
        }
    };
    match repository::resolve_session(&conn, &hash_token(token)) {
        Ok(Some(account)) => Some(Actor {
            id: account.id,
            role: account.role,
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("actor resolution failed: {e}");
            None
        }
    }
}

/// Endpoints that do require authentication call this on the extension.
pub fn require_actor(actor: Option<Actor>) -> Result<Actor, ApiError> {
    actor.ok_or(ApiError::Unauthorized)
}

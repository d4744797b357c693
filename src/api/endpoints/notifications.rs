//! Unread-notification endpoints.
//!
//! `/unread-counts` and `/my-chat/unread` are the best-effort pair:
//! they always answer 200 and degrade to the empty snapshot when the
//! caller is unauthenticated or a recount fails (failures are logged
//! server-side). `/operator-chat/unread` is the strict variant and
//! reports authentication, authorization, and data failures honestly.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::middleware::auth::require_actor;
use crate::api::types::{Actor, ApiContext};
use crate::db::repository;
use crate::models::Role;
use crate::notify::counts::{self, UnreadCounts};

/// `GET /unread-counts` — role-scoped badge snapshot.
pub async fn unread_counts(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
) -> Json<UnreadCounts> {
    let Some(actor) = actor else {
        return Json(UnreadCounts::ZERO);
    };
    let snapshot = match ctx.state.open_db() {
        Ok(conn) => counts::unread_counts_or_zero(&conn, actor.id, actor.role),
        Err(e) => {
            tracing::warn!("unread recount skipped, database unavailable: {e}");
            UnreadCounts::ZERO
        }
    };
    Json(snapshot)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyChatUnread {
    pub has_unread: bool,
}

/// `GET /my-chat/unread` — does the calling patient's chat hold an
/// unread staff reply?
///
/// Always 200, `false` for anyone who is not an authenticated patient.
/// Badge pollers need live flags, so the response disables caching at
/// every layer, HTTP/1.0 proxies included.
pub async fn my_chat_unread(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
) -> Response {
    let has_unread = match actor {
        Some(actor) if actor.role == Role::Patient => match ctx.state.open_db() {
            Ok(conn) => {
                repository::has_patient_chat_unread(&conn, actor.id).unwrap_or_else(|e| {
                    tracing::warn!("chat unread check failed, serving false: {e}");
                    false
                })
            }
            Err(e) => {
                tracing::warn!("chat unread check skipped, database unavailable: {e}");
                false
            }
        },
        _ => false,
    };
    no_cache_json(&MyChatUnread { has_unread })
}

#[derive(Serialize)]
pub struct OperatorChatUnread {
    pub count: i64,
}

/// `GET /operator-chat/unread` — number of chats awaiting the desk.
pub async fn operator_chat_unread(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
) -> Result<Json<OperatorChatUnread>, ApiError> {
    let actor = require_actor(actor)?;
    if !actor.role.is_staff() {
        return Err(ApiError::Forbidden("Operator chat is staff-only".into()));
    }

    let conn = ctx.state.open_db()?;
    let count = repository::count_chats_unread_by_operator(&conn)?;
    Ok(Json(OperatorChatUnread { count }))
}

/// Serialize to JSON with the full set of cache-disabling headers.
fn no_cache_json<T: Serialize>(value: &T) -> Response {
    let body = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate")
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0")
        .body(axum::body::Body::from(body))
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
        })
}

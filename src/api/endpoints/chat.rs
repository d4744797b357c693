//! Chat endpoints.
//!
//! Patients talk through `/my-chat` (their single support chat, created
//! on first message); staff answer through `/chats/{id}`. Posting a
//! message raises exactly the other audience's unread flag; opening
//! clears exactly the opener's.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::auth::require_actor;
use crate::api::types::{Actor, ApiContext};
use crate::db::repository;
use crate::models::{Chat, ChatMessage, Role};

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct ChatView {
    pub chat: Chat,
    pub messages: Vec<ChatMessage>,
}

/// `POST /my-chat/messages` — patient posts into their own chat.
///
/// Creates the chat on first use; a message into a closed chat reopens
/// it as waiting.
pub async fn post_my_message(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let actor = require_actor(actor)?;
    if actor.role != Role::Patient {
        return Err(ApiError::Forbidden("Only patients post to my-chat".into()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Message body is empty".into()));
    }

    let conn = ctx.state.open_db()?;
    let message = repository::post_patient_message(&conn, actor.id, &req.body)?;
    Ok(Json(message))
}

/// `POST /my-chat/open` — patient acknowledges their chat.
///
/// Clears the patient-side unread flag and returns the thread. A
/// patient who never wrote anything has no chat yet and gets 404.
pub async fn open_my_chat(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
) -> Result<Json<ChatView>, ApiError> {
    let actor = require_actor(actor)?;
    if actor.role != Role::Patient {
        return Err(ApiError::Forbidden("Only patients open my-chat".into()));
    }

    let conn = ctx.state.open_db()?;
    repository::open_chat_as_patient(&conn, actor.id)?;
    let chat = repository::get_chat_by_patient(&conn, actor.id)?
        .ok_or_else(|| ApiError::NotFound("You have no chat yet".into()))?;
    let messages = repository::list_chat_messages(&conn, chat.id)?;
    Ok(Json(ChatView { chat, messages }))
}

/// `POST /chats/:id/messages` — staff reply into a patient's chat.
pub async fn post_staff_reply(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Path(chat_id): Path<i64>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let actor = require_actor(actor)?;
    if !actor.role.is_staff() {
        return Err(ApiError::Forbidden("Replying to chats is staff-only".into()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Message body is empty".into()));
    }

    let conn = ctx.state.open_db()?;
    let message = repository::post_staff_message(&conn, chat_id, actor.id, &req.body)?;
    Ok(Json(message))
}

/// `POST /chats/:id/open` — staff acknowledge a chat and load it.
pub async fn open_as_staff(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Path(chat_id): Path<i64>,
) -> Result<Json<ChatView>, ApiError> {
    let actor = require_actor(actor)?;
    if !actor.role.is_staff() {
        return Err(ApiError::Forbidden("Opening chats is staff-only".into()));
    }

    let conn = ctx.state.open_db()?;
    repository::open_chat_as_staff(&conn, chat_id)?;
    let chat = repository::get_chat(&conn, chat_id)?;
    let messages = repository::list_chat_messages(&conn, chat_id)?;
    Ok(Json(ChatView { chat, messages }))
}

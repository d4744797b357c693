//! Letter endpoints.
//!
//! Letters are the formal channel: a patient writes to a recipient desk
//! (operator desk or chief doctor), anyone involved can reply, and each
//! side's unread flag is cleared only by that side opening the letter.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::auth::require_actor;
use crate::api::types::{Actor, ApiContext};
use crate::db::repository;
use crate::models::{Letter, LetterRecipient, LetterReply, Role, Sender};

#[derive(Deserialize)]
pub struct SubmitLetterRequest {
    pub recipient: LetterRecipient,
    pub subject: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct LetterView {
    pub letter: Letter,
    pub replies: Vec<LetterReply>,
}

/// `POST /letters` — patient submits a new letter.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Json(req): Json<SubmitLetterRequest>,
) -> Result<Json<Letter>, ApiError> {
    let actor = require_actor(actor)?;
    if actor.role != Role::Patient {
        return Err(ApiError::Forbidden("Only patients submit letters".into()));
    }
    if req.subject.trim().is_empty() {
        return Err(ApiError::BadRequest("Letter subject is empty".into()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Letter body is empty".into()));
    }

    let conn = ctx.state.open_db()?;
    let letter =
        repository::submit_letter(&conn, actor.id, req.recipient, &req.subject, &req.body)?;
    Ok(Json(letter))
}

/// `POST /letters/:id/replies` — reply to a letter.
///
/// Patients may only reply to letters they wrote; any staff member may
/// reply to any letter.
pub async fn reply(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Path(letter_id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<LetterReply>, ApiError> {
    let actor = require_actor(actor)?;
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Reply body is empty".into()));
    }

    let conn = ctx.state.open_db()?;
    let letter = repository::get_letter(&conn, letter_id)?;
    let sender = if actor.role == Role::Patient {
        if letter.patient_id != actor.id {
            return Err(ApiError::Forbidden(
                "You can only reply to your own letters".into(),
            ));
        }
        Sender::Patient
    } else {
        Sender::Staff
    };

    let posted = repository::reply_to_letter(&conn, letter_id, sender, actor.id, &req.body)?;
    Ok(Json(posted))
}

/// `POST /letters/:id/open` — open a letter, clearing the reader's side.
///
/// Patients can only open their own letters; a letter owned by someone
/// else looks like it does not exist.
pub async fn open(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Path(letter_id): Path<i64>,
) -> Result<Json<LetterView>, ApiError> {
    let actor = require_actor(actor)?;

    let conn = ctx.state.open_db()?;
    if actor.role == Role::Patient {
        repository::open_letter_as_patient(&conn, letter_id, actor.id)?;
    } else {
        repository::open_letter_as_staff(&conn, letter_id)?;
    }

    let letter = repository::get_letter(&conn, letter_id)?;
    let replies = repository::list_letter_replies(&conn, letter_id)?;
    Ok(Json(LetterView { letter, replies }))
}

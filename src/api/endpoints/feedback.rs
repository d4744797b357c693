//! Feedback endpoints.
//!
//! Submission is public: visitors leave feedback without an account, so
//! there is no actor check on the way in. Triage is restricted to the
//! roles that work the feedback queue.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::middleware::auth::require_actor;
use crate::api::types::{Actor, ApiContext};
use crate::db::repository;
use crate::models::Feedback;

#[derive(Deserialize)]
pub struct SubmitFeedbackRequest {
    pub author_name: String,
    pub contact: Option<String>,
    pub body: String,
}

/// `POST /feedback` — leave feedback, no account needed.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<Json<Feedback>, ApiError> {
    if req.author_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Author name is empty".into()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Feedback body is empty".into()));
    }

    let conn = ctx.state.open_db()?;
    let feedback = repository::submit_feedback(
        &conn,
        &req.author_name,
        req.contact.as_deref().unwrap_or_default(),
        &req.body,
    )?;
    Ok(Json(feedback))
}

/// `POST /feedback/:id/seen` — mark one feedback entry as handled.
pub async fn mark_seen(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Option<Actor>>,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Feedback>, ApiError> {
    let actor = require_actor(actor)?;
    if !actor.role.triages_feedback() {
        return Err(ApiError::Forbidden(
            "Feedback triage is for operators and admins".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    repository::mark_feedback_seen(&conn, feedback_id)?;
    let feedback = repository::get_feedback(&conn, feedback_id)?;
    Ok(Json(feedback))
}

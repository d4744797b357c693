//! Badge recounts per viewer role.
//!
//! Three independent COUNT queries, one per entity kind, each over that
//! kind's audience-scoped unread predicate. Nothing is joined and nothing
//! is cached: a snapshot always reflects flag state at query time.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{repository, DatabaseError};
use crate::models::{LetterRecipient, Role};

/// One badge snapshot. All fields non-negative full recounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounts {
    pub feedbacks: i64,
    pub letters: i64,
    pub chats: i64,
}

impl UnreadCounts {
    pub const ZERO: UnreadCounts = UnreadCounts {
        feedbacks: 0,
        letters: 0,
        chats: 0,
    };
}

/// Recount unread entities visible to this viewer. Pure read.
///
/// - Patients see their own letters and their single chat (closed chats
///   stop counting); the feedback queue is staff-only.
/// - Operators see their desk's letters, every flagged chat, and the
///   feedback queue.
/// - Admins see the same as operators but letters for every desk.
/// - The chief doctor sees letters addressed to them and flagged chats;
///   feedback triage stays with the operator desk.
pub fn unread_counts(
    conn: &Connection,
    viewer_id: i64,
    role: Role,
) -> Result<UnreadCounts, DatabaseError> {
    let counts = match role {
        Role::Patient => UnreadCounts {
            feedbacks: 0,
            letters: repository::count_letters_unread_by_patient(conn, viewer_id)?,
            chats: repository::has_patient_chat_unread(conn, viewer_id)? as i64,
        },
        Role::Operator => UnreadCounts {
            feedbacks: repository::count_unseen_feedback(conn)?,
            letters: repository::count_letters_unread_by_staff(
                conn,
                Some(LetterRecipient::Operator),
            )?,
            chats: repository::count_chats_unread_by_operator(conn)?,
        },
        Role::Admin => UnreadCounts {
            feedbacks: repository::count_unseen_feedback(conn)?,
            letters: repository::count_letters_unread_by_staff(conn, None)?,
            chats: repository::count_chats_unread_by_operator(conn)?,
        },
        Role::ChiefDoctor => UnreadCounts {
            feedbacks: 0,
            letters: repository::count_letters_unread_by_staff(
                conn,
                Some(LetterRecipient::ChiefDoctor),
            )?,
            chats: repository::count_chats_unread_by_operator(conn)?,
        },
    };
    Ok(counts)
}

/// The degrade-to-zero policy for best-effort badge surfaces.
///
/// A failed recount is logged and served as an empty badge; the caller
/// never sees the error. Explicit fetch endpoints that must report
/// failures use [`unread_counts`] directly instead.
pub fn unread_counts_or_zero(conn: &Connection, viewer_id: i64, role: Role) -> UnreadCounts {
    match unread_counts(conn, viewer_id, role) {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!("unread recount failed, serving zero counts: {e}");
            UnreadCounts::ZERO
        }
    }
}

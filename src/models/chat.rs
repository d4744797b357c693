use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{ChatStatus, Sender};

/// A patient's single support chat with the operator desk.
///
/// The two unread flags are audience-scoped and independent: an inbound
/// patient message raises `unread_by_operator`, a staff message raises
/// `unread_by_patient`, and opening the chat clears only the opener's flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub patient_id: i64,
    pub status: ChatStatus,
    pub unread_by_operator: bool,
    pub unread_by_patient: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: i64,
    pub sender: Sender,
    pub sender_id: i64,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

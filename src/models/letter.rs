use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{LetterRecipient, Sender};

/// A patient letter addressed to the operator desk or the chief doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letter {
    pub id: i64,
    pub patient_id: i64,
    pub recipient: LetterRecipient,
    pub subject: String,
    pub body: String,
    pub unread_by_staff: bool,
    pub unread_by_patient: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterReply {
    pub id: i64,
    pub letter_id: i64,
    pub sender: Sender,
    pub sender_id: i64,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

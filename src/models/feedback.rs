use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A public feedback-form submission, unseen until staff triage it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub author_name: String,
    pub contact: String,
    pub body: String,
    pub unseen: bool,
    pub created_at: NaiveDateTime,
}

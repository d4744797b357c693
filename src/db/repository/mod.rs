//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed connection; one sub-module per entity.
//! All public functions are re-exported here.

mod account;
mod chat;
mod feedback;
mod letter;

use chrono::NaiveDateTime;

// Re-export all public items from sub-modules
pub use account::*;
pub use chat::*;
pub use feedback::*;
pub use letter::*;

/// Parse a SQLite datetime() string; epoch on malformed input.
fn parse_datetime(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    /// A full patient/operator exchange. At every step exactly one
    /// audience flag moves; the other side's flag is untouched.
    #[test]
    fn chat_exchange_moves_one_flag_per_event() {
        let conn = test_db();
        let patient = create_account(&conn, "ivanova", "Anna", Role::Patient).unwrap();
        let operator = create_account(&conn, "desk", "Desk", Role::Operator).unwrap();

        // Patient writes: operator side lights up, patient side dark.
        post_patient_message(&conn, patient.id, "I need a certificate").unwrap();
        let chat = get_chat_by_patient(&conn, patient.id).unwrap().unwrap();
        assert!(chat.unread_by_operator && !chat.unread_by_patient);

        // Operator opens: their flag clears, nothing else changes.
        open_chat_as_staff(&conn, chat.id).unwrap();
        let chat = get_chat(&conn, chat.id).unwrap();
        assert!(!chat.unread_by_operator && !chat.unread_by_patient);

        // Operator replies: patient side lights up, operator side stays dark.
        post_staff_message(&conn, chat.id, operator.id, "Ready for pickup").unwrap();
        let chat = get_chat(&conn, chat.id).unwrap();
        assert!(!chat.unread_by_operator && chat.unread_by_patient);
        assert_eq!(chat.status, ChatStatus::Active);

        // Patient opens: their flag clears.
        open_chat_as_patient(&conn, patient.id).unwrap();
        let chat = get_chat(&conn, chat.id).unwrap();
        assert!(!chat.unread_by_operator && !chat.unread_by_patient);
    }

    #[test]
    fn letter_exchange_moves_one_flag_per_event() {
        let conn = test_db();
        let patient = create_account(&conn, "petrov", "Boris", Role::Patient).unwrap();
        let chief = create_account(&conn, "chief", "Chief", Role::ChiefDoctor).unwrap();

        let letter = submit_letter(
            &conn,
            patient.id,
            LetterRecipient::ChiefDoctor,
            "Complaint",
            "About the waiting room",
        )
        .unwrap();
        assert!(letter.unread_by_staff && !letter.unread_by_patient);

        open_letter_as_staff(&conn, letter.id).unwrap();
        reply_to_letter(&conn, letter.id, Sender::Staff, chief.id, "We will fix it").unwrap();
        let letter = get_letter(&conn, letter.id).unwrap();
        assert!(!letter.unread_by_staff && letter.unread_by_patient);

        open_letter_as_patient(&conn, letter.id, patient.id).unwrap();
        let letter = get_letter(&conn, letter.id).unwrap();
        assert!(!letter.unread_by_staff && !letter.unread_by_patient);
    }

    #[test]
    fn badges_across_kinds_never_double_count() {
        let conn = test_db();
        let patient = create_account(&conn, "p", "P", Role::Patient).unwrap();
        post_patient_message(&conn, patient.id, "chat ping").unwrap();
        submit_letter(&conn, patient.id, LetterRecipient::Operator, "L", "t").unwrap();
        submit_feedback(&conn, "Guest", "", "feedback text").unwrap();

        assert_eq!(count_chats_unread_by_operator(&conn).unwrap(), 1);
        assert_eq!(count_letters_unread_by_staff(&conn, None).unwrap(), 1);
        assert_eq!(count_unseen_feedback(&conn).unwrap(), 1);
    }

    #[test]
    fn parse_datetime_falls_back_on_garbage() {
        assert_eq!(
            super::parse_datetime("not a date"),
            NaiveDateTime::default()
        );
        let parsed = super::parse_datetime("2025-03-01 10:30:00");
        assert_eq!(parsed.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-03-01 10:30:00");
    }
}

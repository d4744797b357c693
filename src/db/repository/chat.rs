use std::str::FromStr;

use rusqlite::{params, Connection};

use super::account::get_account;
use super::parse_datetime;
use crate::db::DatabaseError;
use crate::models::{Chat, ChatMessage, ChatStatus, Role, Sender};

/// Find or create the patient's single support chat.
pub fn ensure_chat_for_patient(conn: &Connection, patient_id: i64) -> Result<Chat, DatabaseError> {
    if let Some(chat) = get_chat_by_patient(conn, patient_id)? {
        return Ok(chat);
    }
    let account = get_account(conn, patient_id)?;
    if account.role != Role::Patient {
        return Err(DatabaseError::ConstraintViolation(format!(
            "chat owner must have the patient role, got {}",
            account.role.as_str()
        )));
    }
    insert_chat_row(conn, patient_id)
}

/// Two first posts can race on the patient_id UNIQUE constraint;
/// OR IGNORE lets the loser reuse the winner's row.
fn insert_chat_row(conn: &Connection, patient_id: i64) -> Result<Chat, DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO chats (patient_id) VALUES (?1)",
        [patient_id],
    )?;
    get_chat_by_patient(conn, patient_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "chat".into(),
        id: patient_id.to_string(),
    })
}

/// Fetch a chat by id.
pub fn get_chat(conn: &Connection, id: i64) -> Result<Chat, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, status, unread_by_operator, unread_by_patient,
                created_at, updated_at
         FROM chats WHERE id = ?1",
    )?;
    match stmt.query_row([id], map_chat_columns) {
        Ok(parts) => chat_from_parts(parts),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "chat".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Fetch a patient's chat if one exists.
pub fn get_chat_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<Chat>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, status, unread_by_operator, unread_by_patient,
                created_at, updated_at
         FROM chats WHERE patient_id = ?1",
    )?;
    match stmt.query_row([patient_id], map_chat_columns) {
        Ok(parts) => Ok(Some(chat_from_parts(parts)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

// ──────────────────────────────────────────────
// Message flow — each insert raises exactly one
// audience flag, never both
// ──────────────────────────────────────────────

/// Insert a patient message into the patient's own chat.
///
/// Raises only `unread_by_operator`. A closed chat reopens as waiting so
/// the operator desk sees it again.
pub fn post_patient_message(
    conn: &Connection,
    patient_id: i64,
    body: &str,
) -> Result<ChatMessage, DatabaseError> {
    let chat = ensure_chat_for_patient(conn, patient_id)?;
    conn.execute(
        "INSERT INTO chat_messages (chat_id, sender, sender_id, body)
         VALUES (?1, 'patient', ?2, ?3)",
        params![chat.id, patient_id, body],
    )?;
    let message_id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE chats SET unread_by_operator = 1,
                status = CASE WHEN status = 'closed' THEN 'waiting' ELSE status END,
                updated_at = datetime('now')
         WHERE id = ?1",
        [chat.id],
    )?;
    get_chat_message(conn, message_id)
}

/// Insert a staff reply into a chat.
///
/// Raises only `unread_by_patient` and moves the chat to active.
pub fn post_staff_message(
    conn: &Connection,
    chat_id: i64,
    staff_id: i64,
    body: &str,
) -> Result<ChatMessage, DatabaseError> {
    let chat = get_chat(conn, chat_id)?;
    conn.execute(
        "INSERT INTO chat_messages (chat_id, sender, sender_id, body)
         VALUES (?1, 'staff', ?2, ?3)",
        params![chat.id, staff_id, body],
    )?;
    let message_id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE chats SET unread_by_patient = 1, status = 'active',
                updated_at = datetime('now')
         WHERE id = ?1",
        [chat.id],
    )?;
    get_chat_message(conn, message_id)
}

/// Staff opened a chat: clear the operator-side flag, nothing else.
pub fn open_chat_as_staff(conn: &Connection, chat_id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE chats SET unread_by_operator = 0 WHERE id = ?1",
        [chat_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "chat".into(),
            id: chat_id.to_string(),
        });
    }
    Ok(())
}

/// Patient opened their chat: clear the patient-side flag.
/// A patient with no chat yet has nothing to clear; that is not an error.
pub fn open_chat_as_patient(conn: &Connection, patient_id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE chats SET unread_by_patient = 0 WHERE patient_id = ?1",
        [patient_id],
    )?;
    Ok(())
}

/// Fetch a single message by id.
pub fn get_chat_message(conn: &Connection, id: i64) -> Result<ChatMessage, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, chat_id, sender, sender_id, body, sent_at
         FROM chat_messages WHERE id = ?1",
    )?;
    match stmt.query_row([id], map_message_columns) {
        Ok(parts) => message_from_parts(parts),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "chat_message".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// All messages of a chat in insertion order.
pub fn list_chat_messages(
    conn: &Connection,
    chat_id: i64,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, chat_id, sender, sender_id, body, sent_at
         FROM chat_messages WHERE chat_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([chat_id], map_message_columns)?;
    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_parts(row?)?);
    }
    Ok(messages)
}

// ──────────────────────────────────────────────
// Badge queries
// ──────────────────────────────────────────────

/// Operator-side badge: chats holding a message the desk has not read yet.
pub fn count_chats_unread_by_operator(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM chats WHERE unread_by_operator = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Whether the patient's own chat holds unread staff replies.
/// A closed chat stops counting toward the badge.
pub fn has_patient_chat_unread(conn: &Connection, patient_id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM chats
         WHERE patient_id = ?1 AND unread_by_patient = 1
           AND status IN ('waiting', 'active')",
        [patient_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

type ChatParts = (i64, i64, String, i64, i64, String, String);

fn map_chat_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn chat_from_parts(parts: ChatParts) -> Result<Chat, DatabaseError> {
    let (id, patient_id, status, unread_op, unread_pat, created_at, updated_at) = parts;
    Ok(Chat {
        id,
        patient_id,
        status: ChatStatus::from_str(&status)?,
        unread_by_operator: unread_op != 0,
        unread_by_patient: unread_pat != 0,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

type MessageParts = (i64, i64, String, i64, String, String);

fn map_message_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn message_from_parts(parts: MessageParts) -> Result<ChatMessage, DatabaseError> {
    let (id, chat_id, sender, sender_id, body, sent_at) = parts;
    Ok(ChatMessage {
        id,
        chat_id,
        sender: Sender::from_str(&sender)?,
        sender_id,
        body,
        sent_at: parse_datetime(&sent_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::account::create_account;
    use crate::db::sqlite::open_memory_database;

    fn setup_db() -> Connection {
        open_memory_database().expect("in-memory DB should open")
    }

    fn make_patient(conn: &Connection, username: &str) -> i64 {
        create_account(conn, username, "Test Patient", Role::Patient)
            .unwrap()
            .id
    }

    #[test]
    fn ensure_chat_is_idempotent() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        let first = ensure_chat_for_patient(&conn, patient).unwrap();
        let second = ensure_chat_for_patient(&conn, patient).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.status, ChatStatus::Waiting);
    }

    #[test]
    fn racing_chat_creation_reuses_the_existing_row() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");

        // Both writers passed the existence check before either inserted.
        let winner = insert_chat_row(&conn, patient).unwrap();
        let loser = insert_chat_row(&conn, patient).unwrap();

        assert_eq!(winner.id, loser.id);
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn chat_owner_must_be_patient() {
        let conn = setup_db();
        let operator = create_account(&conn, "op", "Operator", Role::Operator)
            .unwrap()
            .id;
        let result = ensure_chat_for_patient(&conn, operator);
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn patient_message_raises_only_operator_flag() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        post_patient_message(&conn, patient, "hello?").unwrap();

        let chat = get_chat_by_patient(&conn, patient).unwrap().unwrap();
        assert!(chat.unread_by_operator);
        assert!(!chat.unread_by_patient);
    }

    #[test]
    fn staff_message_raises_only_patient_flag_and_activates() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        let staff = create_account(&conn, "op", "Operator", Role::Operator)
            .unwrap()
            .id;
        let chat = ensure_chat_for_patient(&conn, patient).unwrap();

        post_staff_message(&conn, chat.id, staff, "how can we help?").unwrap();

        let chat = get_chat(&conn, chat.id).unwrap();
        assert!(!chat.unread_by_operator);
        assert!(chat.unread_by_patient);
        assert_eq!(chat.status, ChatStatus::Active);
    }

    #[test]
    fn open_as_staff_clears_only_operator_flag() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        let staff = create_account(&conn, "op", "Operator", Role::Operator)
            .unwrap()
            .id;
        post_patient_message(&conn, patient, "ping").unwrap();
        let chat = get_chat_by_patient(&conn, patient).unwrap().unwrap();
        post_staff_message(&conn, chat.id, staff, "pong").unwrap();

        open_chat_as_staff(&conn, chat.id).unwrap();

        let chat = get_chat(&conn, chat.id).unwrap();
        assert!(!chat.unread_by_operator);
        assert!(chat.unread_by_patient, "patient flag must survive a staff open");
    }

    #[test]
    fn open_missing_chat_as_staff_is_not_found() {
        let conn = setup_db();
        let result = open_chat_as_staff(&conn, 999);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn open_as_patient_without_chat_is_noop() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        assert!(open_chat_as_patient(&conn, patient).is_ok());
    }

    #[test]
    fn closed_chat_reopens_as_waiting_on_patient_message() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        let chat = ensure_chat_for_patient(&conn, patient).unwrap();
        conn.execute("UPDATE chats SET status = 'closed' WHERE id = ?1", [chat.id])
            .unwrap();

        post_patient_message(&conn, patient, "are you still there?").unwrap();

        let chat = get_chat(&conn, chat.id).unwrap();
        assert_eq!(chat.status, ChatStatus::Waiting);
        assert!(chat.unread_by_operator);
    }

    #[test]
    fn messages_listed_in_insertion_order() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        post_patient_message(&conn, patient, "first").unwrap();
        post_patient_message(&conn, patient, "second").unwrap();

        let chat = get_chat_by_patient(&conn, patient).unwrap().unwrap();
        let messages = list_chat_messages(&conn, chat.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body, "first");
        assert_eq!(messages[1].body, "second");
        assert_eq!(messages[0].sender, Sender::Patient);
    }

    #[test]
    fn operator_badge_counts_flagged_chats_once() {
        let conn = setup_db();
        let p1 = make_patient(&conn, "p1");
        let p2 = make_patient(&conn, "p2");
        post_patient_message(&conn, p1, "one").unwrap();
        post_patient_message(&conn, p1, "two").unwrap();
        post_patient_message(&conn, p2, "three").unwrap();

        // Two chats flagged, not three messages
        assert_eq!(count_chats_unread_by_operator(&conn).unwrap(), 2);
    }

    #[test]
    fn closed_chat_excluded_from_patient_badge() {
        let conn = setup_db();
        let patient = make_patient(&conn, "p1");
        let staff = create_account(&conn, "op", "Operator", Role::Operator)
            .unwrap()
            .id;
        let chat = ensure_chat_for_patient(&conn, patient).unwrap();
        post_staff_message(&conn, chat.id, staff, "reply").unwrap();
        assert!(has_patient_chat_unread(&conn, patient).unwrap());

        conn.execute("UPDATE chats SET status = 'closed' WHERE id = ?1", [chat.id])
            .unwrap();
        assert!(!has_patient_chat_unread(&conn, patient).unwrap());
    }
}

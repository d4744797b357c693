use std::str::FromStr;

use rusqlite::{params, Connection};

use super::parse_datetime;
use crate::db::DatabaseError;
use crate::models::{Letter, LetterRecipient, LetterReply, Sender};

/// Create a letter from a patient. Starts unread for the staff side.
pub fn submit_letter(
    conn: &Connection,
    patient_id: i64,
    recipient: LetterRecipient,
    subject: &str,
    body: &str,
) -> Result<Letter, DatabaseError> {
    conn.execute(
        "INSERT INTO letters (patient_id, recipient, subject, body)
         VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, recipient.as_str(), subject, body],
    )?;
    get_letter(conn, conn.last_insert_rowid())
}

/// Fetch a letter by id.
pub fn get_letter(conn: &Connection, id: i64) -> Result<Letter, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, recipient, subject, body, unread_by_staff,
                unread_by_patient, created_at, updated_at
         FROM letters WHERE id = ?1",
    )?;
    match stmt.query_row([id], map_letter_columns) {
        Ok(parts) => letter_from_parts(parts),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "letter".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Append a reply to a letter. Raises exactly the other party's flag:
/// a patient reply flags the staff side, a staff reply flags the patient.
pub fn reply_to_letter(
    conn: &Connection,
    letter_id: i64,
    sender: Sender,
    sender_id: i64,
    body: &str,
) -> Result<LetterReply, DatabaseError> {
    let letter = get_letter(conn, letter_id)?;
    conn.execute(
        "INSERT INTO letter_replies (letter_id, sender, sender_id, body)
         VALUES (?1, ?2, ?3, ?4)",
        params![letter.id, sender.as_str(), sender_id, body],
    )?;
    let reply_id = conn.last_insert_rowid();
    let flag_update = match sender {
        Sender::Patient => "UPDATE letters SET unread_by_staff = 1, updated_at = datetime('now') WHERE id = ?1",
        Sender::Staff => "UPDATE letters SET unread_by_patient = 1, updated_at = datetime('now') WHERE id = ?1",
    };
    conn.execute(flag_update, [letter.id])?;
    get_letter_reply(conn, reply_id)
}

/// Fetch a single reply by id.
pub fn get_letter_reply(conn: &Connection, id: i64) -> Result<LetterReply, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, letter_id, sender, sender_id, body, sent_at
         FROM letter_replies WHERE id = ?1",
    )?;
    match stmt.query_row([id], map_reply_columns) {
        Ok(parts) => reply_from_parts(parts),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "letter_reply".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// All replies of a letter in insertion order.
pub fn list_letter_replies(
    conn: &Connection,
    letter_id: i64,
) -> Result<Vec<LetterReply>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, letter_id, sender, sender_id, body, sent_at
         FROM letter_replies WHERE letter_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([letter_id], map_reply_columns)?;
    let mut replies = Vec::new();
    for row in rows {
        replies.push(reply_from_parts(row?)?);
    }
    Ok(replies)
}

/// Staff opened a letter: clear the staff-side flag.
pub fn open_letter_as_staff(conn: &Connection, letter_id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE letters SET unread_by_staff = 0 WHERE id = ?1",
        [letter_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "letter".into(),
            id: letter_id.to_string(),
        });
    }
    Ok(())
}

/// Patient opened one of their letters: clear the patient-side flag.
/// Scoped to the owning patient so one patient cannot touch another's letter.
pub fn open_letter_as_patient(
    conn: &Connection,
    letter_id: i64,
    patient_id: i64,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE letters SET unread_by_patient = 0 WHERE id = ?1 AND patient_id = ?2",
        params![letter_id, patient_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "letter".into(),
            id: letter_id.to_string(),
        });
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Badge queries
// ──────────────────────────────────────────────

/// Staff-side badge. A recipient narrows the count to one desk
/// (operator or chief doctor); None counts every staff-unread letter.
pub fn count_letters_unread_by_staff(
    conn: &Connection,
    recipient: Option<LetterRecipient>,
) -> Result<i64, DatabaseError> {
    let count = match recipient {
        Some(recipient) => conn.query_row(
            "SELECT COUNT(*) FROM letters WHERE unread_by_staff = 1 AND recipient = ?1",
            [recipient.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM letters WHERE unread_by_staff = 1",
            [],
            |row| row.get(0),
        )?,
    };
    Ok(count)
}

/// Patient-side badge: this patient's letters holding unread staff replies.
pub fn count_letters_unread_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM letters WHERE patient_id = ?1 AND unread_by_patient = 1",
        [patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

type LetterParts = (i64, i64, String, String, String, i64, i64, String, String);

fn map_letter_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<LetterParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn letter_from_parts(parts: LetterParts) -> Result<Letter, DatabaseError> {
    let (id, patient_id, recipient, subject, body, unread_staff, unread_pat, created_at, updated_at) =
        parts;
    Ok(Letter {
        id,
        patient_id,
        recipient: LetterRecipient::from_str(&recipient)?,
        subject,
        body,
        unread_by_staff: unread_staff != 0,
        unread_by_patient: unread_pat != 0,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

type ReplyParts = (i64, i64, String, i64, String, String);

fn map_reply_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReplyParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn reply_from_parts(parts: ReplyParts) -> Result<LetterReply, DatabaseError> {
    let (id, letter_id, sender, sender_id, body, sent_at) = parts;
    Ok(LetterReply {
        id,
        letter_id,
        sender: Sender::from_str(&sender)?,
        sender_id,
        body,
        sent_at: parse_datetime(&sent_at),
    })
}

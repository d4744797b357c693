use rusqlite::{params, Connection};

use super::parse_datetime;
use crate::db::DatabaseError;
use crate::models::Feedback;

/// Store a public feedback-form submission. Starts unseen.
pub fn submit_feedback(
    conn: &Connection,
    author_name: &str,
    contact: &str,
    body: &str,
) -> Result<Feedback, DatabaseError> {
    conn.execute(
        "INSERT INTO feedback (author_name, contact, body) VALUES (?1, ?2, ?3)",
        params![author_name, contact, body],
    )?;
    get_feedback(conn, conn.last_insert_rowid())
}

/// Fetch a feedback entry by id.
pub fn get_feedback(conn: &Connection, id: i64) -> Result<Feedback, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, author_name, contact, body, unseen, created_at
         FROM feedback WHERE id = ?1",
    )?;
    match stmt.query_row([id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
        ))
    }) {
        Ok((id, author_name, contact, body, unseen, created_at)) => Ok(Feedback {
            id,
            author_name,
            contact,
            body,
            unseen: unseen != 0,
            created_at: parse_datetime(&created_at),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "feedback".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Staff reviewed an entry: drop it from the unseen badge.
pub fn mark_feedback_seen(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("UPDATE feedback SET unseen = 0 WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "feedback".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Badge query: submissions nobody has looked at yet.
pub fn count_unseen_feedback(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM feedback WHERE unseen = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

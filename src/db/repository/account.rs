use std::str::FromStr;

use rusqlite::{params, Connection};

use super::parse_datetime;
use crate::db::DatabaseError;
use crate::models::{Account, Role};

/// Create an account. Usernames are unique; the caller picks the role.
pub fn create_account(
    conn: &Connection,
    username: &str,
    display_name: &str,
    role: Role,
) -> Result<Account, DatabaseError> {
    conn.execute(
        "INSERT INTO accounts (username, display_name, role) VALUES (?1, ?2, ?3)",
        params![username, display_name, role.as_str()],
    )?;
    get_account(conn, conn.last_insert_rowid())
}

/// Fetch an account by id.
pub fn get_account(conn: &Connection, id: i64) -> Result<Account, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, display_name, role, created_at FROM accounts WHERE id = ?1",
    )?;
    match stmt.query_row([id], map_account_columns) {
        Ok(parts) => account_from_parts(parts),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "account".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

// ──────────────────────────────────────────────
// Sessions
// ──────────────────────────────────────────────

/// Store a session row for an account.
///
/// Tokens are stored as SHA-256 hex digests, never in the clear; hashing
/// happens at the API layer before the value reaches this function.
pub fn create_session(
    conn: &Connection,
    account_id: i64,
    token_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, account_id) VALUES (?1, ?2)",
        params![token_hash, account_id],
    )?;
    Ok(())
}

/// Resolve a token hash to its account. Returns None for unknown tokens.
pub fn resolve_session(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<Account>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.username, a.display_name, a.role, a.created_at
         FROM sessions s JOIN accounts a ON a.id = s.account_id
         WHERE s.token_hash = ?1",
    )?;
    match stmt.query_row([token_hash], map_account_columns) {
        Ok(parts) => Ok(Some(account_from_parts(parts)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Drop a session. Unknown hashes are a no-op.
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM sessions WHERE token_hash = ?1", [token_hash])?;
    Ok(())
}

type AccountParts = (i64, String, String, String, String);

fn map_account_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn account_from_parts(parts: AccountParts) -> Result<Account, DatabaseError> {
    let (id, username, display_name, role, created_at) = parts;
    Ok(Account {
        id,
        username,
        display_name,
        role: Role::from_str(&role)?,
        created_at: parse_datetime(&created_at),
    })
}

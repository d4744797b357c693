//! Shared application state.
//!
//! `ClinicState` is wrapped in `Arc` at startup and handed to the axum
//! router. Handlers open a short-lived connection per request; SQLite
//! serializes writers and every flag mutation is a single statement, so
//! no connection pooling is needed at clinic scale.

use std::path::{Path, PathBuf};

use crate::db::{self, DatabaseError};

pub struct ClinicState {
    db_path: PathBuf,
}

impl ClinicState {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Open a database connection. Pragmas and migrations are applied
    /// on open; migrations are version-checked, so reopening is cheap.
    pub fn open_db(&self) -> Result<rusqlite::Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

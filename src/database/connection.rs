//! Handles onto the content document database.
//!
//! The viewer only ever reads from a store someone else maintains, so file
//! stores are opened with [`Database::open_read_only`]: the file must exist,
//! nothing is migrated and the expected columns are checked up front.
//! [`Database::open`] and [`Database::open_in_memory`] create and migrate the
//! schema, and are what seeding tools and tests use.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::migrations::{self, CONTENT_COLUMNS, CONTENT_TABLE};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates a writable store at `path`, bringing the schema up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open(path)?)
    }

    /// Writable store discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    /// Opens an existing store without write access.
    ///
    /// Fails if the file is missing or `content_documents` lacks any column
    /// the document queries select.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let db = Self { conn };
        db.check_columns(CONTENT_TABLE, CONTENT_COLUMNS)?;
        Ok(db)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Preparing a zero-row select is enough for SQLite to resolve every name.
    fn check_columns(&self, table: &str, columns: &[&str]) -> Result<(), rusqlite::Error> {
        let sql = format!("SELECT {} FROM {} LIMIT 0", columns.join(", "), table);
        self.conn.prepare(&sql).map(|_| ())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

//! Schema migrations for the planlector content database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

pub const CONTENT_TABLE: &str = "content_documents";

/// Columns the document store reads; a store missing any of them is unusable.
pub const CONTENT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "body",
    "published",
    "category",
    "tags",
    "created_at",
];

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: content_documents")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add category and tags to content_documents")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: published literary documents.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS content_documents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            body TEXT NOT NULL,
            published INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_content_published ON content_documents(published);
        ",
    )
}

/// V2: optional category and JSON tag list used by viewer filters.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    let has_category: bool = conn
        .prepare("SELECT category FROM content_documents LIMIT 0")
        .is_ok();
    if !has_category {
        conn.execute_batch(
            "ALTER TABLE content_documents ADD COLUMN category TEXT;
             ALTER TABLE content_documents ADD COLUMN tags TEXT NOT NULL DEFAULT '[]';",
        )?;
    }
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_content_category ON content_documents(category);",
    )
}

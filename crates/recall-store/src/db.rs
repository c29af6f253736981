use rusqlite::Connection;

use crate::error::Result;

/// Initialise the entries table and its owner index.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner       INTEGER NOT NULL,
            subject     TEXT    NOT NULL,
            note        TEXT,               -- escaped note or NULL when skipped
            created_at  TEXT    NOT NULL,
            UNIQUE(owner, subject)
        );
        CREATE INDEX IF NOT EXISTS idx_entries_owner
            ON entries(owner, id);",
    )?;
    Ok(())
}

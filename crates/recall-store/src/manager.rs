use std::sync::Mutex;

use rusqlite::{Connection, ErrorCode};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use recall_core::{OwnerId, ReminderEntry, ReminderKey};

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::store::ReminderStore;

/// SQLite-backed [`ReminderStore`].
///
/// Wraps a single connection in a `Mutex`; every operation is one short
/// statement, so contention stays low even with many live timers.
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Fresh private database, mostly for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }
}

impl ReminderStore for SqliteStore {
    #[instrument(skip(self, note), fields(owner = %owner, has_note = note.is_some()))]
    fn store(&self, subject: &str, owner: OwnerId, note: Option<&str>) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        match db.execute(
            "INSERT INTO entries (owner, subject, note, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![owner.get(), subject, note, now],
        ) {
            Ok(_) => {
                debug!("entry stored");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateEntry {
                    key: ReminderKey::new(owner, subject).to_string(),
                })
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    #[instrument(skip(self), fields(owner = %owner))]
    fn fetch(&self, subject: &str, owner: OwnerId) -> Result<Option<String>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT note FROM entries WHERE owner = ?1 AND subject = ?2",
            rusqlite::params![owner.get(), subject],
            |row| row.get::<_, Option<String>>(0),
        ) {
            Ok(note) => Ok(note),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound {
                key: ReminderKey::new(owner, subject).to_string(),
            }),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    #[instrument(skip(self), fields(owner = %owner))]
    fn remove(&self, subject: &str, owner: OwnerId) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "DELETE FROM entries WHERE owner = ?1 AND subject = ?2",
            rusqlite::params![owner.get(), subject],
        )?;
        debug!(rows = n, "entry removed");
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %owner))]
    fn list_subjects(&self, owner: OwnerId) -> Result<Vec<String>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare("SELECT subject FROM entries WHERE owner = ?1 ORDER BY id")?;
        let rows = stmt.query_map(rusqlite::params![owner.get()], |row| row.get(0))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn entries(&self) -> Result<Vec<ReminderEntry>> {
        let db = self.db.lock().unwrap();
        let mut stmt =
            db.prepare("SELECT owner, subject, note, created_at FROM entries ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (owner, subject, note, created_at) = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("skipping unreadable entry row: {e}");
                    continue;
                }
            };
            let created_at = match DateTime::parse_from_rfc3339(&created_at) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    warn!(owner, subject = %subject, "skipping entry with bad created_at: {e}");
                    continue;
                }
            };
            entries.push(ReminderEntry {
                owner: OwnerId(owner),
                subject,
                note,
                created_at,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    #[test]
    fn store_then_fetch_returns_note() {
        let s = store();
        s.store("Exam", OwnerId(1), Some("chapter 3")).unwrap();
        assert_eq!(s.fetch("Exam", OwnerId(1)).unwrap().as_deref(), Some("chapter 3"));
    }

    #[test]
    fn skipped_note_fetches_as_none() {
        let s = store();
        s.store("Piano", OwnerId(1), None).unwrap();
        assert_eq!(s.fetch("Piano", OwnerId(1)).unwrap(), None);
    }

    #[test]
    fn duplicate_subject_for_same_owner_is_rejected() {
        let s = store();
        s.store("Piano", OwnerId(1), None).unwrap();
        let err = s.store("Piano", OwnerId(1), Some("again")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEntry { .. }));
        // the original row is untouched
        assert_eq!(s.fetch("Piano", OwnerId(1)).unwrap(), None);
    }

    #[test]
    fn same_subject_for_different_owners_is_allowed() {
        let s = store();
        s.store("Piano", OwnerId(1), None).unwrap();
        s.store("Piano", OwnerId(2), Some("scales")).unwrap();
        assert_eq!(s.fetch("Piano", OwnerId(2)).unwrap().as_deref(), Some("scales"));
        assert_eq!(s.fetch("Piano", OwnerId(1)).unwrap(), None);
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let s = store();
        let err = s.fetch("Nope", OwnerId(1)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn remove_is_idempotent() {
        let s = store();
        s.store("Piano", OwnerId(1), None).unwrap();
        s.remove("Piano", OwnerId(1)).unwrap();
        s.remove("Piano", OwnerId(1)).unwrap();
        assert!(s.fetch("Piano", OwnerId(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn list_subjects_keeps_insertion_order_per_owner() {
        let s = store();
        s.store("Zebra", OwnerId(1), None).unwrap();
        s.store("Apple", OwnerId(1), None).unwrap();
        s.store("Other", OwnerId(2), None).unwrap();
        s.store("Mango", OwnerId(1), None).unwrap();
        assert_eq!(s.list_subjects(OwnerId(1)).unwrap(), vec!["Zebra", "Apple", "Mango"]);
        assert_eq!(s.list_subjects(OwnerId(3)).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn entries_lists_every_owner() {
        let s = store();
        s.store("A", OwnerId(1), None).unwrap();
        s.store("B", OwnerId(2), Some("note")).unwrap();
        let entries = s.entries().unwrap();
        let keys: Vec<ReminderKey> = entries.iter().map(ReminderEntry::key).collect();
        assert_eq!(
            keys,
            vec![
                ReminderKey::new(OwnerId(1), "A"),
                ReminderKey::new(OwnerId(2), "B"),
            ]
        );
        assert_eq!(entries[0].note, None);
        assert_eq!(entries[1].note.as_deref(), Some("note"));
        assert!(entries[0].created_at <= Utc::now());
    }

    #[test]
    fn entries_skips_rows_that_fail_to_decode() {
        let s = store();
        s.store("Good", OwnerId(1), None).unwrap();
        s.db.lock()
            .unwrap()
            .execute(
                "INSERT INTO entries (owner, subject, note, created_at)
                 VALUES (1, 'Broken', NULL, 'yesterday')",
                [],
            )
            .unwrap();
        s.store("Later", OwnerId(1), None).unwrap();

        let subjects: Vec<String> = s.entries().unwrap().into_iter().map(|e| e.subject).collect();
        assert_eq!(subjects, vec!["Good", "Later"]);
    }
}

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::models::LocalEventRecord;
use crate::utils;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        utils::ensure_parent(path.as_ref());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                id INTEGER PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                start_utc TEXT NOT NULL,
                end_utc TEXT NOT NULL,
                tickets INTEGER NOT NULL,
                price REAL NOT NULL,
                organizer_id TEXT NOT NULL,
                image_path TEXT NOT NULL,
                created_at_utc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_end_utc ON events(end_utc);",
        )?;
        Ok(())
    }

    /// Insert a record as a new row. A second row with the same external id
    /// is a constraint error, never a silent overwrite.
    pub fn insert_event(&self, record: &LocalEventRecord) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO events (external_id, title, body, start_utc, end_utc,
                                 tickets, price, organizer_id, image_path, created_at_utc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.external_id,
                record.title,
                record.body,
                record.start_utc,
                record.end_utc,
                record.tickets,
                record.price,
                record.organizer_id,
                record.image_path,
                record.created_at_utc,
            ],
        )?;
        Ok(())
    }

    pub fn has_event(&self, external_id: &str) -> rusqlite::Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM events WHERE external_id = ?1",
            params![external_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_event(&self, external_id: &str) -> rusqlite::Result<Option<LocalEventRecord>> {
        self.conn
            .query_row(
                "SELECT external_id, title, body, start_utc, end_utc,
                        tickets, price, organizer_id, image_path, created_at_utc
                 FROM events WHERE external_id = ?1",
                params![external_id],
                |row| {
                    Ok(LocalEventRecord {
                        external_id: row.get(0)?,
                        title: row.get(1)?,
                        body: row.get(2)?,
                        start_utc: row.get(3)?,
                        end_utc: row.get(4)?,
                        tickets: row.get(5)?,
                        price: row.get(6)?,
                        organizer_id: row.get(7)?,
                        image_path: row.get(8)?,
                        created_at_utc: row.get(9)?,
                    })
                },
            )
            .optional()
    }

    /// Distinct external ids of events still in the live window, i.e. whose
    /// end date has not passed the given storage-format timestamp.
    pub fn live_external_ids(&self, now_storage: &str) -> rusqlite::Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT external_id FROM events WHERE end_utc >= ?1")?;
        let rows = stmt.query_map(params![now_storage], |row| row.get::<_, String>(0))?;

        let mut out = HashSet::new();
        for row in rows {
            out.insert(row?);
        }
        Ok(out)
    }

    pub fn delete_by_external_ids(&self, external_ids: &HashSet<String>) -> rusqlite::Result<usize> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM events WHERE external_id = ?1")?;
        let mut deleted = 0;
        for external_id in external_ids {
            deleted += stmt.execute(params![external_id])?;
        }
        Ok(deleted)
    }

    pub fn count_events(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(external_id: &str, end_utc: &str) -> LocalEventRecord {
        LocalEventRecord {
            external_id: external_id.to_string(),
            title: "Sample".to_string(),
            body: "Sample body".to_string(),
            start_utc: "2027-01-01T18:00:00".to_string(),
            end_utc: end_utc.to_string(),
            tickets: 5,
            price: 120.0,
            organizer_id: "org-1".to_string(),
            image_path: "media/external_events/sample".to_string(),
            created_at_utc: "2026-12-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let record = sample_record("E1", "2027-01-01T22:00:00");
        store.insert_event(&record).unwrap();
        assert!(store.has_event("E1").unwrap());
        assert_eq!(store.get_event("E1").unwrap(), Some(record));
        assert_eq!(store.get_event("E2").unwrap(), None);
    }

    #[test]
    fn duplicate_external_id_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let record = sample_record("E1", "2027-01-01T22:00:00");
        store.insert_event(&record).unwrap();
        assert!(store.insert_event(&record).is_err());
        assert_eq!(store.count_events().unwrap(), 1);
    }

    #[test]
    fn live_window_excludes_elapsed_events() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_event(&sample_record("past", "2026-06-01T22:00:00"))
            .unwrap();
        store
            .insert_event(&sample_record("future", "2027-06-01T22:00:00"))
            .unwrap();

        let live = store.live_external_ids("2026-12-15T00:00:00").unwrap();
        assert_eq!(live, HashSet::from(["future".to_string()]));
    }

    #[test]
    fn delete_by_external_ids_reports_count() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_event(&sample_record("E1", "2027-01-01T22:00:00"))
            .unwrap();
        store
            .insert_event(&sample_record("E2", "2027-02-01T22:00:00"))
            .unwrap();

        let ids = HashSet::from(["E1".to_string(), "E3".to_string()]);
        assert_eq!(store.delete_by_external_ids(&ids).unwrap(), 1);
        assert!(!store.has_event("E1").unwrap());
        assert!(store.has_event("E2").unwrap());
    }
}

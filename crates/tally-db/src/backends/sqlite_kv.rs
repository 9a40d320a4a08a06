use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tally_types::models::Snapshot;
use tracing::info;

use super::{KEY_EVENTS, KEY_META, KEY_USERS, decode_fields, encode_fields};
use crate::migrations;
use crate::store::RecordStore;

/// Snapshot split across three rows of a SQLite key-value table.
pub struct SqliteKvStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteKvStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        migrations::run(&conn)?;

        info!("SQLite store opened at {} (journal_mode={})", path.display(), mode);
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let slot = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        let conn = slot.as_ref().ok_or_else(|| anyhow!("SQLite store is closed"))?;
        f(conn)
    }
}

impl RecordStore for SqliteKvStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self) -> Result<Option<Snapshot>> {
        let mut values: HashMap<String, String> = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM kv WHERE key IN (?1, ?2, ?3)")?;
            let rows = stmt
                .query_map([KEY_USERS, KEY_EVENTS, KEY_META], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<HashMap<_, _>, _>>()?;
            Ok(rows)
        })?;

        decode_fields(
            values.remove(KEY_USERS),
            values.remove(KEY_EVENTS),
            values.remove(KEY_META),
        )
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let fields = encode_fields(snapshot)?;

        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            for (key, value) in &fields {
                tx.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    (key, value),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let mut slot = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        if let Some(conn) = slot.take() {
            conn.close().map_err(|(_, e)| e)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn empty_table_reads_as_none() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_then_read_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let mut snap = Snapshot::empty(Utc::now());

        let store = SqliteKvStore::open(&path).unwrap();
        store.write(&snap).unwrap();
        snap.configuracion.version = "2.1".into();
        store.write(&snap).unwrap();
        store.close().unwrap();

        let reopened = SqliteKvStore::open(&path).unwrap();
        assert_eq!(reopened.read().unwrap(), Some(snap));

        let rows: i64 = reopened
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM kv", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn load_keeps_rows_when_meta_row_is_missing() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        let mut snap = Snapshot::empty(Utc::now());
        snap.usuarios.push(tally_types::models::User {
            id: "u1".into(),
            nombre: "Ana".into(),
            codigo_usuario: "abc123defg".into(),
            puntos: 4,
            fecha_registro: Utc::now(),
            fecha_actualizacion: Utc::now(),
        });
        store.write(&snap).unwrap();
        store
            .with_conn(|conn| Ok(conn.execute("DELETE FROM kv WHERE key = ?1", [KEY_META])?))
            .unwrap();

        let db = crate::Database::new(Box::new(store));
        let loaded = db.load().unwrap();
        assert_eq!(loaded.usuarios, snap.usuarios);
    }

    #[test]
    fn closed_store_errors() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.close().unwrap();
        assert!(store.read().is_err());
    }
}

//! Interchangeable homes for the snapshot.
//!
//! The JSON file keeps the whole snapshot in one document. The key-value
//! backends (Redis, SQLite) split it into three keys, one per top-level
//! field, each holding that field's JSON.

mod json_file;
mod memory;
mod redis_kv;
mod sqlite_kv;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use redis_kv::RedisStore;
pub use sqlite_kv::SqliteKvStore;

use anyhow::{Context, Result};
use chrono::Utc;
use tally_types::models::{SCHEMA_VERSION, Snapshot, StoreMeta};
use tracing::warn;

pub(crate) const KEY_USERS: &str = "usuarios";
pub(crate) const KEY_EVENTS: &str = "ordenes";
pub(crate) const KEY_META: &str = "configuracion";

pub(crate) const KV_KEYS: [&str; 3] = [KEY_USERS, KEY_EVENTS, KEY_META];

/// Split a snapshot into `(key, json)` pairs in [`KV_KEYS`] order.
pub(crate) fn encode_fields(snapshot: &Snapshot) -> Result<[(&'static str, String); 3]> {
    Ok([
        (KEY_USERS, serde_json::to_string(&snapshot.usuarios)?),
        (KEY_EVENTS, serde_json::to_string(&snapshot.ordenes)?),
        (KEY_META, serde_json::to_string(&snapshot.configuracion)?),
    ])
}

/// Rebuild a snapshot from the three key values. Any present key marks an
/// initialized store; missing collections read as empty and a missing
/// configuration is rebuilt rather than letting the collections be
/// overwritten.
pub(crate) fn decode_fields(
    users: Option<String>,
    events: Option<String>,
    meta: Option<String>,
) -> Result<Option<Snapshot>> {
    let configuracion = match meta {
        Some(raw) => serde_json::from_str(&raw).context("corrupt configuracion value")?,
        None if users.is_none() && events.is_none() => return Ok(None),
        None => {
            warn!("Store has data but no configuracion key, rebuilding it");
            let now = Utc::now();
            StoreMeta {
                version: SCHEMA_VERSION.to_string(),
                creado: now,
                ultima_actualizacion: now,
            }
        }
    };

    let usuarios = match users {
        Some(raw) => serde_json::from_str(&raw).context("corrupt usuarios value")?,
        None => Vec::new(),
    };
    let ordenes = match events {
        Some(raw) => serde_json::from_str(&raw).context("corrupt ordenes value")?,
        None => Vec::new(),
    };

    Ok(Some(Snapshot {
        usuarios,
        ordenes,
        configuracion,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_means_uninitialized() {
        assert!(decode_fields(None, None, None).unwrap().is_none());
    }

    #[test]
    fn collections_without_meta_are_kept() {
        let users = r#"[{"id":"u1","nombre":"Ana","codigo_usuario":"abc","puntos":3,
            "fecha_registro":"2024-01-01T00:00:00Z","fecha_actualizacion":"2024-01-01T00:00:00Z"}]"#;

        let decoded = decode_fields(Some(users.into()), None, None).unwrap().unwrap();
        assert_eq!(decoded.usuarios.len(), 1);
        assert_eq!(decoded.usuarios[0].puntos, 3);
        assert!(decoded.ordenes.is_empty());
        assert_eq!(decoded.configuracion.version, SCHEMA_VERSION);
    }

    #[test]
    fn missing_collections_read_as_empty() {
        let snap = Snapshot::empty(Utc::now());
        let [_, _, (_, meta)] = encode_fields(&snap).unwrap();

        let decoded = decode_fields(None, None, Some(meta)).unwrap().unwrap();
        assert_eq!(decoded, snap);
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let result = decode_fields(Some("{".into()), None, Some("{}".into()));
        assert!(result.is_err());
    }
}

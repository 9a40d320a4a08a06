use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use redis::{Client, Commands, Connection, RedisResult};
use tally_types::models::Snapshot;
use tracing::{info, warn};

use super::{KV_KEYS, decode_fields, encode_fields};
use crate::store::RecordStore;

/// Snapshot split across three Redis string keys.
pub struct RedisStore {
    client: Client,
    prefix: String,
    conn: Mutex<Option<Connection>>,
}

impl RedisStore {
    pub fn open(url: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(url).context("invalid Redis URL")?;
        let conn = client.get_connection().context("connecting to Redis")?;

        info!("Redis store connected (key prefix '{}')", prefix);
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    fn keys(&self) -> Vec<String> {
        KV_KEYS.iter().map(|k| format!("{}{}", self.prefix, k)).collect()
    }

    /// Run `f` on the live connection, reconnecting first if a previous
    /// call dropped it.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> RedisResult<T>,
    {
        let mut slot = self.conn.lock().map_err(|e| anyhow!("Redis lock poisoned: {}", e))?;

        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.client.get_connection().context("reconnecting to Redis")?,
        };

        match f(&mut conn) {
            Ok(value) => {
                *slot = Some(conn);
                Ok(value)
            }
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    warn!("Redis connection lost: {}", e);
                } else {
                    *slot = Some(conn);
                }
                Err(e.into())
            }
        }
    }
}

impl RecordStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    fn read(&self) -> Result<Option<Snapshot>> {
        let keys = self.keys();
        let values: Vec<Option<String>> = self.with_conn(|conn| conn.mget(&keys))?;

        let mut values = values.into_iter();
        decode_fields(
            values.next().flatten(),
            values.next().flatten(),
            values.next().flatten(),
        )
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let fields = encode_fields(snapshot)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in &fields {
            pipe.set(format!("{}{}", self.prefix, key), value).ignore();
        }

        self.with_conn(|conn| pipe.query::<()>(conn))
    }

    fn close(&self) -> Result<()> {
        let mut slot = self.conn.lock().map_err(|e| anyhow!("Redis lock poisoned: {}", e))?;
        slot.take();
        Ok(())
    }
}

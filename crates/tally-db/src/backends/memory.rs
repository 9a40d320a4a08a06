use std::sync::Mutex;

use anyhow::{Result, anyhow};
use tally_types::models::Snapshot;

use crate::store::RecordStore;

/// Process-local store. Keeps the serialized form so every read hands out
/// an independent copy, like the other backends do.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
}

impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn read(&self) -> Result<Option<Snapshot>> {
        let data = self.data.lock().map_err(|e| anyhow!("Memory store lock poisoned: {}", e))?;
        match data.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        let mut data = self.data.lock().map_err(|e| anyhow!("Memory store lock poisoned: {}", e))?;
        *data = Some(raw);
        Ok(())
    }
}

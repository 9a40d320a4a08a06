use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tally_types::models::Snapshot;
use tracing::info;

use crate::store::RecordStore;

/// Whole snapshot as one pretty-printed JSON document on local disk.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent(path)?;
        info!("JSON data file at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl RecordStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn read(&self) -> Result<Option<Snapshot>> {
        let _guard = self.lock.lock().map_err(|e| anyhow!("File lock poisoned: {}", e))?;

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        // A document missing any top-level key fails here rather than being
        // replaced by an empty one, which would wipe it on the next save.
        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt data file {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self.lock.lock().map_err(|e| anyhow!("File lock poisoned: {}", e))?;

        ensure_parent(&self.path)?;
        let contents = serde_json::to_string_pretty(snapshot)?;

        // Write beside the target and rename so readers never see half a document.
        let tmp = self.temp_path();
        fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn absent_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("data/leaderboard.json")).unwrap();

        assert!(store.read().unwrap().is_none());
        // Parent directory is created eagerly.
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("leaderboard.json")).unwrap();
        let snap = Snapshot::empty(Utc::now());

        store.write(&snap).unwrap();
        assert_eq!(store.read().unwrap(), Some(snap));
        assert!(!store.temp_path().exists());

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(doc.get("usuarios").is_some());
        assert!(doc.get("ordenes").is_some());
        assert_eq!(doc["configuracion"]["version"], "2.0");
    }

    #[test]
    fn incomplete_document_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        fs::write(&path, r#"{"usuarios": []}"#).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.read().is_err());
    }
}

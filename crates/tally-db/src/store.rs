use anyhow::Result;
use tally_types::models::Snapshot;

/// Raw persistence for a [`Snapshot`]. Implementations only move bytes;
/// initialization and timestamping live in [`crate::Database`].
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs and the health endpoint.
    fn backend(&self) -> &'static str;

    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<Snapshot>>;

    fn write(&self, snapshot: &Snapshot) -> Result<()>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::bail;

    /// Reads as empty, refuses every write.
    #[derive(Default)]
    pub(crate) struct FailingStore;

    impl RecordStore for FailingStore {
        fn backend(&self) -> &'static str {
            "failing"
        }

        fn read(&self) -> Result<Option<Snapshot>> {
            Ok(None)
        }

        fn write(&self, _snapshot: &Snapshot) -> Result<()> {
            bail!("disk full")
        }
    }
}

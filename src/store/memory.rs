use crate::error::StoreError;
use crate::snapshot::Snapshot;

use super::SnapshotStore;

/// In-process store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn current(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.clone().unwrap_or_default())
    }

    fn replace(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }
}

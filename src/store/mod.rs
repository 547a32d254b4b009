//! Persistence for the single current snapshot.
//!
//! A store holds exactly one snapshot. `replace` overwrites it wholesale and
//! no history is kept. Stores assume a single writer: runs must not overlap.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, DEFAULT_TABLE};

use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// Storage for the current snapshot
pub trait SnapshotStore {
    /// Load the persisted snapshot, or an empty one if nothing was saved yet
    fn current(&self) -> Result<Snapshot, StoreError>;

    /// Overwrite the persisted snapshot with `snapshot`
    fn replace(&mut self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

//! tablewatch - detect added and removed records between table snapshots
//!
//! Each run fingerprints every row of a freshly ingested table, compares the
//! fingerprints with the single stored snapshot, reports the records that
//! appeared or disappeared grouped by project, and then stores the new
//! snapshot in place of the old one.

pub mod check;
pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod logging;
pub mod model;
pub mod parser;
pub mod report;
pub mod snapshot;
pub mod store;

pub use check::{run_check, CheckOptions, CheckOutcome};
pub use config::Config;
pub use diff::DiffResult;
pub use error::{CheckError, HashingError, ReportError, StoreError};
pub use hash::{Fingerprint, RowHasher};
pub use model::Table;
pub use snapshot::{Record, Snapshot};
pub use store::{MemoryStore, SnapshotStore, SqliteStore};

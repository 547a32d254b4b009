//! Error types for fingerprinting, snapshot storage and reporting

use thiserror::Error;

/// A record or schema could not be turned into a fingerprint
#[derive(Debug, Error)]
pub enum HashingError {
    #[error("row {row}: expected {expected} cells to match the schema, found {found}")]
    ArityMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column name `{0}` is reserved for the fingerprint column")]
    ReservedColumn(String),

    #[error("column `{0}` appears more than once in the schema")]
    DuplicateColumn(String),
}

/// Snapshot persistence failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open snapshot store: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("failed to read snapshot: {0}")]
    Read(#[source] rusqlite::Error),

    #[error("failed to write snapshot: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("failed to encode cell: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("stored snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Schema(#[from] HashingError),

    #[error("invalid table name `{0}`")]
    InvalidTableName(String),
}

/// The grouped report could not be built
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown {role} column `{name}`")]
    UnknownColumn { role: &'static str, name: String },
}

/// Failure of a whole check run
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("could not load the current snapshot")]
    StoreRead(#[source] StoreError),

    /// The diff was computed but the new snapshot was not saved; the next run
    /// will compare against the stale snapshot again.
    #[error("new snapshot was not saved; the previous snapshot is still current")]
    StoreWrite(#[source] StoreError),
}

//! Content fingerprints for records
//!
//! A fingerprint is the SHA-256 of every cell's canonical text, in column
//! order, concatenated without separators. The canonical text is fixed here
//! rather than taken from `Display` so a row hashes the same across releases.

use std::fmt;

use chrono::Timelike;
use rustc_hash::FxHashSet;
use sha2::{Digest, Sha256};

use crate::error::HashingError;
use crate::model::{CellValue, Column};

/// Canonical text of a null cell
pub const NULL_SENTINEL: &str = "None";

/// Name of the column that holds the fingerprint in persisted snapshots
pub const FINGERPRINT_COLUMN: &str = "hashid";

/// Hex-encoded SHA-256 digest identifying a record's exact content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of the hex digest
    pub const LEN: usize = 64;

    /// Parse a stored digest, rejecting anything that is not 64 lowercase hex chars
    pub fn from_hex(s: &str) -> Option<Self> {
        let valid = s.len() == Self::LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical text of a single cell
pub fn canonical_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => NULL_SENTINEL.to_string(),
        CellValue::Bool(true) => "True".to_string(),
        CellValue::Bool(false) => "False".to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => canonical_float(*f),
        CellValue::String(s) => s.to_string(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        CellValue::DateTime(dt) => {
            if dt.nanosecond() == 0 {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
            }
        }
    }
}

fn canonical_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if f.fract() == 0.0 {
        // Every integral float keeps a fractional digit, however large
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

/// Computes fingerprints for rows of one fixed column schema
#[derive(Debug, Clone)]
pub struct RowHasher {
    width: usize,
}

impl RowHasher {
    /// Create a hasher for the given schema
    ///
    /// Fails if the schema repeats a column name or uses the reserved
    /// fingerprint column name, since such a schema cannot be persisted.
    pub fn new(columns: &[Column]) -> Result<Self, HashingError> {
        validate_schema(columns)?;
        Ok(Self {
            width: columns.len(),
        })
    }

    /// Fingerprint one row. `row` is the 1-indexed source line used in errors.
    pub fn fingerprint(&self, cells: &[CellValue], row: usize) -> Result<Fingerprint, HashingError> {
        if cells.len() != self.width {
            return Err(HashingError::ArityMismatch {
                row,
                expected: self.width,
                found: cells.len(),
            });
        }

        let mut hasher = Sha256::new();
        for cell in cells {
            hasher.update(canonical_text(cell).as_bytes());
        }
        Ok(Fingerprint(hex::encode(hasher.finalize())))
    }
}

pub(crate) fn validate_schema(columns: &[Column]) -> Result<(), HashingError> {
    let mut seen = FxHashSet::default();
    for col in columns {
        if col.name == FINGERPRINT_COLUMN {
            return Err(HashingError::ReservedColumn(col.name.clone()));
        }
        if !seen.insert(col.name.as_str()) {
            return Err(HashingError::DuplicateColumn(col.name.clone()));
        }
    }
    Ok(())
}

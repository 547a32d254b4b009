//! Fingerprinted snapshots of a table

use indexmap::IndexMap;

use crate::error::HashingError;
use crate::hash::{Fingerprint, RowHasher};
use crate::model::{CellValue, Column, Table};

/// A row together with its content fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fingerprint: Fingerprint,
    /// Cell values in the owning snapshot's column order
    pub cells: Vec<CellValue>,
}

impl Record {
    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// The complete state of a table at one point in time.
///
/// Records are keyed by fingerprint, so rows with identical content collapse
/// into one entry. Iteration follows insertion order; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    columns: Vec<Column>,
    records: IndexMap<Fingerprint, Record>,
}

impl Snapshot {
    /// A snapshot with no schema and no records, as seen on a first run
    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty snapshot over the given schema
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            records: IndexMap::new(),
        }
    }

    /// Fingerprint every row of `table`.
    ///
    /// All rows are hashed before anything is returned, so a failure on any
    /// row yields no snapshot at all.
    pub fn from_table(table: &Table) -> Result<Self, HashingError> {
        let hasher = RowHasher::new(&table.columns)?;
        let mut snapshot = Self::new(table.columns.clone());

        for row in &table.rows {
            let fingerprint = hasher.fingerprint(&row.cells, row.source_line)?;
            snapshot.insert(Record {
                fingerprint,
                cells: row.cells.clone(),
            });
        }

        let collapsed = table.row_count() - snapshot.len();
        if collapsed > 0 {
            tracing::debug!(collapsed, "duplicate rows collapsed into one record");
        }

        Ok(snapshot)
    }

    /// Insert a record, returning false if one with the same fingerprint is
    /// already present (the existing record keeps its position)
    pub fn insert(&mut self, record: Record) -> bool {
        if self.records.contains_key(&record.fingerprint) {
            return false;
        }
        self.records.insert(record.fingerprint.clone(), record);
        true
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Record> {
        self.records.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records.contains_key(fingerprint)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the snapshot holds no records, whatever its schema
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

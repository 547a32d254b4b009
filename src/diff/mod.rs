//! Diff engine for comparing snapshots
//!
//! Records are matched on their content fingerprint alone. A record whose
//! content changed in any cell therefore has a new fingerprint and shows up
//! twice: its old content under `Removed` and its new content under `Added`.
//! There is no "modified" category; inferring one would need a primary key,
//! which this data does not have.

mod row_diff;
mod schema_diff;

use serde::Serialize;

use crate::model::Column;
use crate::snapshot::{Record, Snapshot};

pub use row_diff::RowMatcher;
pub use schema_diff::{SchemaChange, SchemaDiff};

/// Label of the added section
pub const ADDED: &str = "Added";
/// Label of the removed section
pub const REMOVED: &str = "Removed";

/// Statistics about the diff
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_unchanged: usize,
    pub old_row_count: usize,
    pub new_row_count: usize,
}

impl DiffStats {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.rows_added > 0 || self.rows_removed > 0
    }
}

/// Result of comparing two snapshots
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Schema of the old snapshot, which `removed` records follow
    pub old_columns: Vec<Column>,
    /// Schema of the new snapshot, which `added` records follow
    pub new_columns: Vec<Column>,
    /// Records only in the new snapshot, in new-snapshot order
    pub added: Vec<Record>,
    /// Records only in the old snapshot, in old-snapshot order
    pub removed: Vec<Record>,
    /// Column changes between the two schemas
    pub schema_changes: Vec<SchemaChange>,
    pub stats: DiffStats,
}

impl DiffResult {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.stats.has_changes()
    }

    /// Added records, or `None` when there are none
    pub fn added(&self) -> Option<&[Record]> {
        (!self.added.is_empty()).then_some(self.added.as_slice())
    }

    /// Removed records, or `None` when there are none
    pub fn removed(&self) -> Option<&[Record]> {
        (!self.removed.is_empty()).then_some(self.removed.as_slice())
    }

    /// Non-empty sections keyed `"Added"` / `"Removed"`, each with the schema
    /// its records follow. An absent section means no entries of that kind.
    pub fn sections(&self) -> Vec<(&'static str, &[Column], &[Record])> {
        let mut sections = Vec::with_capacity(2);
        if let Some(added) = self.added() {
            sections.push((ADDED, self.new_columns.as_slice(), added));
        }
        if let Some(removed) = self.removed() {
            sections.push((REMOVED, self.old_columns.as_slice(), removed));
        }
        sections
    }
}

/// Main diff engine
#[derive(Debug, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compare two snapshots
    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> DiffResult {
        let mut result = DiffResult {
            old_columns: old.columns().to_vec(),
            new_columns: new.columns().to_vec(),
            ..Default::default()
        };

        result.stats.old_row_count = old.len();
        result.stats.new_row_count = new.len();

        // An empty prior schema means there was nothing to drift from
        if !old.columns().is_empty() {
            result.schema_changes = SchemaDiff::compare(old.columns(), new.columns());
        }

        for (old_record, new_record) in RowMatcher::match_rows(old, new) {
            match (old_record, new_record) {
                (Some(_), Some(_)) => result.stats.rows_unchanged += 1,
                (Some(old_record), None) => {
                    result.stats.rows_removed += 1;
                    result.removed.push(old_record.clone());
                }
                (None, Some(new_record)) => {
                    result.stats.rows_added += 1;
                    result.added.push(new_record.clone());
                }
                (None, None) => unreachable!(),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{columns_from_names, CellValue, Table};

    fn snapshot(rows: &[(i64, &str)]) -> Snapshot {
        let mut table = Table::new(columns_from_names(["id", "name"]));
        for (i, (id, name)) in rows.iter().enumerate() {
            table.add_row(vec![(*id).into(), (*name).into()], i + 2);
        }
        Snapshot::from_table(&table).unwrap()
    }

    fn ids(records: &[Record]) -> Vec<CellValue> {
        records.iter().map(|r| r.cells[0].clone()).collect()
    }

    #[test]
    fn test_added_and_removed() {
        let old = snapshot(&[(1, "X"), (2, "Y")]);
        let new = snapshot(&[(1, "X"), (3, "Z")]);
        let diff = DiffEngine::new().diff(&old, &new);

        assert_eq!(ids(&diff.added), vec![CellValue::Int(3)]);
        assert_eq!(ids(&diff.removed), vec![CellValue::Int(2)]);
        assert_eq!(diff.stats.rows_unchanged, 1);
        assert!(diff.schema_changes.is_empty());

        let labels: Vec<_> = diff.sections().iter().map(|(label, _, _)| *label).collect();
        assert_eq!(labels, vec![ADDED, REMOVED]);
    }

    #[test]
    fn test_identical_snapshots() {
        let s = snapshot(&[(1, "X"), (2, "Y")]);
        let diff = DiffEngine::new().diff(&s, &s);

        assert!(!diff.has_changes());
        assert!(diff.added().is_none());
        assert!(diff.removed().is_none());
        assert!(diff.sections().is_empty());
    }

    #[test]
    fn test_changed_cell_is_remove_plus_add() {
        let old = snapshot(&[(1, "X")]);
        let new = snapshot(&[(1, "X2")]);
        let diff = DiffEngine::new().diff(&old, &new);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added[0].cells[1], CellValue::from("X2"));
        assert_eq!(diff.removed[0].cells[1], CellValue::from("X"));
    }

    #[test]
    fn test_against_empty_prior() {
        let new = snapshot(&[(1, "X"), (2, "Y")]);
        let diff = DiffEngine::new().diff(&Snapshot::empty(), &new);

        assert_eq!(diff.stats.rows_added, 2);
        assert!(diff.removed().is_none());
        assert!(diff.schema_changes.is_empty());
    }

    #[test]
    fn test_order_follows_snapshots() {
        let old = snapshot(&[(5, "E"), (4, "D"), (1, "X")]);
        let new = snapshot(&[(1, "X"), (9, "I"), (7, "G")]);
        let diff = DiffEngine::new().diff(&old, &new);

        assert_eq!(ids(&diff.added), vec![CellValue::Int(9), CellValue::Int(7)]);
        assert_eq!(ids(&diff.removed), vec![CellValue::Int(5), CellValue::Int(4)]);
    }
}

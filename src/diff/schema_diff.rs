//! Schema drift between two snapshots
//!
//! Fingerprints cover every column in order, so any schema change makes every
//! record look new. These notices let a report explain such a mass change.

use serde::Serialize;

use crate::model::Column;

/// Types of schema changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaChange {
    /// Column was added
    ColumnAdded { name: String, index: usize },
    /// Column was removed
    ColumnRemoved { name: String, index: usize },
    /// Column kept its name but changed position relative to the other kept columns
    ColumnMoved {
        name: String,
        from_index: usize,
        to_index: usize,
    },
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ColumnAdded { name, index } => {
                write!(f, "+ {} (new column at position {})", name, index)
            }
            SchemaChange::ColumnRemoved { name, index } => {
                write!(f, "- {} (removed from position {})", name, index)
            }
            SchemaChange::ColumnMoved {
                name,
                from_index,
                to_index,
            } => {
                write!(f, "↔ {} (moved from {} to {})", name, from_index, to_index)
            }
        }
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare two column lists
    pub fn compare(old_columns: &[Column], new_columns: &[Column]) -> Vec<SchemaChange> {
        let mut changes = Vec::new();

        let old_names: Vec<&str> = old_columns.iter().map(|c| c.name.as_str()).collect();
        let new_names: Vec<&str> = new_columns.iter().map(|c| c.name.as_str()).collect();

        for (old_idx, old_name) in old_names.iter().enumerate() {
            if !new_names.contains(old_name) {
                changes.push(SchemaChange::ColumnRemoved {
                    name: old_name.to_string(),
                    index: old_idx,
                });
            }
        }

        for (new_idx, new_name) in new_names.iter().enumerate() {
            if !old_names.contains(new_name) {
                changes.push(SchemaChange::ColumnAdded {
                    name: new_name.to_string(),
                    index: new_idx,
                });
            }
        }

        // Only columns present on both sides can move; compare their relative
        // order so an insertion does not report every later column as moved.
        let kept_old: Vec<&str> = old_names
            .iter()
            .copied()
            .filter(|n| new_names.contains(n))
            .collect();
        let kept_new: Vec<&str> = new_names
            .iter()
            .copied()
            .filter(|n| old_names.contains(n))
            .collect();

        for (rank, name) in kept_old.iter().enumerate() {
            if kept_new.get(rank) != Some(name) {
                let from_index = old_names.iter().position(|n| n == name).unwrap_or(rank);
                let to_index = new_names.iter().position(|n| n == name).unwrap_or(rank);
                changes.push(SchemaChange::ColumnMoved {
                    name: name.to_string(),
                    from_index,
                    to_index,
                });
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::columns_from_names;

    #[test]
    fn test_same_schema() {
        let cols = columns_from_names(["a", "b"]);
        assert!(SchemaDiff::compare(&cols, &cols).is_empty());
    }

    #[test]
    fn test_insert_is_not_a_move() {
        let old = columns_from_names(["a", "b"]);
        let new = columns_from_names(["x", "a", "b"]);
        assert_eq!(
            SchemaDiff::compare(&old, &new),
            vec![SchemaChange::ColumnAdded {
                name: "x".into(),
                index: 0
            }]
        );
    }

    #[test]
    fn test_removed_and_swapped() {
        let old = columns_from_names(["a", "b", "c"]);
        let new = columns_from_names(["c", "a"]);
        let changes = SchemaDiff::compare(&old, &new);
        assert_eq!(
            changes[0],
            SchemaChange::ColumnRemoved {
                name: "b".into(),
                index: 1
            }
        );
        assert_eq!(changes.len(), 3);
        assert!(changes.contains(&SchemaChange::ColumnMoved {
            name: "c".into(),
            from_index: 2,
            to_index: 0
        }));
    }
}

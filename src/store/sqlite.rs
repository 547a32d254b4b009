//! SQLite snapshot storage.
//!
//! The snapshot lives in one table (default `data`) whose columns are the
//! source columns plus `hashid`, the fingerprint primary key. `replace` drops
//! and recreates the table inside a transaction.
//!
//! Cells are stored as SQL NULL for null values and otherwise as a small
//! tagged JSON document (`{"t":"int","v":42}`), so the type of every cell
//! survives a round trip even when a column mixes types.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::hash::{validate_schema, Fingerprint, FINGERPRINT_COLUMN};
use crate::model::{CellValue, Column};
use crate::snapshot::{Record, Snapshot};

use super::SnapshotStore;

/// Default name of the snapshot table
pub const DEFAULT_TABLE: &str = "data";

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "lowercase")]
enum StoredCell {
    Bool(bool),
    Int(i64),
    /// Kept as text so NaN and infinities round-trip
    Float(String),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

fn encode_cell(cell: &CellValue) -> Result<Value, StoreError> {
    let stored = match cell {
        CellValue::Null => return Ok(Value::Null),
        CellValue::Bool(b) => StoredCell::Bool(*b),
        CellValue::Int(i) => StoredCell::Int(*i),
        CellValue::Float(f) => StoredCell::Float(f.to_string()),
        CellValue::String(s) => StoredCell::String(s.to_string()),
        CellValue::Date(d) => StoredCell::Date(*d),
        CellValue::DateTime(dt) => StoredCell::DateTime(*dt),
    };
    let json = serde_json::to_string(&stored).map_err(StoreError::Encode)?;
    Ok(Value::Text(json))
}

fn decode_cell(value: ValueRef<'_>, column: &str) -> Result<CellValue, StoreError> {
    let text = match value {
        ValueRef::Null => return Ok(CellValue::Null),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map_err(|e| StoreError::Corrupt(format!("column `{}`: {}", column, e)))?,
        other => {
            return Err(StoreError::Corrupt(format!(
                "column `{}`: unexpected {:?} value",
                column,
                other.data_type()
            )))
        }
    };

    let stored: StoredCell = serde_json::from_str(text)
        .map_err(|e| StoreError::Corrupt(format!("column `{}`: {}", column, e)))?;

    Ok(match stored {
        StoredCell::Bool(b) => CellValue::Bool(b),
        StoredCell::Int(i) => CellValue::Int(i),
        StoredCell::Float(s) => CellValue::Float(s.parse().map_err(|_| {
            StoreError::Corrupt(format!("column `{}`: bad float `{}`", column, s))
        })?),
        StoredCell::String(s) => CellValue::from(s),
        StoredCell::Date(d) => CellValue::Date(d),
        StoredCell::DateTime(dt) => CellValue::DateTime(dt),
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Database handle. Open once per run, close when the run is done.
pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, using the default table
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_table(path, DEFAULT_TABLE)
    }

    /// Open (or create) the database at `path`, storing the snapshot in `table`
    pub fn open_with_table(path: &Path, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        tracing::debug!(path = %path.display(), table, "opened snapshot store");
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// A private in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        Ok(Self {
            conn,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    /// Close the connection, reporting any error SQLite raises on the way out
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Write(e))
    }

    fn table_exists(&self) -> Result<bool, StoreError> {
        self.conn
            .query_row(
                // SQLite resolves table names case-insensitively
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                params![self.table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(StoreError::Read)
    }

    fn stored_columns(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(StoreError::Read)?;
        let names = stmt
            .query_map(params![self.table], |row| row.get::<_, String>(0))
            .map_err(StoreError::Read)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Read)?;
        Ok(names)
    }
}

fn validate_table_name(table: &str) -> Result<(), StoreError> {
    let reserved = table.to_ascii_lowercase().starts_with("sqlite_");
    if table.is_empty() || reserved || table.contains('\0') {
        return Err(StoreError::InvalidTableName(table.to_string()));
    }
    Ok(())
}

impl SnapshotStore for SqliteStore {
    fn current(&self) -> Result<Snapshot, StoreError> {
        if !self.table_exists()? {
            tracing::debug!(table = %self.table, "no stored snapshot");
            return Ok(Snapshot::empty());
        }

        let stored = self.stored_columns()?;
        if !stored.iter().any(|name| name == FINGERPRINT_COLUMN) {
            return Err(StoreError::Corrupt(format!(
                "table `{}` has no `{}` column",
                self.table, FINGERPRINT_COLUMN
            )));
        }

        let names: Vec<&str> = stored
            .iter()
            .map(String::as_str)
            .filter(|name| *name != FINGERPRINT_COLUMN)
            .collect();
        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(*name, i))
            .collect();

        let select_list = std::iter::once(FINGERPRINT_COLUMN)
            .chain(names.iter().copied())
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            select_list,
            quote_ident(&self.table)
        );

        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::Read)?;
        let mut rows = stmt.query([]).map_err(StoreError::Read)?;
        let mut snapshot = Snapshot::new(columns);

        while let Some(row) = rows.next().map_err(StoreError::Read)? {
            let digest: String = row.get(0).map_err(StoreError::Read)?;
            let fingerprint = Fingerprint::from_hex(&digest)
                .ok_or_else(|| StoreError::Corrupt(format!("invalid fingerprint `{}`", digest)))?;

            let mut cells = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = row.get_ref(i + 1).map_err(StoreError::Read)?;
                cells.push(decode_cell(value, name)?);
            }

            if !snapshot.insert(Record { fingerprint, cells }) {
                return Err(StoreError::Corrupt(format!("duplicate fingerprint `{}`", digest)));
            }
        }

        tracing::debug!(table = %self.table, records = snapshot.len(), "loaded snapshot");
        Ok(snapshot)
    }

    fn replace(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        validate_schema(snapshot.columns())?;

        let table = quote_ident(&self.table);
        let column_defs = std::iter::once(format!(
            "{} TEXT PRIMARY KEY NOT NULL",
            quote_ident(FINGERPRINT_COLUMN)
        ))
        .chain(
            snapshot
                .columns()
                .iter()
                .map(|c| format!("{} TEXT", quote_ident(&c.name))),
        )
        .collect::<Vec<_>>()
        .join(", ");
        let placeholders = vec!["?"; snapshot.columns().len() + 1].join(", ");

        let tx = self.conn.transaction().map_err(StoreError::Write)?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
            .map_err(StoreError::Write)?;
        tx.execute(&format!("CREATE TABLE {} ({})", table, column_defs), [])
            .map_err(StoreError::Write)?;

        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO {} VALUES ({})", table, placeholders))
                .map_err(StoreError::Write)?;

            for record in snapshot.records() {
                let mut values = Vec::with_capacity(record.cells.len() + 1);
                values.push(Value::Text(record.fingerprint.to_string()));
                for cell in &record.cells {
                    values.push(encode_cell(cell)?);
                }
                stmt.execute(params_from_iter(values))
                    .map_err(StoreError::Write)?;
            }
        }

        tx.commit().map_err(StoreError::Write)?;

        tracing::debug!(table = %self.table, records = snapshot.len(), "replaced snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{columns_from_names, Table};

    fn sample() -> Snapshot {
        let mut table = Table::new(columns_from_names(["Project Name", "Qty", "Price", "Created", "Note"]));
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        table.add_row(
            vec![
                "Tower \"A\"".into(),
                CellValue::Int(3),
                CellValue::Float(19.99),
                CellValue::Date(date),
                CellValue::Null,
            ],
            2,
        );
        table.add_row(
            vec![
                "Annex".into(),
                CellValue::Int(-1),
                CellValue::Float(f64::NAN),
                CellValue::DateTime(date.and_hms_opt(8, 30, 0).unwrap()),
                CellValue::Bool(true),
            ],
            3,
        );
        Snapshot::from_table(&table).unwrap()
    }

    #[test]
    fn test_empty_store_has_empty_snapshot() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.current().unwrap(), Snapshot::empty());
    }

    #[test]
    fn test_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let snapshot = sample();
        store.replace(&snapshot).unwrap();
        assert_eq!(store.current().unwrap(), snapshot);
    }

    #[test]
    fn test_replace_overwrites() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace(&sample()).unwrap();

        let mut table = Table::new(columns_from_names(["other"]));
        table.add_row(vec!["only".into()], 2);
        let next = Snapshot::from_table(&table).unwrap();
        store.replace(&next).unwrap();

        let current = store.current().unwrap();
        assert_eq!(current, next);
        assert_eq!(current.column_names(), vec!["other"]);
    }

    #[test]
    fn test_empty_schema_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace(&Snapshot::empty()).unwrap();
        assert_eq!(store.current().unwrap(), Snapshot::empty());
    }

    #[test]
    fn test_rejects_reserved_table_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.db");
        assert!(matches!(
            SqliteStore::open_with_table(&path, "sqlite_master"),
            Err(StoreError::InvalidTableName(_))
        ));
        assert!(matches!(
            SqliteStore::open_with_table(&path, ""),
            Err(StoreError::InvalidTableName(_))
        ));
    }

    #[test]
    fn test_corrupt_fingerprint() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TABLE data (hashid TEXT PRIMARY KEY, name TEXT);
                 INSERT INTO data VALUES ('not-a-digest', NULL);",
            )
            .unwrap();
        assert!(matches!(store.current(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_cell_encoding() {
        assert_eq!(encode_cell(&CellValue::Null).unwrap(), Value::Null);
        assert_eq!(
            encode_cell(&CellValue::Int(42)).unwrap(),
            Value::Text(r#"{"t":"int","v":42}"#.to_string())
        );
        let decoded = decode_cell(ValueRef::Text(br#"{"t":"float","v":"inf"}"#), "x").unwrap();
        assert_eq!(decoded, CellValue::Float(f64::INFINITY));
    }
}

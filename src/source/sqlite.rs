//! SQLite source: sightings read from a table, opened read-only.
//!
//! Flat tables carry one row per sighting:
//!
//! ```text
//! person_id | person_name | camera_id | timestamp
//! ```
//!
//! Embedded tables carry one row per entity, visits as a JSON array:
//!
//! ```text
//! id | person_name | visits
//! ```

use std::path::PathBuf;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::{debug, warn};

use crate::model::{AdapterKind, Batch, EmbeddedSighting, FlatSighting, SensorVisit};

use super::{RecordSource, Result, SourceError};

/// The table read when none is configured.
pub const DEFAULT_TABLE: &str = "alerts";

/// Reads sightings from a table in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    /// A source over `table` in the database at `path`.
    ///
    /// The table name is checked here, since it is spliced into SQL.
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let valid = table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(SourceError::InvalidTable(table));
        }
        Ok(Self {
            path: path.into(),
            table,
        })
    }

    fn open(&self) -> Result<Connection> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
            SourceError::Unavailable(format!("failed to open {}: {e}", self.path.display()))
        })
    }

    fn fetch_flat(&self, conn: &Connection) -> Result<Vec<FlatSighting>> {
        let sql = format!(
            "SELECT person_id, person_name, camera_id, \"timestamp\" FROM {} ORDER BY rowid",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(FlatSighting {
                entity_id: text(row, 0)?,
                entity_label: text(row, 1)?,
                sensor_id: text(row, 2)?,
                timestamp_text: text(row, 3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn fetch_embedded(&self, conn: &Connection) -> Result<Vec<EmbeddedSighting>> {
        let sql = format!(
            "SELECT id, person_name, visits FROM {} ORDER BY rowid",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((text(row, 0)?, text(row, 1)?, text(row, 2)?)))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, entity_label, visits) = row?;
            let Some(record_id) = id else {
                warn!(table = %self.table, "skipping row without an id");
                continue;
            };
            let visits = match visits.as_deref().map(SensorVisit::list_from_json) {
                None => Vec::new(),
                Some(Ok(visits)) => visits,
                Some(Err(error)) => {
                    // The entity is kept; its trail will be empty.
                    warn!(record = %record_id, %error, "unreadable visits column");
                    Vec::new()
                }
            };
            records.push(EmbeddedSighting {
                record_id,
                entity_label,
                visits,
            });
        }
        Ok(records)
    }
}

impl RecordSource for SqliteSource {
    fn fetch(&self, kind: AdapterKind) -> Result<Batch> {
        let conn = self.open()?;
        let batch = match kind {
            AdapterKind::Flat => Batch::Flat(self.fetch_flat(&conn)?),
            AdapterKind::Embedded => Batch::Embedded(self.fetch_embedded(&conn)?),
        };
        debug!(table = %self.table, rows = batch.len(), "read SQLite records");
        Ok(batch)
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.path.display(), self.table)
    }
}

/// Read a column as text whatever its storage class. NULL reads as `None`.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

//! Record sources: where a batch of sightings comes from.
//!
//! A source hands the engine one finite snapshot per call, all of the shape
//! the engine asks for. Sources are passed in explicitly; nothing here holds
//! a process-wide connection.
//!
//! ```text
//! InMemorySource   a batch already in hand
//! JsonFileSource   a JSON array or JSON Lines file
//! SqliteSource     a table in a SQLite database, opened read-only
//! ```

mod json;
mod sqlite;

use std::io;

pub use json::JsonFileSource;
pub use sqlite::{DEFAULT_TABLE, SqliteSource};

use crate::model::{AdapterKind, Batch};

/// Errors that make a source unable to produce a batch.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Unavailable(String),

    #[error("invalid table name: {0:?}")]
    InvalidTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, SourceError>;

/// Supplies a batch of raw sightings.
pub trait RecordSource {
    /// Fetch the whole batch, decoded as records of the given shape.
    fn fetch(&self, kind: AdapterKind) -> Result<Batch>;

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;
}

/// A source over a batch that is already in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    batch: Batch,
}

impl InMemorySource {
    pub fn new(batch: Batch) -> Self {
        Self { batch }
    }
}

impl RecordSource for InMemorySource {
    /// Returns the held batch as-is, whatever its shape.
    fn fetch(&self, _kind: AdapterKind) -> Result<Batch> {
        Ok(self.batch.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory {} records", self.batch.len(), self.batch.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::FlatSighting;

    #[test]
    fn in_memory_returns_its_batch() {
        let batch = Batch::Flat(vec![FlatSighting::default()]);
        let source = InMemorySource::new(batch.clone());

        assert_eq!(source.fetch(AdapterKind::Flat).unwrap(), batch);
        assert_eq!(source.describe(), "1 in-memory flat records");
    }
}

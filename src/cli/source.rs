//! Record source selection from flags and config.

use std::path::PathBuf;

use clap::Args;
use trailmap::config::{Config, SourceConfig};
use trailmap::source::{JsonFileSource, RecordSource, SqliteSource};

/// Where to read sightings from. Flags win over the configured source.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// A JSON array or JSON Lines file of records.
    #[arg(long, conflicts_with = "sqlite")]
    input: Option<PathBuf>,

    /// A SQLite database holding the records.
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Table to read from `--sqlite` (default `alerts`).
    #[arg(long, requires = "sqlite")]
    table: Option<String>,
}

impl SourceArgs {
    /// Build the record source named by flags, falling back to config.
    pub(super) fn resolve(&self, config: &Config) -> Result<Box<dyn RecordSource>, String> {
        if let Some(path) = &self.input {
            return Ok(Box::new(JsonFileSource::new(path.clone())));
        }
        if let Some(path) = &self.sqlite {
            return sqlite(path.clone(), self.table.clone());
        }
        match &config.source {
            Some(SourceConfig::Json { path }) => Ok(Box::new(JsonFileSource::new(path.clone()))),
            Some(SourceConfig::Sqlite { path, table }) => sqlite(path.clone(), table.clone()),
            None => Err("no record source: pass --input or --sqlite, \
                 or add a [source] table to the config"
                .to_string()),
        }
    }
}

fn sqlite(path: PathBuf, table: Option<String>) -> Result<Box<dyn RecordSource>, String> {
    let table = table.unwrap_or_else(|| trailmap::source::DEFAULT_TABLE.to_string());
    let source = SqliteSource::new(path, table).map_err(|e| e.to_string())?;
    Ok(Box::new(source))
}

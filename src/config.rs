//! trailmap configuration.
//!
//! Loaded from `--config <path>` or `~/.trailmap/config.toml`. A missing
//! default file means defaults; a missing explicit file is an error.
//!
//! ```toml
//! adapter = "embedded"
//!
//! [source]
//! kind = "sqlite"
//! path = "/var/lib/trailmap/alerts.sqlite"
//! table = "tracks"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::AdapterKind;

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// trailmap configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// The record shape sources are read as.
    pub adapter: AdapterKind,

    /// Where records come from when no source is given on the command line.
    pub source: Option<SourceConfig>,
}

/// A configured record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceConfig {
    /// A JSON array or JSON Lines file.
    Json { path: PathBuf },

    /// A table in a SQLite database. Defaults to the `alerts` table.
    Sqlite {
        path: PathBuf,
        table: Option<String>,
    },
}

impl Config {
    /// Load config from `explicit`, or from the default path if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::path() {
            Some(path) if path.exists() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The default config file path: `~/.trailmap/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".trailmap").join("config.toml"))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

//! JSON file source: an exported array of records, or one record per line.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{AdapterKind, Batch};

use super::{RecordSource, Result, SourceError};

/// Reads sightings from a JSON file.
///
/// The file is either a single JSON array of records or JSON Lines. A file
/// that is not valid JSON fails the fetch. A well-formed value that does not
/// decode as a record of the requested shape is skipped with a warning.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self, kind: AdapterKind) -> Result<Batch> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            SourceError::Unavailable(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let values = read_values(&text)?;
        debug!(path = %self.path.display(), values = values.len(), "read JSON records");

        Ok(match kind {
            AdapterKind::Flat => Batch::Flat(decode_records(values)),
            AdapterKind::Embedded => Batch::Embedded(decode_records(values)),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Split file contents into JSON values: one array, or one value per line.
fn read_values(text: &str) -> Result<Vec<Value>> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }

    let mut values = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            values.push(serde_json::from_str(line)?);
        }
    }
    Ok(values)
}

fn decode_records<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(record = i, %error, "skipping undecodable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::Engine;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_json_array() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "alerts.json",
            r#"[
                {"personId":"p1","personName":"Alice","cameraId":"cam1","timestamp":"2024-01-01T09:00:00"},
                {"personId":"p2","personName":"Bob","cameraId":"cam2","timestamp":"2024-01-01T09:05:00"}
            ]"#,
        );

        let batch = JsonFileSource::new(path).fetch(AdapterKind::Flat).unwrap();
        assert_eq!(batch.kind(), AdapterKind::Flat);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn reads_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "alerts.jsonl",
            "{\"_id\":\"r1\",\"personName\":\"Bob\",\"visits\":[]}\n\n{\"_id\":\"r2\",\"visits\":[]}\n",
        );

        let batch = JsonFileSource::new(path).fetch(AdapterKind::Embedded).unwrap();
        match batch {
            Batch::Embedded(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].record_id, "r2");
            }
            Batch::Flat(_) => panic!("expected embedded batch"),
        }
    }

    #[test]
    fn skips_records_of_the_wrong_shape() {
        let dir = TempDir::new().unwrap();
        // The second line has no record id, so it cannot be an embedded record.
        let path = write(
            &dir,
            "alerts.jsonl",
            "{\"_id\":\"r1\",\"visits\":[]}\n{\"personName\":\"Bob\"}\n",
        );

        let batch = JsonFileSource::new(path).fetch(AdapterKind::Embedded).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn embedded_file_keeps_every_entity() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.jsonl",
            concat!(
                r#"{"_id":"r1","personName":"Bob","visits":[{"cameraId":"c1","timestamp":"2024-02-01T00:00:00.000000Z"},{"cameraId":"c2","timestamp":1706745600}]}"#,
                "\n",
                r#"{"_id":{"$oid":"65b0"},"personName":"Eve","visits":[]}"#,
                "\n",
                r#"{"_id":"r3","personName":"Dan"}"#,
                "\n",
            ),
        );
        let result = Engine::new(AdapterKind::Embedded)
            .run(&JsonFileSource::new(path))
            .unwrap();

        let ids: Vec<&str> = result
            .trails
            .iter()
            .filter_map(|t| t.entity_id.as_deref())
            .collect();
        assert_eq!(ids, ["r1", "65b0", "r3"]);
        assert_eq!(result.trails[0].path.len(), 1);
        assert!(result.trails[1].path.is_empty());
        assert!(result.trails[2].path.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn flat_file_counts_wrongly_typed_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "alerts.json",
            r#"[
                {"personId":"p1","personName":"Alice","cameraId":"cam1","timestamp":"2024-01-01T09:00:00"},
                {"personId":"p1","personName":"Alice","cameraId":"cam2","timestamp":{"$date":"2024-01-01T09:05:00Z"}},
                {"personId":"p2","personName":"Bob","cameraId":7,"timestamp":1704099900}
            ]"#,
        );
        let result = Engine::new(AdapterKind::Flat)
            .run(&JsonFileSource::new(path))
            .unwrap();

        assert_eq!(result.records, 3);
        assert_eq!(result.trails.len(), 2);
        assert_eq!(result.trails[0].path.len(), 1);
        assert!(result.trails[1].path.is_empty());
        assert_eq!(result.skipped, 2);
    }

    #[test]
    fn invalid_json_fails_the_fetch() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "alerts.json", "[{\"personId\":");

        let err = JsonFileSource::new(path).fetch(AdapterKind::Flat).unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(dir.path().join("nope.json"));

        let err = source.fetch(AdapterKind::Flat).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }

    #[test]
    fn empty_file_is_an_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "alerts.jsonl", "");

        let batch = JsonFileSource::new(path).fetch(AdapterKind::Flat).unwrap();
        assert!(batch.is_empty());
    }
}

//! Sightings: raw records of an entity seen by a sensor.
//!
//! Records decode from the alert documents' own field names (`personId`,
//! `cameraId`, `timestamp`, `_id`, ...) as well as the generic names
//! (`entityId`, `sensorId`, `timestampText`, `recordId`, ...).
//!
//! Decoding is lenient below the record level. A field of the wrong JSON type
//! never rejects its record: ids and names that are not text read as absent,
//! and a non-text timestamp keeps its raw JSON so it fails to parse later and
//! is counted like any other malformed visit.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::timestamp::TimestampFormat;

/// Which record shape a batch carries, and so which adapter normalizes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    /// One record per observation, keyed by an explicit entity id.
    #[default]
    Flat,

    /// One record per entity, embedding all of its visits, keyed by the
    /// record's own id.
    Embedded,
}

impl AdapterKind {
    /// The timestamp encoding this adapter's records use.
    pub fn timestamp_format(self) -> TimestampFormat {
        match self {
            Self::Flat => TimestampFormat::Naive,
            Self::Embedded => TimestampFormat::UtcMicros,
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Embedded => f.write_str("embedded"),
        }
    }
}

/// A single observation: one entity, one sensor, one time.
///
/// Every field may be absent in stored data. Missing identity is grouped
/// like any other identity; missing sensor or timestamp becomes a visit
/// error during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSighting {
    #[serde(rename = "personId", alias = "entityId", default, deserialize_with = "lenient_id")]
    pub entity_id: Option<String>,

    #[serde(
        rename = "personName",
        alias = "entityLabel",
        default,
        deserialize_with = "lenient_label"
    )]
    pub entity_label: Option<String>,

    #[serde(rename = "cameraId", alias = "sensorId", default, deserialize_with = "lenient_id")]
    pub sensor_id: Option<String>,

    #[serde(
        rename = "timestamp",
        alias = "timestampText",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp_text: Option<String>,
}

/// A record for one entity carrying every sensor visit it made.
///
/// The record's own id is the entity's identity: visits never span records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedSighting {
    #[serde(rename = "_id", alias = "recordId", deserialize_with = "record_id")]
    pub record_id: String,

    #[serde(
        rename = "personName",
        alias = "entityLabel",
        default,
        deserialize_with = "lenient_label"
    )]
    pub entity_label: Option<String>,

    #[serde(alias = "path", default, deserialize_with = "lenient_visits")]
    pub visits: Vec<SensorVisit>,
}

/// One entry in an embedded record's visit list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorVisit {
    #[serde(rename = "cameraId", alias = "sensorId", default, deserialize_with = "lenient_id")]
    pub sensor_id: Option<String>,

    #[serde(
        rename = "timestamp",
        alias = "timestampText",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp_text: Option<String>,
}

impl SensorVisit {
    /// Decode a JSON visit list, such as a stored `visits` column.
    ///
    /// Only text that is not JSON at all is an error. Entries that are not
    /// objects become empty visits, which normalize to a missing field; a
    /// value that is not an array holds no visits.
    pub fn list_from_json(text: &str) -> serde_json::Result<Vec<Self>> {
        Ok(visit_list(serde_json::from_str(text)?))
    }
}

fn visit_list(value: Value) -> Vec<SensorVisit> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

/// A snapshot of records, all of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    Flat(Vec<FlatSighting>),
    Embedded(Vec<EmbeddedSighting>),
}

impl Batch {
    /// An empty batch of the given shape.
    pub fn empty(kind: AdapterKind) -> Self {
        match kind {
            AdapterKind::Flat => Self::Flat(Vec::new()),
            AdapterKind::Embedded => Self::Embedded(Vec::new()),
        }
    }

    /// The adapter that normalizes this batch.
    pub fn kind(&self) -> AdapterKind {
        match self {
            Self::Flat(_) => AdapterKind::Flat,
            Self::Embedded(_) => AdapterKind::Embedded,
        }
    }

    /// Number of raw records.
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(records) => records.len(),
            Self::Embedded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accept a record id as a plain string, a number, or a Mongo extended-JSON
/// object id (`{"$oid": "..."}`).
fn record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
        ObjectId {
            #[serde(rename = "$oid")]
            oid: String,
        },
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) | RawId::ObjectId { oid: s } => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn lenient_visits<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SensorVisit>, D::Error> {
    Ok(visit_list(Value::deserialize(deserializer)?))
}

/// Text or a number; anything else reads as absent.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Text as-is, `null` as absent, any other value as its raw JSON.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_decodes_alert_field_names() {
        let json = r#"{"personId":"p1","personName":"Alice","cameraId":"cam1","timestamp":"2024-01-01T09:00:00"}"#;
        let sighting: FlatSighting = serde_json::from_str(json).unwrap();
        assert_eq!(sighting.entity_id.as_deref(), Some("p1"));
        assert_eq!(sighting.entity_label.as_deref(), Some("Alice"));
        assert_eq!(sighting.sensor_id.as_deref(), Some("cam1"));
        assert_eq!(sighting.timestamp_text.as_deref(), Some("2024-01-01T09:00:00"));
    }

    #[test]
    fn flat_decodes_generic_field_names() {
        let json = r#"{"entityId":"p1","entityLabel":"Alice","sensorId":"cam1","timestampText":"x"}"#;
        let sighting: FlatSighting = serde_json::from_str(json).unwrap();
        assert_eq!(sighting.entity_id.as_deref(), Some("p1"));
        assert_eq!(sighting.sensor_id.as_deref(), Some("cam1"));
    }

    #[test]
    fn flat_tolerates_missing_fields() {
        let sighting: FlatSighting = serde_json::from_str(r#"{"personId":"p1"}"#).unwrap();
        assert!(sighting.sensor_id.is_none());
        assert!(sighting.timestamp_text.is_none());
    }

    #[test]
    fn embedded_accepts_object_id() {
        let json = r#"{"_id":{"$oid":"65b0c0ffee"},"personName":"Bob","visits":[{"cameraId":"c1","timestamp":"t"}]}"#;
        let record: EmbeddedSighting = serde_json::from_str(json).unwrap();
        assert_eq!(record.record_id, "65b0c0ffee");
        assert_eq!(record.visits.len(), 1);
    }

    #[test]
    fn embedded_accepts_plain_and_numeric_ids() {
        let plain: EmbeddedSighting = serde_json::from_str(r#"{"recordId":"r1"}"#).unwrap();
        assert_eq!(plain.record_id, "r1");
        assert!(plain.visits.is_empty());

        let numeric: EmbeddedSighting = serde_json::from_str(r#"{"_id":42}"#).unwrap();
        assert_eq!(numeric.record_id, "42");
    }

    #[test]
    fn embedded_requires_an_id() {
        let result = serde_json::from_str::<EmbeddedSighting>(r#"{"personName":"Bob"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn flat_wrong_field_types_keep_the_record() {
        let json = r#"{"personId":17,"personName":["Alice"],"cameraId":{"x":1},"timestamp":{"$date":"2024-01-01T09:00:00Z"}}"#;
        let sighting: FlatSighting = serde_json::from_str(json).unwrap();
        assert_eq!(sighting.entity_id.as_deref(), Some("17"));
        assert!(sighting.entity_label.is_none());
        assert!(sighting.sensor_id.is_none());
        assert_eq!(
            sighting.timestamp_text.as_deref(),
            Some(r#"{"$date":"2024-01-01T09:00:00Z"}"#)
        );
    }

    #[test]
    fn embedded_bad_entries_spare_their_siblings() {
        let json = r#"{"_id":"r1","visits":[
            {"cameraId":"c1","timestamp":"2024-02-01T00:00:00.000000Z"},
            {"cameraId":"c2","timestamp":1706745600},
            "c3",
            {"cameraId":"c4","timestamp":null}
        ]}"#;
        let record: EmbeddedSighting = serde_json::from_str(json).unwrap();

        assert_eq!(record.visits.len(), 4);
        assert_eq!(record.visits[0].timestamp_text.as_deref(), Some("2024-02-01T00:00:00.000000Z"));
        assert_eq!(record.visits[1].timestamp_text.as_deref(), Some("1706745600"));
        assert_eq!(record.visits[2], SensorVisit::default());
        assert!(record.visits[3].timestamp_text.is_none());
    }

    #[test]
    fn embedded_visits_that_are_not_a_list_are_empty() {
        let record: EmbeddedSighting =
            serde_json::from_str(r#"{"_id":"r1","visits":"none"}"#).unwrap();
        assert!(record.visits.is_empty());
    }

    #[test]
    fn visit_list_from_stored_json() {
        let visits = SensorVisit::list_from_json(
            r#"[{"cameraId":"c1","timestamp":"t"},{"cameraId":"c2","timestamp":5}]"#,
        )
        .unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[1].timestamp_text.as_deref(), Some("5"));

        assert!(SensorVisit::list_from_json("not json").is_err());
    }

    #[test]
    fn adapters_pick_their_timestamp_format() {
        assert_eq!(AdapterKind::Flat.timestamp_format(), TimestampFormat::Naive);
        assert_eq!(AdapterKind::Embedded.timestamp_format(), TimestampFormat::UtcMicros);
    }

    #[test]
    fn batch_reports_kind_and_len() {
        let batch = Batch::Flat(vec![FlatSighting::default(); 3]);
        assert_eq!(batch.kind(), AdapterKind::Flat);
        assert_eq!(batch.len(), 3);
        assert!(Batch::empty(AdapterKind::Embedded).is_empty());
    }
}

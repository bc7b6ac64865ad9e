//! Trails: an entity's sensor visits in time order.

use jiff::SignedDuration;
use serde::{Serialize, Serializer};

use crate::timestamp::Instant;

/// An entity's reconstructed movement.
///
/// Serializes to the shape consumers expect:
/// `{personId, personName, path: [{cameraId, timestamp}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trail {
    #[serde(rename = "personId")]
    pub entity_id: Option<String>,

    #[serde(rename = "personName")]
    pub entity_label: Option<String>,

    /// Sorted non-decreasing by instant.
    pub path: Vec<Waypoint>,
}

/// A sensor visit that made it onto a trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Waypoint {
    #[serde(rename = "cameraId")]
    pub sensor_id: String,

    #[serde(rename = "timestamp")]
    pub instant: Instant,
}

/// Movement between two consecutive waypoints of a trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
    pub from: String,
    pub to: String,

    #[serde(rename = "elapsedSeconds", serialize_with = "seconds")]
    pub elapsed: SignedDuration,
}

impl Trail {
    /// Consecutive waypoint pairs and the time taken between them.
    ///
    /// Empty for paths with fewer than two waypoints.
    pub fn hops(&self) -> Vec<Hop> {
        self.path
            .windows(2)
            .map(|pair| Hop {
                from: pair[0].sensor_id.clone(),
                to: pair[1].sensor_id.clone(),
                elapsed: pair[0]
                    .instant
                    .datetime()
                    .duration_until(pair[1].instant.datetime()),
            })
            .collect()
    }

    /// When the entity was first seen, if ever.
    pub fn first_seen(&self) -> Option<Instant> {
        self.path.first().map(|w| w.instant)
    }

    /// When the entity was last seen, if ever.
    pub fn last_seen(&self) -> Option<Instant> {
        self.path.last().map(|w| w.instant)
    }
}

fn seconds<S: Serializer>(elapsed: &SignedDuration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::timestamp::{self, TimestampFormat};

    fn waypoint(sensor: &str, text: &str) -> Waypoint {
        Waypoint {
            sensor_id: sensor.into(),
            instant: timestamp::parse(text, TimestampFormat::Naive).unwrap(),
        }
    }

    fn sample_trail() -> Trail {
        Trail {
            entity_id: Some("p1".into()),
            entity_label: Some("Alice".into()),
            path: vec![
                waypoint("cam1", "2024-01-01T09:00:00"),
                waypoint("cam2", "2024-01-01T09:01:30"),
                waypoint("cam3", "2024-01-01T10:01:30"),
            ],
        }
    }

    #[test]
    fn hops_pair_consecutive_waypoints() {
        let hops = sample_trail().hops();
        assert_eq!(hops.len(), 2);
        assert_eq!((hops[0].from.as_str(), hops[0].to.as_str()), ("cam1", "cam2"));
        assert_eq!(hops[0].elapsed, SignedDuration::from_secs(90));
        assert_eq!(hops[1].elapsed, SignedDuration::from_secs(3600));
    }

    #[test]
    fn short_paths_have_no_hops() {
        let mut trail = sample_trail();
        trail.path.truncate(1);
        assert!(trail.hops().is_empty());
        trail.path.clear();
        assert!(trail.hops().is_empty());
        assert!(trail.first_seen().is_none());
    }

    #[test]
    fn first_and_last_seen() {
        let trail = sample_trail();
        assert_eq!(trail.first_seen().unwrap().to_string(), "2024-01-01T09:00:00");
        assert_eq!(trail.last_seen().unwrap().to_string(), "2024-01-01T10:01:30");
    }

    #[test]
    fn serializes_to_consumer_shape() {
        let mut trail = sample_trail();
        trail.path.truncate(1);
        let json = serde_json::to_value(&trail).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "personId": "p1",
                "personName": "Alice",
                "path": [{"cameraId": "cam1", "timestamp": "2024-01-01T09:00:00"}],
            })
        );
    }

    #[test]
    fn hop_serializes_elapsed_seconds() {
        let json = serde_json::to_value(&sample_trail().hops()[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"from": "cam1", "to": "cam2", "elapsedSeconds": 90.0})
        );
    }
}

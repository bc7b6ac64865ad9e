//! Trail ordering: drop unusable visits and sort the rest by time.

use tracing::warn;

use crate::aggregate::{BagEntry, EntityBag};
use crate::model::{Trail, VisitError, Waypoint};

/// A trail together with how many of its visits were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedTrail {
    pub trail: Trail,
    pub skipped: usize,
}

/// Turn an entity's bag into its trail.
///
/// Visits that failed to normalize are logged, counted, and left out.
/// The remainder is stable-sorted by instant, so simultaneous visits keep
/// their input order. An entity whose every visit failed still yields a
/// trail, with an empty path.
pub fn order(bag: EntityBag) -> OrderedTrail {
    let EntityBag {
        entity_id,
        entity_label,
        visits,
    } = bag;
    let entity = entity_id.as_deref().unwrap_or("<none>");

    let mut skipped = 0;
    let mut path: Vec<Waypoint> = Vec::with_capacity(visits.len());
    for BagEntry { sensor_id, instant } in visits {
        match (sensor_id, instant) {
            (Some(sensor_id), Ok(instant)) => path.push(Waypoint { sensor_id, instant }),
            (sensor_id, Err(error)) => {
                warn!(entity, sensor = sensor_id.as_deref(), %error, "dropping visit");
                skipped += 1;
            }
            (None, Ok(_)) => {
                warn!(entity, error = %VisitError::MissingField("cameraId"), "dropping visit");
                skipped += 1;
            }
        }
    }

    path.sort_by(|a, b| a.instant.cmp(&b.instant));

    OrderedTrail {
        trail: Trail {
            entity_id,
            entity_label,
            path,
        },
        skipped,
    }
}

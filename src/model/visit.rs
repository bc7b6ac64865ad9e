//! Normalized visits: every record shape reduced to one canonical form.

use crate::timestamp::{Instant, TimestampError};

/// One entity seen at one sensor, in canonical shape.
///
/// A visit whose sensor or timestamp could not be read still carries its
/// identity, so it groups with its entity before being dropped from the
/// trail. `instant` is an error whenever `sensor_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVisit {
    /// Grouping key. `None` when a flat record carries no entity id.
    pub entity_id: Option<String>,
    pub entity_label: Option<String>,
    pub sensor_id: Option<String>,
    pub instant: Result<Instant, VisitError>,
}

/// Why a single visit cannot be placed on a trail.
///
/// Local to one visit: never fatal to its entity or its batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisitError {
    #[error(transparent)]
    MalformedTimestamp(#[from] TimestampError),

    #[error("missing field: {0}")]
    MissingField(&'static str),
}

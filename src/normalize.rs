//! Record normalization: raw sightings into canonical visits.
//!
//! Each adapter reduces its record shape to [`NormalizedVisit`]s. Per-visit
//! failures are captured in the visit's `instant`, never returned, so one
//! bad record cannot abort a batch.

use crate::model::{Batch, EmbeddedSighting, FlatSighting, NormalizedVisit, SensorVisit, VisitError};
use crate::timestamp::{self, Instant, TimestampFormat};

/// Normalize every record in a batch, keeping record order.
///
/// With the `parallel` feature, records are normalized across threads;
/// output order is the same either way.
pub fn normalize(batch: &Batch) -> Vec<NormalizedVisit> {
    let format = batch.kind().timestamp_format();
    match batch {
        Batch::Flat(records) => each_record(records, |r| [normalize_flat(r, format)]),
        Batch::Embedded(records) => each_record(records, |r| normalize_embedded(r, format)),
    }
}

/// The entities a batch names regardless of their visits, in record order,
/// as `(entity id, label)`.
///
/// An embedded record is its entity, so it is named even when its visit list
/// is empty or unreadable. Flat records exist only as visits and name nothing
/// extra.
pub fn declared_entities(batch: &Batch) -> Vec<(Option<String>, Option<String>)> {
    match batch {
        Batch::Flat(_) => Vec::new(),
        Batch::Embedded(records) => records
            .iter()
            .map(|r| (Some(r.record_id.clone()), r.entity_label.clone()))
            .collect(),
    }
}

/// A flat record yields exactly one visit.
pub fn normalize_flat(record: &FlatSighting, format: TimestampFormat) -> NormalizedVisit {
    NormalizedVisit {
        entity_id: record.entity_id.clone(),
        entity_label: record.entity_label.clone(),
        sensor_id: record.sensor_id.clone(),
        instant: read_instant(
            record.sensor_id.as_deref(),
            record.timestamp_text.as_deref(),
            format,
        ),
    }
}

/// An embedded record yields one visit per entry, each parsed on its own.
///
/// The record id becomes every visit's entity id.
pub fn normalize_embedded(record: &EmbeddedSighting, format: TimestampFormat) -> Vec<NormalizedVisit> {
    record
        .visits
        .iter()
        .map(|SensorVisit { sensor_id, timestamp_text }| NormalizedVisit {
            entity_id: Some(record.record_id.clone()),
            entity_label: record.entity_label.clone(),
            sensor_id: sensor_id.clone(),
            instant: read_instant(sensor_id.as_deref(), timestamp_text.as_deref(), format),
        })
        .collect()
}

fn read_instant(
    sensor_id: Option<&str>,
    timestamp_text: Option<&str>,
    format: TimestampFormat,
) -> Result<Instant, VisitError> {
    if sensor_id.is_none() {
        return Err(VisitError::MissingField("cameraId"));
    }
    let text = timestamp_text.ok_or(VisitError::MissingField("timestamp"))?;
    Ok(timestamp::parse(text, format)?)
}

#[cfg(not(feature = "parallel"))]
fn each_record<R, I, F>(records: &[R], f: F) -> Vec<NormalizedVisit>
where
    F: Fn(&R) -> I,
    I: IntoIterator<Item = NormalizedVisit>,
{
    records.iter().flat_map(f).collect()
}

#[cfg(feature = "parallel")]
fn each_record<R, I, F>(records: &[R], f: F) -> Vec<NormalizedVisit>
where
    R: Sync,
    F: Fn(&R) -> I + Sync + Send,
    I: IntoIterator<Item = NormalizedVisit>,
{
    use rayon::prelude::*;

    records.par_iter().flat_map_iter(f).collect()
}

//! Core data model for trailmap.
//!
//! These types follow a batch through the pipeline: raw sightings in,
//! normalized visits in the middle, ordered trails out.

mod sighting;
mod trail;
mod visit;

pub use sighting::{AdapterKind, Batch, EmbeddedSighting, FlatSighting, SensorVisit};
pub use trail::{Hop, Trail, Waypoint};
pub use visit::{NormalizedVisit, VisitError};

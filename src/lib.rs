//! Movement-trail reconstruction from sensor sightings.
//!
//! A batch of sightings (an entity seen by a sensor at a time) goes in; one
//! time-ordered trail per entity comes out. Records come in two shapes,
//! flat (one row per sighting) and embedded (one document per entity with
//! its visits inside), and each is reduced to the same canonical visit
//! before grouping and ordering.
//!
//! Malformed visits are dropped from their trail and counted. They never
//! drop their entity or fail the batch. Only a source that cannot produce
//! a batch at all fails a call.
//!
//! ```
//! use trailmap::model::{Batch, FlatSighting};
//!
//! let batch = Batch::Flat(vec![FlatSighting {
//!     entity_id: Some("p1".into()),
//!     entity_label: Some("Alice".into()),
//!     sensor_id: Some("cam1".into()),
//!     timestamp_text: Some("2024-01-01T09:00:00".into()),
//! }]);
//!
//! let result = trailmap::reconstruct(&batch);
//! assert_eq!(result.trails[0].path[0].sensor_id, "cam1");
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod model;
pub mod normalize;
pub mod order;
pub mod query;
pub mod source;
pub mod timestamp;

pub use engine::{Engine, EngineError, Reconstruction, reconstruct};
pub use query::TrailQuery;

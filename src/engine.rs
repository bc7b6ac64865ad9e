//! The reconstruction engine: normalize, aggregate, order.
//!
//! ```text
//! Batch ──normalize──▶ visits ──aggregate──▶ bags ──order──▶ trails
//! ```
//!
//! [`reconstruct`] is total: malformed records shorten trails, they never
//! fail the batch. [`Engine::run`] adds the fetch from a [`RecordSource`],
//! which is the only step that can fail a call.

use tracing::{debug, info};

use crate::aggregate::{Aggregator, EntityBag};
use crate::model::{AdapterKind, Batch, Trail};
use crate::normalize;
use crate::order::{self, OrderedTrail};
use crate::source::{RecordSource, SourceError};

/// The outcome of reconstructing one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// One trail per entity, in the order entities were first seen.
    pub trails: Vec<Trail>,

    /// Raw records in the batch.
    pub records: usize,

    /// Normalized visits, usable or not.
    pub visits: usize,

    /// Visits dropped for a missing field or a malformed timestamp.
    pub skipped: usize,
}

/// A failure that leaves no batch to reconstruct.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("source returned {found} records, expected {expected}")]
    ShapeMismatch {
        expected: AdapterKind,
        found: AdapterKind,
    },
}

impl EngineError {
    /// Stable machine-readable kind, for error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "sourceUnavailable",
            Self::ShapeMismatch { .. } => "shapeMismatch",
        }
    }
}

/// Runs reconstruction over batches fetched with a fixed adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    adapter: AdapterKind,
}

impl Engine {
    pub fn new(adapter: AdapterKind) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> AdapterKind {
        self.adapter
    }

    /// Fetch a batch from `source` and reconstruct it.
    ///
    /// Either every trail comes back or a single error does.
    pub fn run(&self, source: &dyn RecordSource) -> Result<Reconstruction, EngineError> {
        let batch = source.fetch(self.adapter)?;
        if batch.kind() != self.adapter {
            return Err(EngineError::ShapeMismatch {
                expected: self.adapter,
                found: batch.kind(),
            });
        }

        let result = reconstruct(&batch);
        info!(
            source = %source.describe(),
            adapter = %self.adapter,
            records = result.records,
            trails = result.trails.len(),
            skipped = result.skipped,
            "reconstructed trails"
        );
        Ok(result)
    }
}

/// Reconstruct every entity's trail from a batch.
///
/// A pure function of the batch: the same input always yields the same
/// output, including trail order.
pub fn reconstruct(batch: &Batch) -> Reconstruction {
    let visits = normalize::normalize(batch);
    let visit_count = visits.len();
    debug!(records = batch.len(), visits = visit_count, "normalized batch");

    let mut aggregator = Aggregator::default();
    for (entity_id, entity_label) in normalize::declared_entities(batch) {
        aggregator.declare(entity_id, entity_label);
    }
    for visit in visits {
        aggregator.push(visit);
    }
    let bags = aggregator.finish();
    debug!(entities = bags.len(), "aggregated visits");

    let ordered = order_all(bags);
    let skipped = ordered.iter().map(|o| o.skipped).sum();

    Reconstruction {
        trails: ordered.into_iter().map(|o| o.trail).collect(),
        records: batch.len(),
        visits: visit_count,
        skipped,
    }
}

#[cfg(not(feature = "parallel"))]
fn order_all(bags: Vec<EntityBag>) -> Vec<OrderedTrail> {
    bags.into_iter().map(order::order).collect()
}

#[cfg(feature = "parallel")]
fn order_all(bags: Vec<EntityBag>) -> Vec<OrderedTrail> {
    use rayon::prelude::*;

    bags.into_par_iter().map(order::order).collect()
}

//! Trail aggregation: group normalized visits by entity.

use std::collections::HashMap;

use crate::model::{NormalizedVisit, VisitError};
use crate::timestamp::Instant;

/// Every visit seen for one entity, in input order, not yet sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBag {
    pub entity_id: Option<String>,

    /// The first label seen for this entity.
    pub entity_label: Option<String>,

    pub visits: Vec<BagEntry>,
}

/// A visit reduced to what the orderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagEntry {
    pub sensor_id: Option<String>,
    pub instant: Result<Instant, VisitError>,
}

/// Group visits by entity id.
///
/// Bags come out in the order their entity was first seen, and each bag
/// keeps its visits in input order, so the result is a pure function of
/// the input sequence. When labels disagree the first present one wins.
pub fn aggregate(visits: impl IntoIterator<Item = NormalizedVisit>) -> Vec<EntityBag> {
    let mut aggregator = Aggregator::default();
    for visit in visits {
        aggregator.push(visit);
    }
    aggregator.finish()
}

/// Incremental grouping of visits into entity bags.
///
/// Entities can be declared ahead of their visits with [`Aggregator::declare`],
/// so a record that carries an identity but no visits still gets a bag.
#[derive(Debug, Default)]
pub struct Aggregator {
    bags: Vec<EntityBag>,
    index: HashMap<Option<String>, usize>,
}

impl Aggregator {
    /// Make sure `entity_id` has a bag, without adding a visit.
    pub fn declare(&mut self, entity_id: Option<String>, entity_label: Option<String>) {
        let bag = self.bag(entity_id);
        if bag.entity_label.is_none() {
            bag.entity_label = entity_label;
        }
    }

    /// Add one visit to its entity's bag.
    pub fn push(&mut self, visit: NormalizedVisit) {
        let NormalizedVisit {
            entity_id,
            entity_label,
            sensor_id,
            instant,
        } = visit;

        let bag = self.bag(entity_id);
        if bag.entity_label.is_none() {
            bag.entity_label = entity_label;
        }
        bag.visits.push(BagEntry { sensor_id, instant });
    }

    /// The bags, in first-seen order.
    pub fn finish(self) -> Vec<EntityBag> {
        self.bags
    }

    fn bag(&mut self, entity_id: Option<String>) -> &mut EntityBag {
        let bags = &mut self.bags;
        let slot = *self.index.entry(entity_id.clone()).or_insert_with(|| {
            bags.push(EntityBag {
                entity_id,
                entity_label: None,
                visits: Vec::new(),
            });
            bags.len() - 1
        });
        &mut bags[slot]
    }
}

//! Trail search: pick out trails by entity id or label.

use crate::model::Trail;

/// A case-insensitive substring match against an entity's id or label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailQuery {
    needle: String,
}

impl TrailQuery {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    /// Whether the trail's id or label contains the query text.
    ///
    /// An empty query matches everything.
    pub fn matches(&self, trail: &Trail) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [trail.entity_id.as_deref(), trail.entity_label.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Keep only the matching trails, in their existing order.
    pub fn filter(&self, trails: Vec<Trail>) -> Vec<Trail> {
        trails.into_iter().filter(|t| self.matches(t)).collect()
    }
}

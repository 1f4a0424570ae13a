//! Per-entity change summaries over a time range.

use chrono::{DateTime, Utc};
use oxrdf::NamedNode;

use super::UpdateDiff;

/// A later snapshot's recorded change.
#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    pub at: DateTime<Utc>,
    pub snapshot: u32,
    pub diff: UpdateDiff,
    pub description: Option<String>,
}

/// What happened to one entity inside the queried range.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChanges {
    pub entity: NamedNode,
    pub created: Option<DateTime<Utc>>,
    /// Ordered by time.
    pub modified: Vec<Modification>,
    pub deleted: Option<DateTime<Utc>>,
}

impl EntityChanges {
    pub fn new(entity: NamedNode) -> Self {
        Self {
            entity,
            created: None,
            modified: Vec::new(),
            deleted: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.modified.is_empty() && self.deleted.is_none()
    }
}

/// Change summaries for every entity that changed, ordered by entity IRI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    pub entries: Vec<EntityChanges>,
}

impl ChangeLog {
    pub fn get(&self, entity: &NamedNode) -> Option<&EntityChanges> {
        self.entries.iter().find(|e| &e.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

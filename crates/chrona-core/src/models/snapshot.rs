//! Snapshot records: one version of a provenance-tracked entity.

use chrono::{DateTime, Utc};
use oxrdf::{NamedNode, Triple};

use super::{TimeInterval, TripleSet};

/// Triple-level change recorded with a snapshot, relative to its predecessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDiff {
    pub inserted: TripleSet,
    pub deleted: TripleSet,
}

impl UpdateDiff {
    pub fn new(inserted: TripleSet, deleted: TripleSet) -> Self {
        Self { inserted, deleted }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty()
    }

    /// The diff that undoes this one.
    pub fn inverse(&self) -> UpdateDiff {
        UpdateDiff {
            inserted: self.deleted.clone(),
            deleted: self.inserted.clone(),
        }
    }

    /// A triple both inserted and deleted makes the diff ambiguous.
    pub fn is_self_overlapping(&self) -> bool {
        let (small, large) = if self.inserted.len() <= self.deleted.len() {
            (&self.inserted, &self.deleted)
        } else {
            (&self.deleted, &self.inserted)
        };
        small.iter().any(|t| large.contains(t))
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.inserted.iter().chain(self.deleted.iter())
    }

    pub fn touches_predicate(&self, predicate: &NamedNode) -> bool {
        self.triples().any(|t| &t.predicate == predicate)
    }
}

/// Opaque descriptive metadata carried by a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    /// IRI of the snapshot resource itself, when loaded from RDF.
    pub iri: Option<NamedNode>,
    pub responsible_agent: Option<String>,
    pub primary_source: Option<String>,
    pub description: Option<String>,
}

/// One version of an entity, valid over `[generation_time, invalidation_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub entity: NamedNode,
    /// Position in the entity's chain, starting at 1.
    pub number: u32,
    pub generation_time: DateTime<Utc>,
    /// `None` for the current version.
    pub invalidation_time: Option<DateTime<Utc>>,
    /// Change relative to snapshot `number - 1`. Absent on snapshot 1; absent
    /// on a later snapshot means the triples did not change.
    pub update: Option<UpdateDiff>,
    /// Full triple set of snapshot 1, when the source recorded it.
    pub initial_triples: Option<TripleSet>,
    pub metadata: SnapshotMetadata,
}

impl SnapshotRecord {
    pub fn new(entity: NamedNode, number: u32, generation_time: DateTime<Utc>) -> Self {
        Self {
            entity,
            number,
            generation_time,
            invalidation_time: None,
            update: None,
            initial_triples: None,
            metadata: SnapshotMetadata::default(),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.generation_time, self.invalidation_time)
    }

    pub fn is_current(&self) -> bool {
        self.invalidation_time.is_none()
    }
}

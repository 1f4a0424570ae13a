//! Materialized states and per-interval query results.

use std::sync::Arc;

use oxrdf::NamedNode;

use super::{ResultSet, TimeInterval, TripleSet};

/// Triples valid throughout `valid`, for one entity or a union of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedState {
    pub triples: Arc<TripleSet>,
    pub valid: TimeInterval,
    /// Entity and snapshot number of every contributing version.
    pub sources: Vec<(NamedNode, u32)>,
}

impl MaterializedState {
    pub fn for_snapshot(
        entity: NamedNode,
        snapshot: u32,
        valid: TimeInterval,
        triples: Arc<TripleSet>,
    ) -> Self {
        Self {
            triples,
            valid,
            sources: vec![(entity, snapshot)],
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// One maximal interval of constant query answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSlice {
    pub interval: TimeInterval,
    pub results: ResultSet,
    /// Candidate entities with no snapshot covering this interval. Only
    /// populated under the gap-as-empty coverage policy.
    pub uncovered: Vec<NamedNode>,
}

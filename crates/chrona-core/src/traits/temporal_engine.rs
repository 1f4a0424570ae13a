use chrono::{DateTime, Utc};
use oxrdf::NamedNode;

use crate::errors::ChronaResult;
use crate::models::{
    ChangeLog, Delta, EntityVersion, MaterializedState, TemporalSlice, TimeInterval,
    TriplePattern,
};

/// Temporal reconstruction and query over a provenance-tracked graph.
pub trait ITemporalEngine: Send + Sync {
    /// State of `entity` at instant `at`.
    fn materialize(&self, entity: &NamedNode, at: DateTime<Utc>)
        -> ChronaResult<MaterializedState>;

    /// Triples added and removed for `entity` between `from` and `to`.
    fn delta(
        &self,
        entity: &NamedNode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ChronaResult<Delta>;

    /// Union of candidate-entity deltas restricted to pattern-shaped triples.
    fn delta_for_patterns(
        &self,
        patterns: &[TriplePattern],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ChronaResult<Delta>;

    /// Maximal intervals of constant answer partitioning `range`.
    fn evaluate_across_time(
        &self,
        patterns: &[TriplePattern],
        range: TimeInterval,
    ) -> ChronaResult<Vec<TemporalSlice>>;

    /// Every version of `entity`, oldest first.
    fn history(&self, entity: &NamedNode) -> ChronaResult<Vec<EntityVersion>>;

    /// Creation, modification and deletion events inside `range`.
    fn change_log(
        &self,
        patterns: &[TriplePattern],
        range: TimeInterval,
        changed_properties: &[NamedNode],
    ) -> ChronaResult<ChangeLog>;
}

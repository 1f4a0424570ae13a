//! Temporal query module: point-in-time, delta, across-time, history and
//! change-log queries.

pub mod across_time;
pub mod as_of;
pub mod breakpoints;
pub mod changes;
pub mod diff;
pub mod discovery;
pub mod history;
pub mod integrity;

pub use across_time::{AcrossTime, AcrossTimeIter};
pub use as_of::{execute_as_of, materialize_union, UnionState};
pub use changes::execute_change_log;
pub use diff::{execute_delta, execute_pattern_delta};
pub use history::{execute_history, execute_related_history, execute_versions_within};
pub use integrity::{verify_all, verify_entity};

use chrona_core::errors::ChronaResult;
use chrona_core::models::{
    ChangeLog, Delta, EntityVersion, MaterializedState, TemporalSlice, TimeInterval,
    TriplePattern,
};
use chrona_core::traits::ITemporalEngine;
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;

/// Temporal query variants that the dispatcher can route.
#[derive(Debug, Clone)]
pub enum TemporalQuery {
    /// State of one entity at an instant
    AsOf { entity: NamedNode, at: DateTime<Utc> },
    /// Triples added and removed between two instants
    Diff {
        entity: NamedNode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Pattern answers over a time range
    AcrossTime {
        patterns: Vec<TriplePattern>,
        range: TimeInterval,
    },
    /// Every version of one entity
    History { entity: NamedNode },
    /// Creation, modification and deletion events
    Changes {
        patterns: Vec<TriplePattern>,
        range: TimeInterval,
        changed_properties: Vec<NamedNode>,
    },
}

/// Result of dispatching a temporal query.
#[derive(Debug, Clone)]
pub enum TemporalQueryResult {
    State(MaterializedState),
    Delta(Delta),
    Slices(Vec<TemporalSlice>),
    Versions(Vec<EntityVersion>),
    Changes(ChangeLog),
}

/// Routes a `TemporalQuery` to the matching engine operation.
pub struct TemporalQueryDispatcher;

impl TemporalQueryDispatcher {
    pub fn dispatch<E: ITemporalEngine + ?Sized>(
        engine: &E,
        query: TemporalQuery,
    ) -> ChronaResult<TemporalQueryResult> {
        match query {
            TemporalQuery::AsOf { entity, at } => engine
                .materialize(&entity, at)
                .map(TemporalQueryResult::State),
            TemporalQuery::Diff { entity, from, to } => engine
                .delta(&entity, from, to)
                .map(TemporalQueryResult::Delta),
            TemporalQuery::AcrossTime { patterns, range } => engine
                .evaluate_across_time(&patterns, range)
                .map(TemporalQueryResult::Slices),
            TemporalQuery::History { entity } => {
                engine.history(&entity).map(TemporalQueryResult::Versions)
            }
            TemporalQuery::Changes {
                patterns,
                range,
                changed_properties,
            } => engine
                .change_log(&patterns, range, &changed_properties)
                .map(TemporalQueryResult::Changes),
        }
    }
}

//! Point-in-time materialization over several entities.

use std::sync::Arc;

use chrona_core::config::CoveragePolicy;
use chrona_core::errors::{ChronaResult, ErrorKind};
use chrona_core::models::{MaterializedState, TimeInterval, TripleSet};
use chrona_core::traits::LiveGraph;
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use rayon::prelude::*;

use crate::materialize::Materializer;

/// Union of entity states at one instant, plus the entities that had no
/// snapshot covering it.
#[derive(Debug, Clone)]
pub struct UnionState {
    pub state: MaterializedState,
    pub uncovered: Vec<NamedNode>,
}

enum Contribution {
    State(MaterializedState),
    Uncovered {
        entity: NamedNode,
        first_generation: DateTime<Utc>,
    },
}

/// Whole-graph state at `at`: the union over `entities`. Fails on the first
/// entity that cannot be materialized.
pub fn execute_as_of<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entities: &[NamedNode],
    at: DateTime<Utc>,
    parallel: bool,
) -> ChronaResult<MaterializedState> {
    materialize_union(materializer, entities, at, CoveragePolicy::FailFast, parallel)
        .map(|union| union.state)
}

/// Union of entity states at `at`. Under `GapAsEmpty`, an entity created
/// after `at` contributes no triples and is listed in `uncovered`; the
/// union's validity then ends where that entity's first snapshot begins.
pub fn materialize_union<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entities: &[NamedNode],
    at: DateTime<Utc>,
    policy: CoveragePolicy,
    parallel: bool,
) -> ChronaResult<UnionState> {
    let contribute = |entity: &NamedNode| -> ChronaResult<Contribution> {
        match materializer.materialize(entity, at) {
            Ok(state) => Ok(Contribution::State(state)),
            Err(e)
                if e.kind() == ErrorKind::NoProvenanceAtTime
                    && policy == CoveragePolicy::GapAsEmpty =>
            {
                let first = materializer.log().snapshot(entity, 1)?;
                Ok(Contribution::Uncovered {
                    entity: entity.clone(),
                    first_generation: first.generation_time,
                })
            }
            Err(e) => Err(e),
        }
    };

    let contributions: Vec<Contribution> = if parallel && entities.len() > 1 {
        entities
            .par_iter()
            .map(contribute)
            .collect::<ChronaResult<Vec<_>>>()?
    } else {
        entities
            .iter()
            .map(contribute)
            .collect::<ChronaResult<Vec<_>>>()?
    };

    let mut triples = TripleSet::default();
    let mut valid = TimeInterval::open(DateTime::<Utc>::MIN_UTC);
    let mut sources = Vec::new();
    let mut uncovered = Vec::new();
    for contribution in contributions {
        match contribution {
            Contribution::State(state) => {
                triples.extend(state.triples.iter().cloned());
                valid = valid.intersect(&state.valid).unwrap_or(valid);
                sources.extend(state.sources);
            }
            Contribution::Uncovered {
                entity,
                first_generation,
            } => {
                let gap = TimeInterval::closed(DateTime::<Utc>::MIN_UTC, first_generation);
                valid = valid.intersect(&gap).unwrap_or(valid);
                uncovered.push(entity);
            }
        }
    }

    Ok(UnionState {
        state: MaterializedState {
            triples: Arc::new(triples),
            valid,
            sources,
        },
        uncovered,
    })
}

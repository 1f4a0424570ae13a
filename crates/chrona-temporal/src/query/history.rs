//! Entity history: every reconstructed version of an entity, alone or
//! merged with the entities it links to.

use std::sync::Arc;

use chrona_core::errors::{ChronaResult, ErrorKind};
use chrona_core::models::{EntityVersion, SnapshotSummary, TimeInterval, TripleSet, VersionWindow};
use chrona_core::traits::LiveGraph;
use oxrdf::NamedNode;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::materialize::related::followable_object;
use crate::materialize::Materializer;

/// Every version of `entity`, oldest first.
pub fn execute_history<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
) -> ChronaResult<Vec<EntityVersion>> {
    let chain = materializer.log().snapshots(entity)?;
    let states = materializer.all_states(entity)?;
    Ok(chain
        .iter()
        .zip(states)
        .map(|(record, state)| EntityVersion {
            snapshot: record.number,
            interval: record.interval(),
            metadata: record.metadata.clone(),
            state,
        })
        .collect())
}

/// Versions of `entity` whose validity overlaps `range`, with the other
/// snapshots reported as summaries only. Only overlapping versions are
/// materialized.
pub fn execute_versions_within<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
    range: &TimeInterval,
) -> ChronaResult<VersionWindow> {
    let chain = materializer.log().snapshots(entity)?;
    let mut window = VersionWindow {
        versions: Vec::new(),
        others: Vec::new(),
    };
    for record in chain {
        let interval = record.interval();
        if interval.overlaps(range) {
            window.versions.push(EntityVersion {
                snapshot: record.number,
                interval,
                metadata: record.metadata.clone(),
                state: materializer.state_of(entity, record.number)?,
            });
        } else {
            window.others.push(SnapshotSummary {
                snapshot: record.number,
                interval,
                metadata: record.metadata.clone(),
            });
        }
    }
    Ok(window)
}

/// Every version of `entity`, each merged with the state every related
/// entity had when that version was generated.
///
/// Related entities are the tracked entities reachable through links in any
/// version, up to `max_depth` hops (`None` = unbounded). A related entity
/// created after a version was generated adds nothing to it.
pub fn execute_related_history<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
    max_depth: Option<usize>,
) -> ChronaResult<Vec<EntityVersion>> {
    let log = materializer.log();
    let chain = log.snapshots(entity)?;
    let states = materializer.all_states(entity)?;
    let related = related_histories(materializer, entity, &states, max_depth)?;
    debug!(entity = %entity, related = related.len(), "merging related histories");

    let mut versions = Vec::with_capacity(chain.len());
    for (record, state) in chain.iter().zip(states) {
        let mut merged = (*state).clone();
        for (other, other_states) in &related {
            let covering = match log.snapshot_covering(other, record.generation_time) {
                Ok(covering) => covering,
                Err(e) if e.kind() == ErrorKind::NoProvenanceAtTime => continue,
                Err(e) => return Err(e),
            };
            if let Some(other_state) = other_states.get(covering.number as usize - 1) {
                merged.extend(other_state.iter().cloned());
            }
        }
        versions.push(EntityVersion {
            snapshot: record.number,
            interval: record.interval(),
            metadata: record.metadata.clone(),
            state: Arc::new(merged),
        });
    }
    Ok(versions)
}

/// Breadth-first walk over links found in any version. Returns every
/// related entity with all of its states, oldest first.
fn related_histories<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
    root_states: &[Arc<TripleSet>],
    max_depth: Option<usize>,
) -> ChronaResult<Vec<(NamedNode, Vec<Arc<TripleSet>>)>> {
    let log = materializer.log();
    let mut visited: FxHashSet<NamedNode> = FxHashSet::default();
    visited.insert(entity.clone());
    let mut collected: Vec<(NamedNode, Vec<Arc<TripleSet>>)> = Vec::new();
    let mut frontier: Vec<Vec<Arc<TripleSet>>> = vec![root_states.to_vec()];
    let mut depth = 0;

    while !frontier.is_empty() && max_depth.map_or(true, |max| depth < max) {
        let mut next_entities = Vec::new();
        for states in &frontier {
            for object in states.iter().flat_map(|s| s.iter()).filter_map(followable_object) {
                if log.contains(object) && visited.insert(object.clone()) {
                    next_entities.push(object.clone());
                }
            }
        }

        let mut next_frontier = Vec::with_capacity(next_entities.len());
        for related in next_entities {
            let states = materializer.all_states(&related)?;
            next_frontier.push(states.clone());
            collected.push((related, states));
        }
        frontier = next_frontier;
        depth += 1;
    }
    Ok(collected)
}

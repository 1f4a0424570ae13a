//! Consistency checks between the provenance log and the live graph.

use chrona_core::errors::{ChronaResult, ReplayError};
use chrona_core::traits::LiveGraph;
use oxrdf::NamedNode;
use tracing::warn;

use crate::materialize::Materializer;

/// Forward-replay `entity` from its initial triples and compare the result
/// with the live graph.
pub fn verify_entity<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
) -> ChronaResult<()> {
    let replayed = materializer.replay_from_initial(entity)?;
    let live = materializer.graph().triples_for(entity)?;
    if replayed == live {
        return Ok(());
    }

    let missing = live.iter().filter(|t| !replayed.contains(*t)).count();
    let unexpected = replayed.iter().filter(|t| !live.contains(*t)).count();
    warn!(entity = %entity, missing, unexpected, "replayed state differs from live graph");
    Err(ReplayError::LiveStateMismatch {
        entity: entity.to_string(),
        missing,
        unexpected,
    }
    .into())
}

/// Verify every entity that recorded its initial triples. Returns the
/// entities that failed, with their errors, ordered by IRI.
pub fn verify_all<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
) -> Vec<(NamedNode, chrona_core::ChronaError)> {
    let log = materializer.log();
    log.entities()
        .into_iter()
        .filter(|entity| {
            log.snapshot(entity, 1)
                .is_ok_and(|first| first.initial_triples.is_some())
        })
        .filter_map(|entity| {
            verify_entity(materializer, entity)
                .err()
                .map(|e| (entity.clone(), e))
        })
        .collect()
}

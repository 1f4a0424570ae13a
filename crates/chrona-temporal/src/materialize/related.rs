//! Related-entity expansion: an entity's state together with the states of
//! the entities it links to.

use std::sync::Arc;

use chrona_core::errors::{ChronaResult, ErrorKind};
use chrona_core::models::{MaterializedState, TripleSet};
use chrona_core::traits::LiveGraph;
use chrono::{DateTime, Utc};
use oxrdf::vocab::rdf;
use oxrdf::{NamedNode, Term, Triple};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::reconstruct::Materializer;
use crate::provenance::vocabulary::PROV_NAMESPACE;

/// Materialize `entity` at `at` and follow IRI objects to other tracked
/// entities, breadth first, up to `max_depth` hops (`None` = until no new
/// entity appears). Links through `rdf:type` and PROV predicates are not
/// followed. Related entities that did not exist yet at `at` contribute
/// nothing; any other failure aborts the expansion.
pub fn materialize_related<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
    at: DateTime<Utc>,
    max_depth: Option<usize>,
) -> ChronaResult<MaterializedState> {
    let root = materializer.materialize(entity, at)?;
    let log = materializer.log();

    let mut visited: FxHashSet<NamedNode> = FxHashSet::default();
    visited.insert(entity.clone());
    let mut triples: TripleSet = (*root.triples).clone();
    let mut valid = root.valid;
    let mut sources = root.sources;
    let mut frontier: Vec<Arc<TripleSet>> = vec![root.triples];
    let mut depth = 0;

    while !frontier.is_empty() && max_depth.map_or(true, |max| depth < max) {
        let mut next_entities = Vec::new();
        for state in &frontier {
            for object in state.iter().filter_map(followable_object) {
                if log.contains(object) && visited.insert(object.clone()) {
                    next_entities.push(object.clone());
                }
            }
        }

        let mut next_frontier = Vec::with_capacity(next_entities.len());
        for related in next_entities {
            match materializer.materialize(&related, at) {
                Ok(state) => {
                    triples.extend(state.triples.iter().cloned());
                    valid = valid.intersect(&state.valid).unwrap_or(valid);
                    sources.extend(state.sources);
                    next_frontier.push(state.triples);
                }
                Err(e) if e.kind() == ErrorKind::NoProvenanceAtTime => {
                    debug!(entity = %related, "related entity not yet created");
                }
                Err(e) => return Err(e),
            }
        }
        frontier = next_frontier;
        depth += 1;
    }

    debug!(
        entity = %entity,
        related = sources.len() - 1,
        triples = triples.len(),
        "related entities materialized"
    );
    Ok(MaterializedState {
        triples: Arc::new(triples),
        valid,
        sources,
    })
}

/// The object of `triple` when it is a link worth following.
pub(crate) fn followable_object(triple: &Triple) -> Option<&NamedNode> {
    if triple.predicate.as_ref() == rdf::TYPE
        || triple.predicate.as_str().starts_with(PROV_NAMESPACE)
    {
        return None;
    }
    match &triple.object {
        Term::NamedNode(node) => Some(node),
        _ => None,
    }
}

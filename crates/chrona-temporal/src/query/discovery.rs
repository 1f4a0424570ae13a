//! Candidate entity discovery for pattern queries.

use std::collections::VecDeque;

use chrona_core::errors::{ChronaResult, ErrorKind};
use chrona_core::models::{TimeInterval, TriplePattern};
use chrona_core::traits::LiveGraph;
use oxrdf::{NamedNode, Term};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::materialize::Materializer;
use crate::provenance::ProvenanceLog;

/// Every tracked entity whose triples may match a pattern at some instant
/// of `range`, ordered by IRI.
///
/// 1. IRIs fixed in the patterns (subject or object position)
/// 2. For patterns with a variable subject: entities matching now in the
///    live graph, and entities whose recorded diffs or initial triples
///    contain a matching triple (they matched at some point in the past)
/// 3. Worklist: for join variables (object of one pattern, subject of
///    another), IRIs bound in any version of a candidate that overlaps
///    `range` become candidates too, until no new entity appears
///
/// The worklist admits each tracked entity at most once, so it terminates
/// after at most `log.entity_count()` rounds.
pub fn discover_candidates<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    patterns: &[TriplePattern],
    range: &TimeInterval,
) -> ChronaResult<Vec<NamedNode>> {
    let log = materializer.log();
    let mut candidates: FxHashSet<NamedNode> = FxHashSet::default();
    let mut worklist: VecDeque<NamedNode> = VecDeque::new();

    for pattern in patterns {
        if let Some(subject) = pattern.subject_iri() {
            reject_quarantined(log, subject)?;
            admit(log, &mut candidates, &mut worklist, subject);
        }
        if let Some(object) = pattern.object_iri() {
            admit(log, &mut candidates, &mut worklist, object);
        }
    }

    for pattern in patterns.iter().filter(|p| p.subject_iri().is_none()) {
        for subject in materializer.graph().subjects_matching(pattern)? {
            admit(log, &mut candidates, &mut worklist, &subject);
        }
        for record in log.records() {
            let in_diff = record
                .update
                .as_ref()
                .is_some_and(|d| d.triples().any(|t| pattern.matches(t)));
            let in_initial = record
                .initial_triples
                .as_ref()
                .is_some_and(|s| s.iter().any(|t| pattern.matches(t)));
            if in_diff || in_initial {
                admit(log, &mut candidates, &mut worklist, &record.entity);
            }
        }
    }

    let joins = join_patterns(patterns);
    if !joins.is_empty() {
        while let Some(entity) = worklist.pop_front() {
            for snapshot in log.snapshots(&entity)? {
                if !snapshot.interval().overlaps(range) {
                    continue;
                }
                let state = materializer.state_of(&entity, snapshot.number)?;
                for triple in state.iter() {
                    if !joins.iter().any(|p| p.matches(triple)) {
                        continue;
                    }
                    if let Term::NamedNode(bound) = &triple.object {
                        admit(log, &mut candidates, &mut worklist, bound);
                    }
                }
            }
        }
    }

    let mut candidates: Vec<NamedNode> = candidates.into_iter().collect();
    candidates.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    debug!(
        patterns = patterns.len(),
        candidates = candidates.len(),
        "candidate entities discovered"
    );
    Ok(candidates)
}

fn admit(
    log: &ProvenanceLog,
    candidates: &mut FxHashSet<NamedNode>,
    worklist: &mut VecDeque<NamedNode>,
    entity: &NamedNode,
) {
    if log.contains(entity) && candidates.insert(entity.clone()) {
        worklist.push_back(entity.clone());
    }
}

/// A query that names a quarantined entity outright cannot be answered.
fn reject_quarantined(log: &ProvenanceLog, entity: &NamedNode) -> ChronaResult<()> {
    match log.snapshots(entity) {
        Err(e) if e.kind() == ErrorKind::ProvenanceInvariant => Err(e),
        _ => Ok(()),
    }
}

/// Patterns whose object variable is the subject variable of another pattern.
fn join_patterns(patterns: &[TriplePattern]) -> Vec<&TriplePattern> {
    let subject_variables: FxHashSet<&str> = patterns
        .iter()
        .filter_map(|p| p.subject.as_variable())
        .collect();
    patterns
        .iter()
        .filter(|p| {
            p.object
                .as_variable()
                .is_some_and(|v| subject_variables.contains(v))
        })
        .collect()
}

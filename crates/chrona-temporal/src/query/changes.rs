//! Change log: creations, modifications and deletions inside a time range.

use chrona_core::errors::ChronaResult;
use chrona_core::models::{ChangeLog, EntityChanges, Modification, TimeInterval, TriplePattern};
use chrona_core::traits::LiveGraph;
use oxrdf::NamedNode;
use tracing::debug;

use super::discovery;
use crate::materialize::Materializer;

/// Changes of every candidate entity of `patterns` inside `range`.
/// Entities without changes in the range are left out.
pub fn execute_change_log<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    patterns: &[TriplePattern],
    range: &TimeInterval,
    changed_properties: &[NamedNode],
) -> ChronaResult<ChangeLog> {
    let candidates = discovery::discover_candidates(materializer, patterns, range)?;
    let mut log = ChangeLog::default();
    for entity in &candidates {
        let changes = entity_changes(materializer, entity, range, changed_properties)?;
        if !changes.is_empty() {
            log.entries.push(changes);
        }
    }
    debug!(
        candidates = candidates.len(),
        changed = log.len(),
        "change log computed"
    );
    Ok(log)
}

/// Changes of one entity inside `range`.
///
/// - `created`: generation of snapshot 1, when inside the range
/// - `deleted`: generation of the current snapshot, when inside the range
///   and the entity has no live triples
/// - `modified`: every other snapshot generated inside the range; when
///   `changed_properties` is non-empty, only diffs touching one of them
pub fn entity_changes<G: LiveGraph + ?Sized>(
    materializer: &Materializer<'_, G>,
    entity: &NamedNode,
    range: &TimeInterval,
    changed_properties: &[NamedNode],
) -> ChronaResult<EntityChanges> {
    let chain = materializer.log().snapshots(entity)?;
    let mut changes = EntityChanges::new(entity.clone());

    let deleted_snapshot = match chain.last() {
        Some(current) if current.number > 1 && range.contains(current.generation_time) => {
            let live = materializer.graph().triples_for(entity)?;
            live.is_empty().then_some(current.number)
        }
        _ => None,
    };

    for record in chain.iter().filter(|r| range.contains(r.generation_time)) {
        if record.number == 1 {
            changes.created = Some(record.generation_time);
            continue;
        }
        if Some(record.number) == deleted_snapshot {
            changes.deleted = Some(record.generation_time);
            continue;
        }
        let diff = record.update.clone().unwrap_or_default();
        let relevant = changed_properties.is_empty()
            || changed_properties.iter().any(|p| diff.touches_predicate(p));
        if relevant {
            changes.modified.push(Modification {
                at: record.generation_time,
                snapshot: record.number,
                diff,
                description: record.metadata.description.clone(),
            });
        }
    }
    Ok(changes)
}

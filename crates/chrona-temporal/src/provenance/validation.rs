//! Snapshot chain invariants.

use chrona_core::errors::ProvenanceError;
use chrona_core::models::SnapshotRecord;
use oxrdf::NamedNode;

/// Check one entity's chain, already sorted by snapshot number.
///
/// Critical invariants:
/// - numbers are contiguous and start at 1
/// - generation times strictly increase
/// - every snapshot but the last ends exactly where its successor begins
/// - the last snapshot, and only the last, is open
pub fn validate_chain(
    entity: &NamedNode,
    records: &[SnapshotRecord],
) -> Result<(), ProvenanceError> {
    let fail = |reason: String| -> Result<(), ProvenanceError> {
        Err(ProvenanceError::invariant(entity.as_str(), reason))
    };

    let Some(last) = records.last() else {
        return fail("entity has no snapshots".to_string());
    };

    for (index, record) in records.iter().enumerate() {
        if &record.entity != entity {
            return fail(format!(
                "snapshot {} is recorded for {}",
                record.number, record.entity
            ));
        }
        let expected = index as u32 + 1;
        if record.number != expected {
            return fail(format!(
                "snapshot numbers must be contiguous from 1: expected {expected}, found {}",
                record.number
            ));
        }
        if let Some(invalidated) = record.invalidation_time {
            if invalidated <= record.generation_time {
                return fail(format!(
                    "snapshot {} is invalidated at {invalidated}, not after its generation at {}",
                    record.number, record.generation_time
                ));
            }
        }
    }

    for pair in records.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.generation_time <= prev.generation_time {
            return fail(format!(
                "snapshot {} is generated at {}, not after snapshot {} at {}",
                next.number, next.generation_time, prev.number, prev.generation_time
            ));
        }
        match prev.invalidation_time {
            None => {
                return fail(format!(
                    "snapshot {} is open but snapshot {} follows it",
                    prev.number, next.number
                ))
            }
            Some(end) if end != next.generation_time => {
                return fail(format!(
                    "snapshot {} ends at {end} but snapshot {} starts at {}",
                    prev.number, next.number, next.generation_time
                ))
            }
            Some(_) => {}
        }
    }

    if last.invalidation_time.is_some() {
        return fail(format!("latest snapshot {} is not open", last.number));
    }
    Ok(())
}

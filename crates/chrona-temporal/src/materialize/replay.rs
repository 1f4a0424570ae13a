//! Diff replay: apply recorded diffs forward or undo them backward.

use chrona_core::errors::ReplayError;
use chrona_core::models::{SnapshotRecord, TripleSet, UpdateDiff};

/// Apply `diff` to the state of its predecessor snapshot.
pub fn apply_forward(state: &mut TripleSet, record: &SnapshotRecord) -> Result<(), ReplayError> {
    match &record.update {
        Some(diff) => apply_checked(state, &diff.inserted, &diff.deleted, record, diff),
        None => Ok(()),
    }
}

/// Undo `diff`, turning the state of its snapshot into its predecessor's.
pub fn apply_inverse(state: &mut TripleSet, record: &SnapshotRecord) -> Result<(), ReplayError> {
    match &record.update {
        Some(diff) => apply_checked(state, &diff.deleted, &diff.inserted, record, diff),
        None => Ok(()),
    }
}

/// Undo `later` (ascending by number) starting from the state of the last
/// one. Returns the state just before `later[0]`.
pub fn replay_backward(
    mut state: TripleSet,
    later: &[SnapshotRecord],
) -> Result<TripleSet, ReplayError> {
    for record in later.iter().rev() {
        apply_inverse(&mut state, record)?;
    }
    Ok(state)
}

/// Redo `following` (ascending by number) on top of `state`.
pub fn replay_forward(
    mut state: TripleSet,
    following: &[SnapshotRecord],
) -> Result<TripleSet, ReplayError> {
    for record in following {
        apply_forward(&mut state, record)?;
    }
    Ok(state)
}

/// Both directions enforce the same effectiveness rules: every triple to
/// remove must be present and every triple to add must be absent. A log that
/// passes them replays to identical states from either end.
fn apply_checked(
    state: &mut TripleSet,
    add: &TripleSet,
    remove: &TripleSet,
    record: &SnapshotRecord,
    diff: &UpdateDiff,
) -> Result<(), ReplayError> {
    if diff.is_self_overlapping() {
        return Err(ReplayError::OverlappingDiff {
            entity: record.entity.to_string(),
            snapshot: record.number,
        });
    }
    let missing = remove.iter().filter(|t| !state.contains(*t)).count();
    if missing > 0 {
        return Err(ReplayError::MissingRemoval {
            entity: record.entity.to_string(),
            snapshot: record.number,
            missing,
        });
    }
    let present = add.iter().filter(|t| state.contains(*t)).count();
    if present > 0 {
        return Err(ReplayError::ConflictingInsertion {
            entity: record.entity.to_string(),
            snapshot: record.number,
            present,
        });
    }
    for triple in remove {
        state.remove(triple);
    }
    state.extend(add.iter().cloned());
    Ok(())
}

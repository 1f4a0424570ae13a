//! Breakpoints: the instants where some candidate entity changes version.

use std::collections::BTreeSet;

use chrona_core::errors::ChronaResult;
use chrona_core::models::TimeInterval;
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;

use crate::provenance::ProvenanceLog;

/// Sorted cut points inside `range`, starting with `range.start`. Every
/// generation and invalidation time of a candidate snapshot that falls
/// strictly inside the range is a cut point.
pub fn breakpoints(
    log: &ProvenanceLog,
    candidates: &[NamedNode],
    range: &TimeInterval,
) -> ChronaResult<Vec<DateTime<Utc>>> {
    let mut points = BTreeSet::new();
    points.insert(range.start);
    for entity in candidates {
        for snapshot in log.snapshots(entity)? {
            let bounds = [Some(snapshot.generation_time), snapshot.invalidation_time];
            for at in bounds.into_iter().flatten() {
                if range.splits_at(at) {
                    points.insert(at);
                }
            }
        }
    }
    Ok(points.into_iter().collect())
}

/// Consecutive intervals between cut points; the last one ends where
/// `range` ends (possibly open).
pub fn partition(range: &TimeInterval, points: &[DateTime<Utc>]) -> Vec<TimeInterval> {
    points
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = points.get(i + 1).copied().or(range.end);
            TimeInterval::new(*start, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn year(y: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn partition_covers_range_without_gaps() {
        let range = TimeInterval::closed(year(2020), year(2024));
        let parts = partition(&range, &[year(2020), year(2021), year(2023)]);
        assert_eq!(
            parts,
            vec![
                TimeInterval::closed(year(2020), year(2021)),
                TimeInterval::closed(year(2021), year(2023)),
                TimeInterval::closed(year(2023), year(2024)),
            ]
        );
    }

    #[test]
    fn open_range_leaves_last_interval_open() {
        let range = TimeInterval::open(year(2020));
        let parts = partition(&range, &[year(2020), year(2021)]);
        assert_eq!(parts.last(), Some(&TimeInterval::open(year(2021))));
    }
}

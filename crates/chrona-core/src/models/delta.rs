//! Triple-level deltas and the net-transition merge rule.

use oxrdf::Triple;

use super::{TripleSet, UpdateDiff};

/// Triples added and removed between two reference points.
///
/// `added` and `removed` are always disjoint. A triple that is added and later
/// removed (or removed and later re-added) nets out and appears in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: TripleSet,
    pub removed: TripleSet,
}

impl Delta {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set-difference delta taking `before` to `after`.
    pub fn between(before: &TripleSet, after: &TripleSet) -> Self {
        Self {
            added: after.difference(before).cloned().collect(),
            removed: before.difference(after).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// Fold one more recorded diff into this delta.
    pub fn apply_diff(&mut self, diff: &UpdateDiff) {
        for triple in &diff.deleted {
            self.record_removal(triple);
        }
        for triple in &diff.inserted {
            self.record_addition(triple);
        }
    }

    /// Compose with a delta that starts where this one ends.
    pub fn merge(mut self, later: &Delta) -> Delta {
        for triple in &later.removed {
            self.record_removal(triple);
        }
        for triple in &later.added {
            self.record_addition(triple);
        }
        self
    }

    /// Union with a delta over a disjoint set of triples (another entity).
    pub fn absorb(&mut self, other: Delta) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Triple) -> bool) {
        self.added.retain(|t| keep(t));
        self.removed.retain(|t| keep(t));
    }

    fn record_addition(&mut self, triple: &Triple) {
        if !self.removed.remove(triple) {
            self.added.insert(triple.clone());
        }
    }

    fn record_removal(&mut self, triple: &Triple) {
        if !self.added.remove(triple) {
            self.removed.insert(triple.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn t(value: &str) -> Triple {
        Triple::new(
            NamedNode::new_unchecked("http://ex.org/E1"),
            NamedNode::new_unchecked("http://ex.org/p"),
            Literal::new_simple_literal(value),
        )
    }

    fn set(values: &[&str]) -> TripleSet {
        values.iter().map(|v| t(v)).collect()
    }

    #[test]
    fn between_is_two_set_differences() {
        let delta = Delta::between(&set(&["A", "C"]), &set(&["B", "C"]));
        assert_eq!(delta.added, set(&["B"]));
        assert_eq!(delta.removed, set(&["A"]));
    }

    #[test]
    fn add_then_remove_nets_out() {
        let first = Delta {
            added: set(&["B"]),
            removed: TripleSet::default(),
        };
        let second = Delta {
            added: TripleSet::default(),
            removed: set(&["B"]),
        };
        assert!(first.merge(&second).is_empty());
    }

    #[test]
    fn remove_then_readd_nets_out() {
        let mut delta = Delta::empty();
        delta.apply_diff(&UpdateDiff::new(TripleSet::default(), set(&["A"])));
        delta.apply_diff(&UpdateDiff::new(set(&["A"]), TripleSet::default()));
        assert!(delta.is_empty());
    }

    #[test]
    fn merge_keeps_independent_changes() {
        let first = Delta::between(&set(&["A"]), &set(&["B"]));
        let second = Delta::between(&set(&["B"]), &set(&["B", "C"]));
        let merged = first.merge(&second);
        assert_eq!(merged.added, set(&["B", "C"]));
        assert_eq!(merged.removed, set(&["A"]));
    }
}

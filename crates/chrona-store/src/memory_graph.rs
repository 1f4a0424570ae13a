//! Subject-indexed in-memory graph.

use chrona_core::errors::ChronaResult;
use chrona_core::models::{subject_iri, TriplePattern, TripleSet, UpdateDiff};
use chrona_core::traits::LiveGraph;
use oxrdf::{NamedNode, Triple};
use rustc_hash::FxHashMap;
use tracing::debug;

/// The present state of a graph. Triples with blank-node subjects are kept
/// under no entity and are only visible to `subjects_matching` scans.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    by_subject: FxHashMap<NamedNode, TripleSet>,
    anonymous: TripleSet,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        match subject_iri(&triple).cloned() {
            Some(subject) => self.by_subject.entry(subject).or_default().insert(triple),
            None => self.anonymous.insert(triple),
        }
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        match subject_iri(triple) {
            Some(subject) => {
                let Some(set) = self.by_subject.get_mut(subject) else {
                    return false;
                };
                let removed = set.remove(triple);
                if set.is_empty() {
                    self.by_subject.remove(subject);
                }
                removed
            }
            None => self.anonymous.remove(triple),
        }
    }

    /// Apply a recorded diff, deletions first.
    pub fn apply(&mut self, diff: &UpdateDiff) {
        for triple in &diff.deleted {
            self.remove(triple);
        }
        for triple in diff.inserted.iter().cloned() {
            self.insert(triple);
        }
    }

    pub fn len(&self) -> usize {
        self.by_subject.values().map(|s| s.len()).sum::<usize>() + self.anonymous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subjects(&self) -> impl Iterator<Item = &NamedNode> {
        self.by_subject.keys()
    }

    fn all_triples(&self) -> impl Iterator<Item = &Triple> {
        self.by_subject
            .values()
            .flat_map(|s| s.iter())
            .chain(self.anonymous.iter())
    }
}

impl FromIterator<Triple> for MemoryGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = MemoryGraph::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}

impl LiveGraph for MemoryGraph {
    fn triples_for(&self, entity: &NamedNode) -> ChronaResult<TripleSet> {
        Ok(self.by_subject.get(entity).cloned().unwrap_or_default())
    }

    fn subjects_matching(&self, pattern: &TriplePattern) -> ChronaResult<Vec<NamedNode>> {
        let mut subjects: Vec<NamedNode> = match pattern.subject_iri() {
            Some(subject) => self
                .by_subject
                .get(subject)
                .filter(|set| set.iter().any(|t| pattern.matches(t)))
                .map(|_| vec![subject.clone()])
                .unwrap_or_default(),
            None => {
                let mut found: Vec<NamedNode> = self
                    .all_triples()
                    .filter(|t| pattern.matches(t))
                    .filter_map(subject_iri)
                    .cloned()
                    .collect();
                found.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                found.dedup();
                found
            }
        };
        subjects.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        debug!(pattern = %pattern, matched = subjects.len(), "live subjects matched");
        Ok(subjects)
    }
}

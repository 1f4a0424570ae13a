use oxrdf::NamedNode;

use crate::errors::ChronaResult;
use crate::models::{TriplePattern, TripleSet};

/// Read access to the present state of the graph.
pub trait LiveGraph: Send + Sync {
    /// All triples whose subject is `entity`. Untracked or unknown entities
    /// yield an empty set.
    fn triples_for(&self, entity: &NamedNode) -> ChronaResult<TripleSet>;

    /// IRI subjects of the triples currently matching `pattern`.
    fn subjects_matching(&self, pattern: &TriplePattern) -> ChronaResult<Vec<NamedNode>>;
}

impl<T: LiveGraph + ?Sized> LiveGraph for std::sync::Arc<T> {
    fn triples_for(&self, entity: &NamedNode) -> ChronaResult<TripleSet> {
        (**self).triples_for(entity)
    }

    fn subjects_matching(&self, pattern: &TriplePattern) -> ChronaResult<Vec<NamedNode>> {
        (**self).subjects_matching(pattern)
    }
}

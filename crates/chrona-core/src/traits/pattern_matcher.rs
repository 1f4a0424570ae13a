use crate::errors::ChronaResult;
use crate::models::{ResultSet, TriplePattern, TripleSet};

/// Evaluates a conjunction of triple patterns against one static graph.
pub trait PatternMatcher: Send + Sync {
    fn match_patterns(&self, patterns: &[TriplePattern], graph: &TripleSet)
        -> ChronaResult<ResultSet>;
}

impl<T: PatternMatcher + ?Sized> PatternMatcher for std::sync::Arc<T> {
    fn match_patterns(
        &self,
        patterns: &[TriplePattern],
        graph: &TripleSet,
    ) -> ChronaResult<ResultSet> {
        (**self).match_patterns(patterns, graph)
    }
}

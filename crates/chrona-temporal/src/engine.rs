//! TemporalEngine: central orchestrator implementing ITemporalEngine.

use std::sync::Arc;

use chrona_core::config::{ChronaConfig, TemporalConfig};
use chrona_core::errors::{ChronaResult, TemporalError};
use chrona_core::models::{
    ChangeLog, Delta, EntityVersion, MaterializationStats, MaterializedState, SnapshotRecord,
    TemporalSlice, TimeInterval, TriplePattern, VersionWindow,
};
use chrona_core::traits::{ITemporalEngine, LiveGraph, PatternMatcher};
use chrona_core::ChronaError;
use chrono::{DateTime, Duration, Utc};
use oxrdf::{NamedNode, Triple};
use parking_lot::RwLock;
use tracing::info;

use crate::materialize::related;
use crate::materialize::{MaterializationCache, Materializer};
use crate::provenance::{ProvenanceLoader, ProvenanceLog};
use crate::query::{self, AcrossTime};
use crate::stats::StatsRecorder;

/// One loaded log version together with the cache built for it.
pub struct Session {
    pub log: Arc<ProvenanceLog>,
    pub cache: MaterializationCache,
}

impl Session {
    pub fn new(log: ProvenanceLog, cache_max_entries: u64) -> Self {
        let cache = MaterializationCache::new(cache_max_entries, log.version());
        Self {
            log: Arc::new(log),
            cache,
        }
    }
}

/// The temporal reconstruction and query engine.
///
/// Holds the active session behind a lock that is only taken to clone the
/// `Arc`. Every operation runs against the session it started with, so a
/// concurrent `reload` never mixes two log versions inside one answer.
pub struct TemporalEngine<G: LiveGraph, M: PatternMatcher> {
    session: RwLock<Arc<Session>>,
    graph: Arc<G>,
    matcher: Arc<M>,
    stats: Arc<StatsRecorder>,
    config: TemporalConfig,
}

impl<G: LiveGraph, M: PatternMatcher> TemporalEngine<G, M> {
    pub fn new(
        log: ProvenanceLog,
        graph: Arc<G>,
        matcher: Arc<M>,
        config: TemporalConfig,
    ) -> Self {
        let session = Session::new(log, config.cache_max_entries);
        Self {
            session: RwLock::new(Arc::new(session)),
            graph,
            matcher,
            stats: Arc::new(StatsRecorder::new()),
            config,
        }
    }

    /// Load the provenance graph in `triples` and build an engine over it.
    pub fn load<I>(
        triples: I,
        graph: Arc<G>,
        matcher: Arc<M>,
        config: &ChronaConfig,
    ) -> ChronaResult<Self>
    where
        I: IntoIterator<Item = Triple>,
    {
        let log = ProvenanceLoader::from_config(&config.provenance)?.load(triples)?;
        Ok(Self::new(log, graph, matcher, config.temporal.clone()))
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    pub fn session(&self) -> Arc<Session> {
        self.session.read().clone()
    }

    pub fn log(&self) -> Arc<ProvenanceLog> {
        Arc::clone(&self.session().log)
    }

    /// Swap in a new log version. The new version starts with an empty
    /// cache; evaluations already running finish on the previous one.
    pub fn reload(&self, log: ProvenanceLog) {
        let session = Arc::new(Session::new(log, self.config.cache_max_entries));
        info!(
            version = session.log.version(),
            entities = session.log.entity_count(),
            snapshots = session.log.snapshot_count(),
            "provenance log reloaded"
        );
        *self.session.write() = session;
    }

    fn with_materializer<R>(&self, f: impl FnOnce(&Materializer<'_, G>) -> R) -> R {
        let session = self.session();
        let materializer = Materializer::new(
            &session.log,
            &session.cache,
            self.graph.as_ref(),
            self.config.replay_direction,
            &self.stats,
        );
        f(&materializer)
    }

    pub fn snapshot_covering(
        &self,
        entity: &NamedNode,
        at: DateTime<Utc>,
    ) -> ChronaResult<SnapshotRecord> {
        self.session().log.snapshot_covering(entity, at).cloned()
    }

    /// Union of the states of `entities` at `at`.
    pub fn materialize_all(
        &self,
        entities: &[NamedNode],
        at: DateTime<Utc>,
    ) -> ChronaResult<MaterializedState> {
        self.with_materializer(|m| {
            query::execute_as_of(m, entities, at, self.config.parallel_materialization)
        })
    }

    /// State of `entity` at `at` together with the entities it links to,
    /// up to `max_depth` hops. `None` falls back to `related_max_depth`
    /// from the configuration, which is unbounded by default.
    pub fn materialize_related(
        &self,
        entity: &NamedNode,
        at: DateTime<Utc>,
        max_depth: Option<usize>,
    ) -> ChronaResult<MaterializedState> {
        let max_depth = max_depth.or(self.config.related_max_depth);
        self.with_materializer(|m| related::materialize_related(m, entity, at, max_depth))
    }

    /// Every version of `entity` merged with the states of the entities it
    /// links to at each version's generation time. Depth resolves as in
    /// `materialize_related`.
    pub fn history_related(
        &self,
        entity: &NamedNode,
        max_depth: Option<usize>,
    ) -> ChronaResult<Vec<EntityVersion>> {
        let max_depth = max_depth.or(self.config.related_max_depth);
        self.with_materializer(|m| query::execute_related_history(m, entity, max_depth))
    }

    /// Plan an across-time evaluation without running it.
    pub fn across_time(
        &self,
        patterns: &[TriplePattern],
        range: TimeInterval,
    ) -> ChronaResult<AcrossTime<G, M>> {
        AcrossTime::plan(
            self.session(),
            Arc::clone(&self.graph),
            Arc::clone(&self.matcher),
            Arc::clone(&self.stats),
            self.config.clone(),
            patterns,
            range,
        )
    }

    pub fn versions_within(
        &self,
        entity: &NamedNode,
        range: &TimeInterval,
    ) -> ChronaResult<VersionWindow> {
        self.with_materializer(|m| query::execute_versions_within(m, entity, range))
    }

    pub fn verify_entity(&self, entity: &NamedNode) -> ChronaResult<()> {
        self.with_materializer(|m| query::verify_entity(m, entity))
    }

    pub fn verify_all(&self) -> Vec<(NamedNode, ChronaError)> {
        self.with_materializer(|m| query::verify_all(m))
    }

    pub fn stats(&self) -> MaterializationStats {
        let session = self.session();
        session.cache.sync();
        self.stats.snapshot(session.cache.entry_count())
    }
}

impl<G: LiveGraph, M: PatternMatcher> ITemporalEngine for TemporalEngine<G, M> {
    fn materialize(
        &self,
        entity: &NamedNode,
        at: DateTime<Utc>,
    ) -> ChronaResult<MaterializedState> {
        self.with_materializer(|m| m.materialize(entity, at))
    }

    fn delta(
        &self,
        entity: &NamedNode,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ChronaResult<Delta> {
        self.with_materializer(|m| {
            query::execute_delta(
                m,
                entity,
                from,
                to,
                self.config.delta_strategy,
                self.config.delta_compose_max_snapshots,
            )
        })
    }

    fn delta_for_patterns(
        &self,
        patterns: &[TriplePattern],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ChronaResult<Delta> {
        if from > to {
            return Err(TemporalError::InvalidTimeRange { from, to }.into());
        }
        // Include `to` itself so entities joined in at that instant count.
        let end = to.checked_add_signed(Duration::nanoseconds(1)).unwrap_or(to);
        let range = TimeInterval::closed(from, end);
        self.with_materializer(|m| {
            let candidates = query::discovery::discover_candidates(m, patterns, &range)?;
            query::execute_pattern_delta(
                m,
                &candidates,
                patterns,
                from,
                to,
                self.config.delta_strategy,
                self.config.delta_compose_max_snapshots,
            )
        })
    }

    fn evaluate_across_time(
        &self,
        patterns: &[TriplePattern],
        range: TimeInterval,
    ) -> ChronaResult<Vec<TemporalSlice>> {
        self.across_time(patterns, range)?.collect_slices()
    }

    fn history(&self, entity: &NamedNode) -> ChronaResult<Vec<EntityVersion>> {
        self.with_materializer(|m| query::execute_history(m, entity))
    }

    fn change_log(
        &self,
        patterns: &[TriplePattern],
        range: TimeInterval,
        changed_properties: &[NamedNode],
    ) -> ChronaResult<ChangeLog> {
        self.with_materializer(|m| {
            query::execute_change_log(m, patterns, &range, changed_properties)
        })
    }
}

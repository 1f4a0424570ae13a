//! State reconstruction: the state of an entity at an instant or snapshot.

use std::sync::Arc;

use chrona_core::config::ReplayDirection;
use chrona_core::errors::{ChronaResult, ReplayError};
use chrona_core::models::{MaterializedState, SnapshotRecord, TripleSet};
use chrona_core::traits::LiveGraph;
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use tracing::debug;

use super::cache::MaterializationCache;
use super::replay;
use crate::provenance::ProvenanceLog;
use crate::stats::StatsRecorder;

/// Borrowed view over one log version, its cache, and the live graph.
pub struct Materializer<'a, G: LiveGraph + ?Sized> {
    log: &'a ProvenanceLog,
    cache: &'a MaterializationCache,
    graph: &'a G,
    direction: ReplayDirection,
    stats: &'a StatsRecorder,
}

impl<'a, G: LiveGraph + ?Sized> Materializer<'a, G> {
    pub fn new(
        log: &'a ProvenanceLog,
        cache: &'a MaterializationCache,
        graph: &'a G,
        direction: ReplayDirection,
        stats: &'a StatsRecorder,
    ) -> Self {
        debug_assert_eq!(
            cache.log_version(),
            log.version(),
            "cache built for another log version"
        );
        Self {
            log,
            cache,
            graph,
            direction,
            stats,
        }
    }

    pub fn log(&self) -> &'a ProvenanceLog {
        self.log
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn stats(&self) -> &'a StatsRecorder {
        self.stats
    }

    /// Reconstruct `entity` as it was at `at`.
    ///
    /// 1. Locate the snapshot covering `at` by binary search
    /// 2. If it is the current snapshot, read the live graph
    /// 3. Otherwise replay from the nearest known state (cache, live graph,
    ///    or snapshot 1's initial triples) toward the target snapshot
    /// 4. Cache the result under `(entity, snapshot number)`
    pub fn materialize(
        &self,
        entity: &NamedNode,
        at: DateTime<Utc>,
    ) -> ChronaResult<MaterializedState> {
        let snapshot = self.log.snapshot_covering(entity, at)?;
        let triples = self.state_of(entity, snapshot.number)?;
        Ok(MaterializedState::for_snapshot(
            entity.clone(),
            snapshot.number,
            snapshot.interval(),
            triples,
        ))
    }

    /// Triples of snapshot `number` of `entity`.
    pub fn state_of(&self, entity: &NamedNode, number: u32) -> ChronaResult<Arc<TripleSet>> {
        let chain = self.log.snapshots(entity)?;
        let target = self.log.snapshot(entity, number)?;
        if target.is_current() {
            return Ok(Arc::new(self.graph.triples_for(entity)?));
        }
        if let Some(hit) = self.cache.get(entity, number) {
            self.stats.record_hit();
            return Ok(hit);
        }
        self.stats.record_miss();

        let index = number as usize - 1;
        let triples = match self.direction_for(chain, index) {
            ReplayDirection::Forward => self.replay_forward_to(entity, chain, index)?,
            _ => self.replay_backward_to(entity, chain, index)?,
        };
        let triples = Arc::new(triples);
        self.cache.insert(entity.clone(), number, Arc::clone(&triples));
        Ok(triples)
    }

    /// Every version of `entity`, oldest first, computed in one backward
    /// pass from the live graph. Each historical state is cached.
    pub fn all_states(&self, entity: &NamedNode) -> ChronaResult<Vec<Arc<TripleSet>>> {
        let chain = self.log.snapshots(entity)?;
        let mut states = Vec::with_capacity(chain.len());
        let mut state = self.graph.triples_for(entity)?;
        states.push(Arc::new(state.clone()));

        for index in (1..chain.len()).rev() {
            let number = index as u32;
            if let Some(hit) = self.cache.get(entity, number) {
                self.stats.record_hit();
                state = (*hit).clone();
                states.push(hit);
                continue;
            }
            self.stats.record_miss();
            replay::apply_inverse(&mut state, &chain[index])?;
            self.stats.record_replayed(1);
            let snapshot_state = Arc::new(state.clone());
            self.cache.insert(entity.clone(), number, Arc::clone(&snapshot_state));
            states.push(snapshot_state);
        }
        states.reverse();
        Ok(states)
    }

    /// Forward-replay from snapshot 1's initial triples to the current
    /// snapshot, without touching the cache.
    pub fn replay_from_initial(&self, entity: &NamedNode) -> ChronaResult<TripleSet> {
        let chain = self.log.snapshots(entity)?;
        let initial = initial_triples(entity, chain)?;
        let state = replay::replay_forward(initial, &chain[1..])?;
        self.stats.record_replayed(chain.len().saturating_sub(1) as u64);
        Ok(state)
    }

    fn direction_for(&self, chain: &[SnapshotRecord], index: usize) -> ReplayDirection {
        let has_initial = chain.first().is_some_and(|r| r.initial_triples.is_some());
        match self.direction {
            ReplayDirection::Backward => ReplayDirection::Backward,
            ReplayDirection::Forward if has_initial => ReplayDirection::Forward,
            ReplayDirection::Forward => ReplayDirection::Backward,
            ReplayDirection::Auto => {
                let forward_steps = index;
                let backward_steps = chain.len() - 1 - index;
                if has_initial && forward_steps < backward_steps {
                    ReplayDirection::Forward
                } else {
                    ReplayDirection::Backward
                }
            }
        }
    }

    /// Start from the nearest cached later snapshot, or the live graph.
    fn replay_backward_to(
        &self,
        entity: &NamedNode,
        chain: &[SnapshotRecord],
        index: usize,
    ) -> ChronaResult<TripleSet> {
        let current = chain.len() - 1;
        let (start_index, state) = (index + 1..current)
            .find_map(|i| {
                self.cache
                    .get(entity, i as u32 + 1)
                    .map(|hit| (i, (*hit).clone()))
            })
            .map_or_else(
                || self.graph.triples_for(entity).map(|live| (current, live)),
                Ok,
            )?;

        let undo = &chain[index + 1..=start_index];
        debug!(
            entity = %entity,
            target = index + 1,
            from = start_index + 1,
            diffs = undo.len(),
            "backward replay"
        );
        let state = replay::replay_backward(state, undo)?;
        self.stats.record_replayed(undo.len() as u64);
        Ok(state)
    }

    /// Start from the nearest cached earlier snapshot, or the initial triples.
    fn replay_forward_to(
        &self,
        entity: &NamedNode,
        chain: &[SnapshotRecord],
        index: usize,
    ) -> ChronaResult<TripleSet> {
        let cached = (0..index).rev().find_map(|i| {
            self.cache
                .get(entity, i as u32 + 1)
                .map(|hit| (i, (*hit).clone()))
        });
        let (start_index, state) = match cached {
            Some(found) => found,
            None => (0, initial_triples(entity, chain)?),
        };

        let redo = &chain[start_index + 1..=index];
        debug!(
            entity = %entity,
            target = index + 1,
            from = start_index + 1,
            diffs = redo.len(),
            "forward replay"
        );
        let state = replay::replay_forward(state, redo)?;
        self.stats.record_replayed(redo.len() as u64);
        Ok(state)
    }
}

fn initial_triples(entity: &NamedNode, chain: &[SnapshotRecord]) -> Result<TripleSet, ReplayError> {
    chain
        .first()
        .and_then(|r| r.initial_triples.clone())
        .ok_or_else(|| ReplayError::MissingInitialState {
            entity: entity.to_string(),
        })
}

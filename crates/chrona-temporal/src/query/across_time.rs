//! Across-time evaluation: maximal intervals of constant query answer.

use std::sync::Arc;

use chrona_core::config::TemporalConfig;
use chrona_core::errors::{ChronaResult, TemporalError};
use chrona_core::models::{TemporalSlice, TimeInterval, TriplePattern};
use chrona_core::traits::{LiveGraph, PatternMatcher};
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use tracing::{debug, info};

use super::as_of::materialize_union;
use super::{breakpoints, discovery};
use crate::cancel::CancellationFlag;
use crate::engine::Session;
use crate::materialize::Materializer;
use crate::stats::StatsRecorder;

/// A planned across-time evaluation.
///
/// Planning discovers the candidate entities and cuts the range at every
/// instant one of them changes version. Evaluation is lazy: `iter()` runs the
/// matcher once per planned interval as the caller pulls results, merging
/// neighbours whose answers are equal. Calling `iter()` again restarts from
/// the first interval; states already materialized come from the cache.
pub struct AcrossTime<G: LiveGraph, M: PatternMatcher> {
    session: Arc<Session>,
    graph: Arc<G>,
    matcher: Arc<M>,
    stats: Arc<StatsRecorder>,
    config: TemporalConfig,
    patterns: Vec<TriplePattern>,
    candidates: Vec<NamedNode>,
    intervals: Vec<TimeInterval>,
    cancel: CancellationFlag,
}

impl<G: LiveGraph, M: PatternMatcher> AcrossTime<G, M> {
    pub(crate) fn plan(
        session: Arc<Session>,
        graph: Arc<G>,
        matcher: Arc<M>,
        stats: Arc<StatsRecorder>,
        config: TemporalConfig,
        patterns: &[TriplePattern],
        range: TimeInterval,
    ) -> ChronaResult<Self> {
        if let Some(end) = range.end {
            if range.start >= end {
                return Err(TemporalError::EmptyTimeRange {
                    start: range.start,
                    end,
                }
                .into());
            }
        }

        let materializer = Materializer::new(
            &session.log,
            &session.cache,
            graph.as_ref(),
            config.replay_direction,
            &stats,
        );
        let candidates = discovery::discover_candidates(&materializer, patterns, &range)?;
        let points = breakpoints::breakpoints(&session.log, &candidates, &range)?;
        let intervals = breakpoints::partition(&range, &points);
        info!(
            range = %range,
            candidates = candidates.len(),
            intervals = intervals.len(),
            "across-time evaluation planned"
        );

        Ok(Self {
            session,
            graph,
            matcher,
            stats,
            config,
            patterns: patterns.to_vec(),
            candidates,
            intervals,
            cancel: CancellationFlag::new(),
        })
    }

    /// Share `flag` with the caller; cancelling it stops iteration before
    /// the next interval is evaluated.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn candidates(&self) -> &[NamedNode] {
        &self.candidates
    }

    /// Planned intervals before coalescing.
    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> AcrossTimeIter<'_, G, M> {
        AcrossTimeIter {
            plan: self,
            next: 0,
            pending: None,
            finished: false,
        }
    }

    pub fn collect_slices(&self) -> ChronaResult<Vec<TemporalSlice>> {
        self.iter().collect()
    }

    /// Evaluate the query directly at `at`, reporting the planned interval
    /// that contains it. `None` when `at` lies outside the planned range.
    pub fn evaluate_at(&self, at: DateTime<Utc>) -> Option<ChronaResult<TemporalSlice>> {
        let interval = self.intervals.iter().find(|i| i.contains(at))?;
        Some(self.evaluate(*interval, at))
    }

    fn evaluate(&self, interval: TimeInterval, at: DateTime<Utc>) -> ChronaResult<TemporalSlice> {
        let materializer = Materializer::new(
            &self.session.log,
            &self.session.cache,
            self.graph.as_ref(),
            self.config.replay_direction,
            &self.stats,
        );
        let union = materialize_union(
            &materializer,
            &self.candidates,
            at,
            self.config.coverage_policy,
            self.config.parallel_materialization,
        )?;
        let results = self
            .matcher
            .match_patterns(&self.patterns, &union.state.triples)?;
        self.stats.record_interval();
        debug!(
            interval = %interval,
            triples = union.state.triples.len(),
            results = results.len(),
            "interval evaluated"
        );
        Ok(TemporalSlice {
            interval,
            results,
            uncovered: union.uncovered,
        })
    }
}

/// Lazy iterator over coalesced slices. Ends after the first error.
pub struct AcrossTimeIter<'a, G: LiveGraph, M: PatternMatcher> {
    plan: &'a AcrossTime<G, M>,
    next: usize,
    pending: Option<TemporalSlice>,
    finished: bool,
}

impl<G: LiveGraph, M: PatternMatcher> Iterator for AcrossTimeIter<'_, G, M> {
    type Item = ChronaResult<TemporalSlice>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some(interval) = self.plan.intervals.get(self.next).copied() else {
                self.finished = true;
                return self.pending.take().map(Ok);
            };
            if self.plan.cancel.is_cancelled() {
                self.finished = true;
                return Some(Err(TemporalError::Cancelled.into()));
            }
            let slice = match self.plan.evaluate(interval, interval.start) {
                Ok(slice) => slice,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            self.next += 1;

            match self.pending.take() {
                None => self.pending = Some(slice),
                Some(mut current) if current.results == slice.results => {
                    current.interval.end = slice.interval.end;
                    merge_uncovered(&mut current.uncovered, slice.uncovered);
                    self.pending = Some(current);
                }
                Some(current) => {
                    self.pending = Some(slice);
                    return Some(Ok(current));
                }
            }
        }
    }
}

fn merge_uncovered(into: &mut Vec<NamedNode>, more: Vec<NamedNode>) {
    into.extend(more);
    into.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    into.dedup();
}

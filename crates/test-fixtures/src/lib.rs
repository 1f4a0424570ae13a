//! Shared scenario builders for chrona tests and benchmarks.
//!
//! An `EntityHistory` describes one entity as an initial state plus a
//! sequence of timed changes. A `Scenario` turns histories into a
//! validated `ProvenanceLog` and the matching live graph, and keeps a naive
//! forward-computed oracle for checking reconstructions.

use std::sync::Arc;

use chrona_core::config::{ObservabilityConfig, TemporalConfig};
use chrona_core::errors::ChronaResult;
use chrona_core::models::{SnapshotRecord, TimeInterval, TripleSet, UpdateDiff};
use chrona_store::{BasicGraphMatcher, MemoryGraph};
use chrona_temporal::provenance::{render_update, ProvenanceVocabulary};
use chrona_temporal::{ProvenanceLog, TemporalEngine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, Term, Triple};

pub const EX: &str = "http://example.org/";

pub type MemoryEngine = TemporalEngine<MemoryGraph, BasicGraphMatcher>;

/// Install the workspace subscriber once per test binary; later calls are
/// no-ops. Honours `RUST_LOG`.
pub fn init_tracing() {
    chrona_core::observability::init_tracing(&ObservabilityConfig::default());
}

pub fn iri(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{EX}{local}"))
}

pub fn lit(value: &str) -> Term {
    Literal::new_simple_literal(value).into()
}

pub fn triple(subject: &NamedNode, predicate: &NamedNode, object: impl Into<Term>) -> Triple {
    Triple::new(subject.clone(), predicate.clone(), object)
}

/// Midnight UTC on the given date.
pub fn day(year: i32, month: u32, date: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, date, 0, 0, 0)
        .single()
        .expect("valid calendar date")
}

pub fn set(triples: impl IntoIterator<Item = Triple>) -> TripleSet {
    triples.into_iter().collect()
}

/// One entity's evolution: snapshot 1 at `created`, then one snapshot per
/// change. Changes must be effective (deleted triples present, inserted
/// triples absent) for the generated log to replay.
#[derive(Debug, Clone)]
pub struct EntityHistory {
    pub entity: NamedNode,
    pub created: DateTime<Utc>,
    pub initial: TripleSet,
    pub changes: Vec<(DateTime<Utc>, UpdateDiff)>,
}

impl EntityHistory {
    pub fn new(
        entity: &NamedNode,
        created: DateTime<Utc>,
        initial: impl IntoIterator<Item = Triple>,
    ) -> Self {
        Self {
            entity: entity.clone(),
            created,
            initial: set(initial),
            changes: Vec::new(),
        }
    }

    pub fn change(
        mut self,
        at: DateTime<Utc>,
        inserted: impl IntoIterator<Item = Triple>,
        deleted: impl IntoIterator<Item = Triple>,
    ) -> Self {
        self.changes
            .push((at, UpdateDiff::new(set(inserted), set(deleted))));
        self
    }

    /// Generation times of every snapshot, oldest first.
    pub fn generation_times(&self) -> Vec<DateTime<Utc>> {
        std::iter::once(self.created)
            .chain(self.changes.iter().map(|(at, _)| *at))
            .collect()
    }

    /// State of every snapshot with its validity, computed forward.
    pub fn states(&self) -> Vec<(TimeInterval, TripleSet)> {
        let times = self.generation_times();
        let mut state = self.initial.clone();
        let mut out = Vec::with_capacity(times.len());
        for (index, start) in times.iter().enumerate() {
            if index > 0 {
                let diff = &self.changes[index - 1].1;
                for t in &diff.deleted {
                    state.remove(t);
                }
                state.extend(diff.inserted.iter().cloned());
            }
            let interval = TimeInterval::new(*start, times.get(index + 1).copied());
            out.push((interval, state.clone()));
        }
        out
    }

    pub fn final_state(&self) -> TripleSet {
        self.states()
            .pop()
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    /// State at `at`, or `None` before the entity existed.
    pub fn state_at(&self, at: DateTime<Utc>) -> Option<TripleSet> {
        self.states()
            .into_iter()
            .find(|(interval, _)| interval.contains(at))
            .map(|(_, state)| state)
    }

    /// Snapshot records as a loader would produce them: snapshot 1 carries
    /// an insert-only update and its initial triples.
    pub fn records(&self) -> Vec<SnapshotRecord> {
        let times = self.generation_times();
        times
            .iter()
            .enumerate()
            .map(|(index, at)| {
                let number = index as u32 + 1;
                let mut record = SnapshotRecord::new(self.entity.clone(), number, *at);
                record.invalidation_time = times.get(index + 1).copied();
                record.metadata.iri = Some(snapshot_iri(&self.entity, number));
                if index == 0 {
                    record.update = Some(UpdateDiff::new(self.initial.clone(), TripleSet::default()));
                    record.initial_triples = Some(self.initial.clone());
                    record.metadata.description = Some(format!("created {}", self.entity.as_str()));
                } else {
                    record.update = Some(self.changes[index - 1].1.clone());
                    record.metadata.description = Some(format!("modified {}", self.entity.as_str()));
                }
                record
            })
            .collect()
    }
}

pub fn snapshot_iri(entity: &NamedNode, number: u32) -> NamedNode {
    NamedNode::new_unchecked(format!("{}/prov/se/{number}", entity.as_str()))
}

/// Several entity histories with their log and live graph.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub histories: Vec<EntityHistory>,
    pub graph: MemoryGraph,
}

impl Scenario {
    pub fn new(histories: Vec<EntityHistory>) -> Self {
        let graph = histories
            .iter()
            .flat_map(|h| h.final_state())
            .collect::<MemoryGraph>();
        Self { histories, graph }
    }

    /// A freshly built log; each call yields a new log version.
    pub fn log(&self) -> ChronaResult<ProvenanceLog> {
        let mut builder = ProvenanceLog::builder();
        for record in self.histories.iter().flat_map(|h| h.records()) {
            builder.push(record);
        }
        builder.build()
    }

    pub fn engine(&self, config: TemporalConfig) -> ChronaResult<MemoryEngine> {
        Ok(TemporalEngine::new(
            self.log()?,
            Arc::new(self.graph.clone()),
            Arc::new(BasicGraphMatcher),
            config,
        ))
    }

    pub fn history(&self, entity: &NamedNode) -> Option<&EntityHistory> {
        self.histories.iter().find(|h| &h.entity == entity)
    }

    pub fn entities(&self) -> Vec<NamedNode> {
        self.histories.iter().map(|h| h.entity.clone()).collect()
    }

    /// Every generation time in the scenario, sorted and deduplicated.
    pub fn change_points(&self) -> Vec<DateTime<Utc>> {
        let mut points: Vec<_> = self
            .histories
            .iter()
            .flat_map(|h| h.generation_times())
            .collect();
        points.sort();
        points.dedup();
        points
    }

    /// Provenance graph describing every snapshot, using the default
    /// vocabulary and `/prov/se/<n>` snapshot IRIs.
    pub fn provenance_triples(&self) -> Vec<Triple> {
        let vocab = ProvenanceVocabulary::default();
        let mut out = Vec::new();
        for record in self.histories.iter().flat_map(|h| h.records()) {
            let se = snapshot_iri(&record.entity, record.number);
            out.push(triple(&se, &vocab.specialization_of, record.entity.clone()));
            out.push(triple(&se, &vocab.generated_at_time, datetime(record.generation_time)));
            if let Some(end) = record.invalidation_time {
                out.push(triple(&se, &vocab.invalidated_at_time, datetime(end)));
            }
            if let Some(description) = &record.metadata.description {
                out.push(triple(&se, &vocab.description, lit(description)));
            }
            if let Some(diff) = record.update.as_ref().filter(|d| !d.is_empty()) {
                out.push(triple(&se, &vocab.has_update_query, lit(&render_update(diff))));
            }
        }
        out
    }
}

fn datetime(at: DateTime<Utc>) -> Term {
    Literal::new_typed_literal(at.to_rfc3339(), xsd::DATE_TIME).into()
}

pub fn name() -> NamedNode {
    iri("name")
}

pub fn knows() -> NamedNode {
    iri("knows")
}

/// The reference scenario: `E1` has `name "A"` during 2020 and
/// `name "B"` from 2021 on.
pub fn e1_history() -> EntityHistory {
    let e1 = iri("E1");
    EntityHistory::new(&e1, day(2020, 1, 1), [triple(&e1, &name(), lit("A"))]).change(
        day(2021, 1, 1),
        [triple(&e1, &name(), lit("B"))],
        [triple(&e1, &name(), lit("A"))],
    )
}

pub fn e1_scenario() -> Scenario {
    Scenario::new(vec![e1_history()])
}

/// `E1` starts knowing `E2` in mid 2020; `E2` is renamed in 2021; `E3`
/// only appears in 2022.
pub fn social_scenario() -> Scenario {
    let (e1, e2, e3) = (iri("E1"), iri("E2"), iri("E3"));
    let e1_history = EntityHistory::new(&e1, day(2020, 1, 1), [triple(&e1, &name(), lit("A"))])
        .change(day(2020, 6, 1), [triple(&e1, &knows(), e2.clone())], [])
        .change(day(2022, 1, 1), [triple(&e1, &knows(), e3.clone())], []);
    let e2_history = EntityHistory::new(&e2, day(2020, 1, 1), [triple(&e2, &name(), lit("Bob"))])
        .change(
            day(2021, 1, 1),
            [triple(&e2, &name(), lit("Robert"))],
            [triple(&e2, &name(), lit("Bob"))],
        );
    let e3_history =
        EntityHistory::new(&e3, day(2022, 1, 1), [triple(&e3, &name(), lit("Carol"))]);
    Scenario::new(vec![e1_history, e2_history, e3_history])
}

/// Pool of triples a generated history toggles: three predicates, eight
/// literal values.
pub fn toggle_pool(entity: &NamedNode) -> Vec<Triple> {
    (0..8)
        .map(|k| {
            let predicate = iri(&format!("p{}", k % 3));
            triple(entity, &predicate, lit(&format!("v{k}")))
        })
        .collect()
}

/// Build a history from toggle steps. Step 0 is the initial state; every
/// index in a later step flips the membership of `toggle_pool[index % 8]`,
/// so every recorded diff is effective. Snapshots are 10 days apart
/// starting at `start`.
pub fn history_from_toggles(
    entity: &NamedNode,
    start: DateTime<Utc>,
    steps: &[Vec<u8>],
) -> EntityHistory {
    let pool = toggle_pool(entity);
    let pick = |indices: &[u8]| -> Vec<usize> {
        let mut picked: Vec<usize> = indices.iter().map(|i| *i as usize % pool.len()).collect();
        picked.sort_unstable();
        picked.dedup();
        picked
    };

    let initial = steps
        .first()
        .map(|s| pick(s.as_slice()))
        .unwrap_or_default()
        .into_iter()
        .map(|i| pool[i].clone());
    let mut history = EntityHistory::new(entity, start, initial);
    let mut state = history.initial.clone();

    for (offset, step) in steps.iter().enumerate().skip(1) {
        let mut inserted = TripleSet::default();
        let mut deleted = TripleSet::default();
        for i in pick(step.as_slice()) {
            let t = pool[i].clone();
            if state.remove(&t) {
                deleted.insert(t);
            } else {
                state.insert(t.clone());
                inserted.insert(t);
            }
        }
        let at = start + Duration::days(10 * offset as i64);
        history.changes.push((at, UpdateDiff::new(inserted, deleted)));
    }
    history
}

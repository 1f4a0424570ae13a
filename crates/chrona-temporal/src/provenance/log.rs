//! The provenance log: an arena of snapshot records with a per-entity
//! sorted index of generation times.

use std::sync::atomic::{AtomicU64, Ordering};

use chrona_core::config::InvariantPolicy;
use chrona_core::errors::{ChronaResult, ProvenanceError, TemporalError};
use chrona_core::models::SnapshotRecord;
use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use super::validation::validate_chain;

static NEXT_LOG_VERSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct EntityChain {
    /// Index of snapshot 1 in the arena. The chain is contiguous.
    start: usize,
    generation_times: Vec<DateTime<Utc>>,
}

/// Immutable, validated snapshot chains for every tracked entity.
///
/// Each build gets a process-unique version number; caches key their
/// lifetime on it so a reloaded log never sees stale states.
#[derive(Debug)]
pub struct ProvenanceLog {
    records: Vec<SnapshotRecord>,
    chains: FxHashMap<NamedNode, EntityChain>,
    quarantined: FxHashMap<NamedNode, ProvenanceError>,
    version: u64,
}

impl ProvenanceLog {
    pub fn builder() -> ProvenanceLogBuilder {
        ProvenanceLogBuilder::new()
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            chains: FxHashMap::default(),
            quarantined: FxHashMap::default(),
            version: NEXT_LOG_VERSION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entity_count(&self) -> usize {
        self.chains.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.records.len()
    }

    /// Whether `entity` has a valid chain. Quarantined entities do not count.
    pub fn contains(&self, entity: &NamedNode) -> bool {
        self.chains.contains_key(entity)
    }

    /// Tracked entities ordered by IRI.
    pub fn entities(&self) -> Vec<&NamedNode> {
        let mut entities: Vec<&NamedNode> = self.chains.keys().collect();
        entities.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        entities
    }

    pub fn quarantined(&self) -> impl Iterator<Item = (&NamedNode, &ProvenanceError)> {
        self.quarantined.iter()
    }

    pub fn records(&self) -> &[SnapshotRecord] {
        &self.records
    }

    /// The entity's snapshots ordered by number.
    pub fn snapshots(&self, entity: &NamedNode) -> ChronaResult<&[SnapshotRecord]> {
        let chain = self.chain(entity)?;
        Ok(&self.records[chain.start..chain.start + chain.generation_times.len()])
    }

    pub fn snapshot(&self, entity: &NamedNode, number: u32) -> ChronaResult<&SnapshotRecord> {
        let snapshots = self.snapshots(entity)?;
        number
            .checked_sub(1)
            .and_then(|index| snapshots.get(index as usize))
            .ok_or_else(|| {
                ProvenanceError::invariant(entity.as_str(), format!("no snapshot {number}")).into()
            })
    }

    pub fn current(&self, entity: &NamedNode) -> ChronaResult<&SnapshotRecord> {
        let snapshots = self.snapshots(entity)?;
        snapshots.last().ok_or_else(|| {
            ProvenanceError::invariant(entity.as_str(), "entity has no snapshots").into()
        })
    }

    /// The unique snapshot whose interval contains `at`.
    pub fn snapshot_covering(
        &self,
        entity: &NamedNode,
        at: DateTime<Utc>,
    ) -> ChronaResult<&SnapshotRecord> {
        let chain = self.chain(entity)?;
        let position = chain.generation_times.partition_point(|g| *g <= at);
        if position == 0 {
            return Err(TemporalError::NoProvenanceAtTime {
                entity: entity.to_string(),
                at,
            }
            .into());
        }
        Ok(&self.records[chain.start + position - 1])
    }

    /// Snapshots generated in `(after, up_to]`, ordered by number.
    pub fn generated_between(
        &self,
        entity: &NamedNode,
        after: DateTime<Utc>,
        up_to: DateTime<Utc>,
    ) -> ChronaResult<&[SnapshotRecord]> {
        let chain = self.chain(entity)?;
        let first = chain.generation_times.partition_point(|g| *g <= after);
        let last = chain.generation_times.partition_point(|g| *g <= up_to);
        let last = last.max(first);
        Ok(&self.records[chain.start + first..chain.start + last])
    }

    fn chain(&self, entity: &NamedNode) -> ChronaResult<&EntityChain> {
        if let Some(chain) = self.chains.get(entity) {
            return Ok(chain);
        }
        if let Some(error) = self.quarantined.get(entity) {
            return Err(error.clone().into());
        }
        Err(TemporalError::EntityNotFound {
            entity: entity.to_string(),
        }
        .into())
    }
}

/// Collects snapshot records and validates them into a `ProvenanceLog`.
#[derive(Debug)]
pub struct ProvenanceLogBuilder {
    records: Vec<SnapshotRecord>,
    policy: InvariantPolicy,
}

impl Default for ProvenanceLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvenanceLogBuilder {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            policy: InvariantPolicy::Reject,
        }
    }

    pub fn policy(mut self, policy: InvariantPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn record(mut self, record: SnapshotRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn push(&mut self, record: SnapshotRecord) {
        self.records.push(record);
    }

    /// Group by entity, sort by number, validate, and lay out the arena.
    ///
    /// Under `InvariantPolicy::Reject` the first violating entity (in IRI
    /// order) fails the build. Under `Quarantine` violating entities are left
    /// out and their error is returned by every later lookup on them.
    pub fn build(self) -> ChronaResult<ProvenanceLog> {
        let mut grouped: FxHashMap<NamedNode, Vec<SnapshotRecord>> = FxHashMap::default();
        for record in self.records {
            grouped.entry(record.entity.clone()).or_default().push(record);
        }

        let mut entities: Vec<NamedNode> = grouped.keys().cloned().collect();
        entities.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut log = ProvenanceLog::empty();
        for entity in entities {
            let Some(mut chain) = grouped.remove(&entity) else {
                continue;
            };
            chain.sort_by_key(|r| r.number);
            if let Err(error) = validate_chain(&entity, &chain) {
                match self.policy {
                    InvariantPolicy::Reject => return Err(error.into()),
                    InvariantPolicy::Quarantine => {
                        warn!(entity = %entity, error = %error, "quarantining entity");
                        log.quarantined.insert(entity, error);
                        continue;
                    }
                }
            }
            let start = log.records.len();
            let generation_times = chain.iter().map(|r| r.generation_time).collect();
            log.records.extend(chain);
            log.chains.insert(entity, EntityChain { start, generation_times });
        }

        info!(
            version = log.version,
            entities = log.chains.len(),
            snapshots = log.records.len(),
            quarantined = log.quarantined.len(),
            "provenance log built"
        );
        Ok(log)
    }
}

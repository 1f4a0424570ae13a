//! Provenance log loading from RDF triples.
//!
//! Each snapshot is a resource described by the provenance vocabulary:
//!
//! ```text
//! <.../br/1/prov/se/2> prov:specializationOf <.../br/1> ;
//!     prov:generatedAtTime "2021-01-01T00:00:00Z"^^xsd:dateTime ;
//!     prov:invalidatedAtTime "2022-01-01T00:00:00Z"^^xsd:dateTime ;
//!     oco:hasUpdateQuery "DELETE DATA { ... } ; INSERT DATA { ... }" .
//! ```

use chrona_core::config::{InvariantPolicy, ProvenanceConfig};
use chrona_core::errors::{ChronaResult, ProvenanceError};
use chrona_core::models::{SnapshotMetadata, SnapshotRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use oxrdf::{NamedNode, Subject, Term, Triple};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::log::ProvenanceLog;
use super::update_query::parse_update;
use super::vocabulary::ProvenanceVocabulary;

/// Builds a `ProvenanceLog` from the triples of a provenance graph.
#[derive(Debug, Clone)]
pub struct ProvenanceLoader {
    vocabulary: ProvenanceVocabulary,
    policy: InvariantPolicy,
}

impl Default for ProvenanceLoader {
    fn default() -> Self {
        Self::new(ProvenanceVocabulary::default(), InvariantPolicy::Reject)
    }
}

#[derive(Debug, Default)]
struct RawSnapshot {
    entity: Option<NamedNode>,
    generated: Option<DateTime<Utc>>,
    invalidated: Option<DateTime<Utc>>,
    agent: Option<String>,
    source: Option<String>,
    description: Option<String>,
    update_query: Option<String>,
}

impl ProvenanceLoader {
    pub fn new(vocabulary: ProvenanceVocabulary, policy: InvariantPolicy) -> Self {
        Self { vocabulary, policy }
    }

    pub fn from_config(config: &ProvenanceConfig) -> ChronaResult<Self> {
        Ok(Self::new(
            ProvenanceVocabulary::from_config(config)?,
            config.invariant_policy,
        ))
    }

    /// Parse every snapshot described in `triples` and validate the chains.
    ///
    /// Triples whose predicate is outside the vocabulary are ignored. A
    /// malformed snapshot fails the whole load with a parse error.
    pub fn load<I>(&self, triples: I) -> ChronaResult<ProvenanceLog>
    where
        I: IntoIterator<Item = Triple>,
    {
        let raw = self.collect(triples)?;
        debug!(snapshots = raw.len(), "provenance triples grouped");

        let mut by_entity: FxHashMap<NamedNode, Vec<(NamedNode, RawSnapshot)>> =
            FxHashMap::default();
        for (iri, snapshot) in raw {
            let entity = snapshot.entity.clone().ok_or_else(|| {
                ProvenanceError::parse(iri.as_str(), "missing specializationOf")
            })?;
            by_entity.entry(entity).or_default().push((iri, snapshot));
        }

        let mut builder = ProvenanceLog::builder().policy(self.policy);
        for (entity, snapshots) in by_entity {
            for record in number_snapshots(entity, snapshots)? {
                builder.push(record);
            }
        }
        builder.build()
    }

    fn collect<I>(&self, triples: I) -> ChronaResult<Vec<(NamedNode, RawSnapshot)>>
    where
        I: IntoIterator<Item = Triple>,
    {
        let vocab = &self.vocabulary;
        let mut snapshots: FxHashMap<NamedNode, RawSnapshot> = FxHashMap::default();

        for triple in triples {
            let predicate = &triple.predicate;
            let recognised = [
                &vocab.specialization_of,
                &vocab.generated_at_time,
                &vocab.invalidated_at_time,
                &vocab.was_attributed_to,
                &vocab.had_primary_source,
                &vocab.description,
                &vocab.has_update_query,
            ]
            .contains(&predicate);
            if !recognised {
                continue;
            }

            let subject = match &triple.subject {
                Subject::NamedNode(node) => node.clone(),
                other => {
                    return Err(
                        ProvenanceError::parse(other.to_string(), "snapshot is not an IRI").into(),
                    )
                }
            };
            let raw = snapshots.entry(subject.clone()).or_default();
            let object = &triple.object;

            if predicate == &vocab.specialization_of {
                let entity = match object {
                    Term::NamedNode(node) => node.clone(),
                    _ => {
                        return Err(ProvenanceError::parse(
                            subject.as_str(),
                            "specializationOf must point to an IRI",
                        )
                        .into())
                    }
                };
                set_once(&mut raw.entity, entity, &subject, "specializationOf")?;
            } else if predicate == &vocab.generated_at_time {
                let at = datetime_value(object, &subject, "generatedAtTime")?;
                set_once(&mut raw.generated, at, &subject, "generatedAtTime")?;
            } else if predicate == &vocab.invalidated_at_time {
                let at = datetime_value(object, &subject, "invalidatedAtTime")?;
                set_once(&mut raw.invalidated, at, &subject, "invalidatedAtTime")?;
            } else if predicate == &vocab.was_attributed_to {
                set_once(&mut raw.agent, text_value(object), &subject, "wasAttributedTo")?;
            } else if predicate == &vocab.had_primary_source {
                set_once(&mut raw.source, text_value(object), &subject, "hadPrimarySource")?;
            } else if predicate == &vocab.description {
                set_once(&mut raw.description, text_value(object), &subject, "description")?;
            } else if predicate == &vocab.has_update_query {
                set_once(&mut raw.update_query, text_value(object), &subject, "hasUpdateQuery")?;
            }
        }
        Ok(snapshots.into_iter().collect())
    }
}

/// Assign snapshot numbers and decode diffs. Numbers come from the trailing
/// path segment of the snapshot IRI (`.../prov/se/3`); if any snapshot of the
/// entity lacks one, all of them are numbered by generation order instead.
fn number_snapshots(
    entity: NamedNode,
    mut snapshots: Vec<(NamedNode, RawSnapshot)>,
) -> ChronaResult<Vec<SnapshotRecord>> {
    let mut generated = Vec::with_capacity(snapshots.len());
    for (iri, raw) in &snapshots {
        let at = raw
            .generated
            .ok_or_else(|| ProvenanceError::parse(iri.as_str(), "missing generatedAtTime"))?;
        generated.push(at);
    }

    let suffixes: Option<Vec<u32>> = snapshots.iter().map(|(iri, _)| snapshot_number(iri)).collect();
    let numbers = match suffixes {
        Some(numbers) => numbers,
        None => {
            let mut order: Vec<usize> = (0..snapshots.len()).collect();
            order.sort_by_key(|&i| generated[i]);
            let mut numbers = vec![0; snapshots.len()];
            for (rank, index) in order.into_iter().enumerate() {
                numbers[index] = rank as u32 + 1;
            }
            numbers
        }
    };

    let mut records = Vec::with_capacity(snapshots.len());
    for (((iri, raw), number), generation_time) in
        snapshots.drain(..).zip(numbers).zip(generated)
    {
        let update = raw
            .update_query
            .as_deref()
            .map(parse_update)
            .transpose()
            .map_err(|e| ProvenanceError::parse(iri.as_str(), e.to_string()))?;
        let initial_triples = match &update {
            Some(diff) if number == 1 && diff.deleted.is_empty() => Some(diff.inserted.clone()),
            _ => None,
        };
        records.push(SnapshotRecord {
            entity: entity.clone(),
            number,
            generation_time,
            invalidation_time: raw.invalidated,
            update,
            initial_triples,
            metadata: SnapshotMetadata {
                iri: Some(iri),
                responsible_agent: raw.agent,
                primary_source: raw.source,
                description: raw.description,
            },
        });
    }
    Ok(records)
}

fn snapshot_number(iri: &NamedNode) -> Option<u32> {
    iri.as_str()
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|n| *n > 0)
}

fn set_once<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    subject: &NamedNode,
    property: &str,
) -> Result<(), ProvenanceError> {
    match slot {
        Some(existing) if *existing != value => Err(ProvenanceError::parse(
            subject.as_str(),
            format!("conflicting values for {property}"),
        )),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

fn text_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

fn datetime_value(
    term: &Term,
    subject: &NamedNode,
    property: &str,
) -> Result<DateTime<Utc>, ProvenanceError> {
    let value = match term {
        Term::Literal(literal) => literal.value(),
        _ => {
            return Err(ProvenanceError::parse(
                subject.as_str(),
                format!("{property} must be a literal"),
            ))
        }
    };
    parse_xsd_datetime(value).ok_or_else(|| {
        ProvenanceError::parse(
            subject.as_str(),
            format!("{property} is not a dateTime: {value}"),
        )
    })
}

/// Parse an `xsd:dateTime` lexical form. Values without a timezone are UTC.
pub fn parse_xsd_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrona_core::errors::ErrorKind;
    use chrono::TimeZone;
    use oxrdf::vocab::xsd;
    use oxrdf::Literal;

    const ENTITY: &str = "http://ex.org/br/1";

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    fn dt(value: &str) -> Literal {
        Literal::new_typed_literal(value, xsd::DATE_TIME)
    }

    fn snapshot_triples(n: u32, from: &str, to: Option<&str>, update: Option<&str>) -> Vec<Triple> {
        let vocab = ProvenanceVocabulary::default();
        let se = iri(&format!("{ENTITY}/prov/se/{n}"));
        let mut triples = vec![
            Triple::new(se.clone(), vocab.specialization_of.clone(), iri(ENTITY)),
            Triple::new(se.clone(), vocab.generated_at_time.clone(), dt(from)),
            Triple::new(
                se.clone(),
                vocab.was_attributed_to.clone(),
                iri("https://orcid.org/0000-0000"),
            ),
        ];
        if let Some(to) = to {
            triples.push(Triple::new(se.clone(), vocab.invalidated_at_time.clone(), dt(to)));
        }
        if let Some(update) = update {
            triples.push(Triple::new(
                se,
                vocab.has_update_query.clone(),
                Literal::new_simple_literal(update),
            ));
        }
        triples
    }

    #[test]
    fn loads_numbered_chain_with_diffs() {
        let mut triples = snapshot_triples(1, "2020-01-01T00:00:00Z", Some("2021-01-01T00:00:00Z"), None);
        triples.extend(snapshot_triples(
            2,
            "2021-01-01T00:00:00Z",
            None,
            Some(r#"DELETE DATA { <http://ex.org/br/1> <http://ex.org/p> "A" . } ; INSERT DATA { <http://ex.org/br/1> <http://ex.org/p> "B" . }"#),
        ));
        let log = ProvenanceLoader::default().load(triples).unwrap();

        let snapshots = log.snapshots(&iri(ENTITY)).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].update.is_none());
        let diff = snapshots[1].update.as_ref().unwrap();
        assert_eq!(diff.inserted.len(), 1);
        assert_eq!(diff.deleted.len(), 1);
        assert_eq!(
            snapshots[1].metadata.responsible_agent.as_deref(),
            Some("https://orcid.org/0000-0000")
        );
    }

    #[test]
    fn timezone_less_values_are_utc() {
        let at = parse_xsd_datetime("2020-06-01T12:30:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2020, 6, 1, 12, 30, 0).unwrap());
        let offset = parse_xsd_datetime("2020-06-01T14:30:00+02:00").unwrap();
        assert_eq!(offset, at);
        let fractional = parse_xsd_datetime("2020-06-01T12:30:00.250").unwrap();
        assert!(fractional > at);
    }

    #[test]
    fn creation_update_becomes_initial_triples() {
        let triples = snapshot_triples(
            1,
            "2020-01-01T00:00:00Z",
            None,
            Some(r#"INSERT DATA { <http://ex.org/br/1> <http://ex.org/p> "A" . }"#),
        );
        let log = ProvenanceLoader::default().load(triples).unwrap();
        let first = log.snapshot(&iri(ENTITY), 1).unwrap();
        assert_eq!(first.initial_triples.as_ref().map(|t| t.len()), Some(1));
    }

    #[test]
    fn unnumbered_snapshots_are_ordered_by_generation_time() {
        let vocab = ProvenanceVocabulary::default();
        let later = iri("http://ex.org/snap/b");
        let earlier = iri("http://ex.org/snap/a");
        let triples = vec![
            Triple::new(later.clone(), vocab.specialization_of.clone(), iri(ENTITY)),
            Triple::new(later.clone(), vocab.generated_at_time.clone(), dt("2021-01-01T00:00:00Z")),
            Triple::new(earlier.clone(), vocab.specialization_of.clone(), iri(ENTITY)),
            Triple::new(earlier.clone(), vocab.generated_at_time.clone(), dt("2020-01-01T00:00:00Z")),
            Triple::new(earlier.clone(), vocab.invalidated_at_time.clone(), dt("2021-01-01T00:00:00Z")),
        ];
        let log = ProvenanceLoader::default().load(triples).unwrap();
        let first = log.snapshot(&iri(ENTITY), 1).unwrap();
        assert_eq!(first.metadata.iri.as_ref(), Some(&earlier));
    }

    #[test]
    fn missing_generation_time_is_a_parse_error() {
        let vocab = ProvenanceVocabulary::default();
        let se = iri("http://ex.org/br/1/prov/se/1");
        let triples = vec![Triple::new(se, vocab.specialization_of.clone(), iri(ENTITY))];
        let err = ProvenanceLoader::default().load(triples).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProvenanceParse);
    }

    #[test]
    fn bad_datetime_is_a_parse_error() {
        let triples = snapshot_triples(1, "yesterday", None, None);
        let err = ProvenanceLoader::default().load(triples).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProvenanceParse);
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn conflicting_entities_are_a_parse_error() {
        let vocab = ProvenanceVocabulary::default();
        let se = iri("http://ex.org/br/1/prov/se/1");
        let mut triples = snapshot_triples(1, "2020-01-01T00:00:00Z", None, None);
        triples.push(Triple::new(se, vocab.specialization_of.clone(), iri("http://ex.org/br/2")));
        let err = ProvenanceLoader::default().load(triples).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProvenanceParse);
    }

    #[test]
    fn malformed_update_query_is_a_parse_error() {
        let triples = snapshot_triples(1, "2020-01-01T00:00:00Z", None, Some("INSERT DATA { oops"));
        let err = ProvenanceLoader::default().load(triples).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProvenanceParse);
    }

    #[test]
    fn broken_chain_is_an_invariant_error() {
        let mut triples = snapshot_triples(1, "2020-01-01T00:00:00Z", None, None);
        triples.extend(snapshot_triples(2, "2021-01-01T00:00:00Z", None, None));
        let err = ProvenanceLoader::default().load(triples).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProvenanceInvariant);
    }
}

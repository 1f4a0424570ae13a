//! Across-time evaluation: partitioning, coalescing, discovery, coverage
//! and cancellation.

use std::collections::BTreeMap;

use chrona_core::config::{CoveragePolicy, TemporalConfig};
use chrona_core::errors::ErrorKind;
use chrona_core::models::{PatternTerm, ResultSet, Solution, TimeInterval, TriplePattern};
use chrona_core::traits::ITemporalEngine;
use chrono::Duration;
use oxrdf::Term;
use test_fixtures::{
    day, e1_scenario, init_tracing, iri, knows, lit, name, social_scenario, MemoryEngine,
};

fn solution(bindings: &[(&str, Term)]) -> Solution {
    bindings
        .iter()
        .map(|(var, term)| (var.to_string(), term.clone()))
        .collect::<BTreeMap<_, _>>()
}

fn results(rows: &[&[(&str, Term)]]) -> ResultSet {
    rows.iter().map(|row| solution(row)).collect()
}

fn social_engine(policy: CoveragePolicy) -> MemoryEngine {
    init_tracing();
    let config = TemporalConfig {
        coverage_policy: policy,
        ..TemporalConfig::default()
    };
    social_scenario().engine(config).unwrap()
}

fn name_of(subject: &str) -> TriplePattern {
    TriplePattern::new(iri(subject), name(), PatternTerm::var("o"))
}

fn any_name() -> TriplePattern {
    TriplePattern::new(PatternTerm::var("s"), name(), PatternTerm::var("n"))
}

/// `E1 knows ?y . ?y name ?n`
fn friends_names() -> Vec<TriplePattern> {
    vec![
        TriplePattern::new(iri("E1"), knows(), PatternTerm::var("y")),
        TriplePattern::new(PatternTerm::var("y"), name(), PatternTerm::var("n")),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// Reference scenario
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn rename_splits_the_range_in_two() {
    let engine = e1_scenario().engine(TemporalConfig::default()).unwrap();
    let range = TimeInterval::closed(day(2020, 1, 1), day(2022, 1, 1));

    let slices = engine.evaluate_across_time(&[name_of("E1")], range).unwrap();
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].interval, TimeInterval::closed(day(2020, 1, 1), day(2021, 1, 1)));
    assert_eq!(slices[0].results, results(&[&[("o", lit("A"))]]));
    assert_eq!(slices[1].interval, TimeInterval::closed(day(2021, 1, 1), day(2022, 1, 1)));
    assert_eq!(slices[1].results, results(&[&[("o", lit("B"))]]));
}

#[test]
fn range_before_creation_is_an_empty_uncovered_slice() {
    let engine = e1_scenario().engine(TemporalConfig::default()).unwrap();
    let range = TimeInterval::closed(day(2019, 1, 1), day(2022, 1, 1));

    let slices = engine.evaluate_across_time(&[name_of("E1")], range).unwrap();
    assert_eq!(slices.len(), 3);
    assert_eq!(slices[0].interval, TimeInterval::closed(day(2019, 1, 1), day(2020, 1, 1)));
    assert!(slices[0].results.is_empty());
    assert_eq!(slices[0].uncovered, vec![iri("E1")]);
    assert!(slices[1].uncovered.is_empty());
}

#[test]
fn fail_fast_policy_rejects_uncovered_ranges() {
    let config = TemporalConfig {
        coverage_policy: CoveragePolicy::FailFast,
        ..TemporalConfig::default()
    };
    let engine = e1_scenario().engine(config).unwrap();
    let range = TimeInterval::closed(day(2019, 1, 1), day(2022, 1, 1));

    let err = engine
        .evaluate_across_time(&[name_of("E1")], range)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoProvenanceAtTime);
}

#[test]
fn open_range_ends_with_an_open_slice() {
    let engine = e1_scenario().engine(TemporalConfig::default()).unwrap();
    let slices = engine
        .evaluate_across_time(&[name_of("E1")], TimeInterval::open(day(2020, 6, 1)))
        .unwrap();
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].interval.start, day(2020, 6, 1));
    assert!(slices[1].interval.is_open());
}

#[test]
fn empty_range_is_rejected() {
    let engine = e1_scenario().engine(TemporalConfig::default()).unwrap();
    for range in [
        TimeInterval::closed(day(2021, 1, 1), day(2021, 1, 1)),
        TimeInterval::closed(day(2022, 1, 1), day(2021, 1, 1)),
    ] {
        let err = engine
            .evaluate_across_time(&[name_of("E1")], range)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTimeRange);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Coalescing and discovery
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn changes_outside_the_pattern_are_coalesced_away() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));

    let plan = engine.across_time(&[any_name()], range).unwrap();
    assert_eq!(plan.candidates(), &[iri("E1"), iri("E2"), iri("E3")]);
    assert_eq!(plan.intervals().len(), 4);

    let slices = plan.collect_slices().unwrap();
    assert_eq!(slices.len(), 3);
    assert_eq!(slices[0].interval, TimeInterval::closed(day(2020, 1, 1), day(2021, 1, 1)));
    assert_eq!(
        slices[0].results,
        results(&[
            &[("s", iri("E1").into()), ("n", lit("A"))],
            &[("s", iri("E2").into()), ("n", lit("Bob"))],
        ])
    );
    assert_eq!(slices[0].uncovered, vec![iri("E3")]);
    assert_eq!(slices[2].interval, TimeInterval::closed(day(2022, 1, 1), day(2023, 1, 1)));
    assert_eq!(slices[2].results.len(), 3);
    assert!(slices[2].uncovered.is_empty());
}

#[test]
fn join_discovers_linked_entities() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));

    let plan = engine.across_time(&friends_names(), range).unwrap();
    assert_eq!(plan.candidates(), &[iri("E1"), iri("E2"), iri("E3")]);

    let slices = plan.collect_slices().unwrap();
    assert_eq!(slices.len(), 4);
    assert!(slices[0].results.is_empty());
    assert_eq!(
        slices[1].results,
        results(&[&[("y", iri("E2").into()), ("n", lit("Bob"))]])
    );
    assert_eq!(
        slices[2].results,
        results(&[&[("y", iri("E2").into()), ("n", lit("Robert"))]])
    );
    assert_eq!(
        slices[3].results,
        results(&[
            &[("y", iri("E2").into()), ("n", lit("Robert"))],
            &[("y", iri("E3").into()), ("n", lit("Carol"))],
        ])
    );
}

#[test]
fn slices_partition_the_range() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2019, 6, 1), day(2023, 1, 1));

    let slices = engine.evaluate_across_time(&friends_names(), range).unwrap();
    assert_eq!(slices[0].interval.start, range.start);
    assert_eq!(slices[slices.len() - 1].interval.end, range.end);
    for pair in slices.windows(2) {
        assert!(pair[0].interval.adjoins(&pair[1].interval));
        assert_ne!(pair[0].results, pair[1].results, "neighbours must differ");
    }
}

#[test]
fn answer_is_constant_inside_each_slice() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));
    let plan = engine.across_time(&friends_names(), range).unwrap();
    let slices = plan.collect_slices().unwrap();

    for slice in &slices {
        let end = slice.interval.end.unwrap_or(day(2023, 1, 1));
        for at in [slice.interval.start, end - Duration::seconds(1)] {
            let direct = plan.evaluate_at(at).unwrap().unwrap();
            assert_eq!(direct.results, slice.results, "at {at}");
        }
    }
    assert!(plan.evaluate_at(day(2024, 1, 1)).is_none());
}

#[test]
fn evaluation_is_counted_per_interval() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));
    engine.evaluate_across_time(&[any_name()], range).unwrap();
    assert_eq!(engine.stats().intervals_evaluated, 4);
}

// ═══════════════════════════════════════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn cancelled_before_start_yields_cancelled() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));
    let plan = engine.across_time(&friends_names(), range).unwrap();
    plan.cancellation().cancel();

    let mut iter = plan.iter();
    let err = iter.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(iter.next().is_none());
}

#[test]
fn cancellation_stops_before_the_next_interval() {
    let engine = social_engine(CoveragePolicy::GapAsEmpty);
    let range = TimeInterval::closed(day(2020, 1, 1), day(2023, 1, 1));
    let flag = chrona_temporal::CancellationFlag::new();
    let plan = engine
        .across_time(&friends_names(), range)
        .unwrap()
        .with_cancellation(flag.clone());

    let mut iter = plan.iter();
    let first = iter.next().unwrap().unwrap();
    assert!(first.results.is_empty());

    flag.cancel();
    let err = iter.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(iter.next().is_none());
    assert_eq!(engine.stats().intervals_evaluated, 2);
}

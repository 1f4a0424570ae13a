//! Property tests over randomly generated, effective entity histories.

use chrona_core::config::{DeltaStrategy, ReplayDirection, TemporalConfig};
use chrona_core::models::{PatternTerm, TimeInterval, TriplePattern};
use chrona_core::traits::{ITemporalEngine, PatternMatcher};
use chrona_store::BasicGraphMatcher;
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use test_fixtures::{day, history_from_toggles, iri, Scenario};

fn arb_steps() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..8, 0..4), 1..7)
}

/// Two entities whose histories interleave: the second starts 5 days later.
fn scenario(a: &[Vec<u8>], b: &[Vec<u8>]) -> Scenario {
    Scenario::new(vec![
        history_from_toggles(&iri("A"), day(2020, 1, 1), a),
        history_from_toggles(&iri("B"), day(2020, 1, 6), b),
    ])
}

fn config(direction: ReplayDirection, strategy: DeltaStrategy) -> TemporalConfig {
    TemporalConfig {
        replay_direction: direction,
        delta_strategy: strategy,
        ..TemporalConfig::default()
    }
}

/// Change points, the instant before each, and a point after everything.
fn instants(scenario: &Scenario) -> Vec<DateTime<Utc>> {
    let mut instants = vec![day(2019, 12, 1), day(2022, 1, 1)];
    for point in scenario.change_points() {
        instants.push(point);
        instants.push(point - Duration::hours(1));
    }
    instants.sort();
    instants.dedup();
    instants
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_direction_matches_the_oracle(a in arb_steps(), b in arb_steps()) {
        let scenario = scenario(&a, &b);
        for direction in [ReplayDirection::Backward, ReplayDirection::Forward, ReplayDirection::Auto] {
            let engine = scenario.engine(config(direction, DeltaStrategy::Auto)).unwrap();
            for history in &scenario.histories {
                for at in instants(&scenario) {
                    match history.state_at(at) {
                        Some(expected) => {
                            let state = engine.materialize(&history.entity, at).unwrap();
                            prop_assert_eq!(&*state.triples, &expected);
                        }
                        None => prop_assert!(engine.materialize(&history.entity, at).is_err()),
                    }
                }
            }
        }
    }

    #[test]
    fn prop_baseline_equals_composed(a in arb_steps(), b in arb_steps()) {
        let scenario = scenario(&a, &b);
        let baseline = scenario.engine(config(ReplayDirection::Backward, DeltaStrategy::Baseline)).unwrap();
        let composed = scenario.engine(config(ReplayDirection::Backward, DeltaStrategy::Composed)).unwrap();
        let instants = instants(&scenario);
        for entity in scenario.entities() {
            for (i, from) in instants.iter().enumerate() {
                for to in &instants[i..] {
                    prop_assert_eq!(
                        baseline.delta(&entity, *from, *to).unwrap(),
                        composed.delta(&entity, *from, *to).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn prop_self_delta_is_empty(a in arb_steps()) {
        let scenario = scenario(&a, &[]);
        let engine = scenario.engine(TemporalConfig::default()).unwrap();
        for at in instants(&scenario) {
            prop_assert!(engine.delta(&iri("A"), at, at).unwrap().is_empty());
        }
    }

    #[test]
    fn prop_deltas_compose(a in arb_steps(), i in 0usize..64, j in 0usize..64, k in 0usize..64) {
        let scenario = scenario(&a, &[]);
        let engine = scenario.engine(TemporalConfig::default()).unwrap();
        let instants = instants(&scenario);
        let mut picks = [instants[i % instants.len()], instants[j % instants.len()], instants[k % instants.len()]];
        picks.sort();
        let [t1, t2, t3] = picks;
        let entity = iri("A");

        let whole = engine.delta(&entity, t1, t3).unwrap();
        let split = engine
            .delta(&entity, t1, t2)
            .unwrap()
            .merge(&engine.delta(&entity, t2, t3).unwrap());
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn prop_slices_partition_and_stay_constant(a in arb_steps(), b in arb_steps()) {
        let scenario = scenario(&a, &b);
        let engine = scenario.engine(TemporalConfig::default()).unwrap();
        let range = TimeInterval::closed(day(2019, 12, 1), day(2021, 1, 1));
        let patterns = [TriplePattern::new(
            PatternTerm::var("s"),
            PatternTerm::var("p"),
            PatternTerm::var("o"),
        )];

        let slices = engine.evaluate_across_time(&patterns, range).unwrap();
        prop_assert_eq!(slices[0].interval.start, range.start);
        prop_assert_eq!(slices[slices.len() - 1].interval.end, range.end);
        for pair in slices.windows(2) {
            prop_assert!(pair[0].interval.adjoins(&pair[1].interval));
            prop_assert_ne!(&pair[0].results, &pair[1].results);
        }

        for at in instants(&scenario).into_iter().filter(|t| range.contains(*t)) {
            let graph = scenario
                .histories
                .iter()
                .filter_map(|h| h.state_at(at))
                .flatten()
                .collect();
            let direct = BasicGraphMatcher.match_patterns(&patterns, &graph).unwrap();
            let slice = slices.iter().find(|s| s.interval.contains(at)).unwrap();
            prop_assert_eq!(&slice.results, &direct, "at {}", at);
        }
    }
}

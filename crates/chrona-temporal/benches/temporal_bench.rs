//! Temporal benchmarks: reconstruction with and without the cache, and
//! across-time evaluation over a multi-entity history.

use criterion::{criterion_group, criterion_main, Criterion};

use chrona_core::config::TemporalConfig;
use chrona_core::models::{PatternTerm, TimeInterval, TriplePattern};
use chrona_core::traits::ITemporalEngine;
use test_fixtures::{day, history_from_toggles, iri, Scenario};

/// 50 entities with 30 snapshots each.
fn scenario() -> Scenario {
    let steps: Vec<Vec<u8>> = (0..30u8).map(|i| vec![i % 8, (i * 3) % 8]).collect();
    Scenario::new(
        (0..50)
            .map(|n| history_from_toggles(&iri(&format!("entity-{n}")), day(2020, 1, 1), &steps))
            .collect(),
    )
}

fn bench_materialize_uncached(c: &mut Criterion) {
    let scenario = scenario();
    let config = TemporalConfig {
        cache_max_entries: 0,
        ..TemporalConfig::default()
    };
    let engine = scenario.engine(config).unwrap();
    let entity = iri("entity-0");

    c.bench_function("materialize_oldest_uncached", |b| {
        b.iter(|| engine.materialize(&entity, day(2020, 1, 2)).unwrap());
    });
}

fn bench_materialize_cached(c: &mut Criterion) {
    let scenario = scenario();
    let engine = scenario.engine(TemporalConfig::default()).unwrap();
    let entity = iri("entity-0");
    engine.materialize(&entity, day(2020, 1, 2)).unwrap();

    c.bench_function("materialize_oldest_cached", |b| {
        b.iter(|| engine.materialize(&entity, day(2020, 1, 2)).unwrap());
    });
}

fn bench_history(c: &mut Criterion) {
    let scenario = scenario();
    let engine = scenario.engine(TemporalConfig::default()).unwrap();
    let entity = iri("entity-7");

    c.bench_function("history_30_versions", |b| {
        b.iter(|| engine.history(&entity).unwrap());
    });
}

fn bench_across_time(c: &mut Criterion) {
    let scenario = scenario();
    let engine = scenario.engine(TemporalConfig::default()).unwrap();
    let patterns = [TriplePattern::new(
        PatternTerm::var("s"),
        iri("p0"),
        PatternTerm::var("o"),
    )];
    let range = TimeInterval::closed(day(2020, 1, 1), day(2021, 1, 1));

    c.bench_function("across_time_50_entities", |b| {
        b.iter(|| engine.evaluate_across_time(&patterns, range).unwrap());
    });
}

criterion_group!(
    benches,
    bench_materialize_uncached,
    bench_materialize_cached,
    bench_history,
    bench_across_time
);
criterion_main!(benches);

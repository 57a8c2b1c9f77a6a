//! Aggregation hot-path benchmarks.
//!
//! Run with: `cargo bench --package barcast-bench`

use barcast_aggregate::{AggregationStore, EngineConfig, Heartbeat, TickProcessor};
use barcast_bench::SyntheticFeed;
use barcast_feed::decode_events;
use barcast_format::{Emitter, OutputFormat};
use barcast_types::BucketZone;
use chrono::TimeDelta;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const TRADE_COUNTS: [usize; 2] = [10_000, 100_000];

fn config() -> EngineConfig {
    EngineConfig {
        zone: BucketZone::Utc,
        ..EngineConfig::default()
    }
}

fn process_benchmark(c: &mut Criterion) {
    let processor = TickProcessor::from_config(&config()).unwrap();
    let mut group = c.benchmark_group("process");

    for count in TRADE_COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        for (name, late_every) in [("in-order", 0), ("late-1-in-20", 20)] {
            let feed = SyntheticFeed {
                late_every,
                ..SyntheticFeed::default()
            };
            let trades = feed.trades(count);
            let now = feed.start + TimeDelta::minutes(15);

            group.bench_with_input(BenchmarkId::new(name, count), &trades, |b, trades| {
                b.iter(|| {
                    let mut store = AggregationStore::new();
                    for trade in trades {
                        black_box(processor.process(trade, &mut store, now));
                    }
                    store
                });
            });
        }
    }
    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for batch in [1, 50] {
        let payloads = SyntheticFeed::default().payloads(10_000, batch);
        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(BenchmarkId::new("batch", batch), &payloads, |b, payloads| {
            b.iter(|| {
                for payload in payloads {
                    black_box(decode_events(payload).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn heartbeat_benchmark(c: &mut Criterion) {
    let config = config();
    let processor = TickProcessor::from_config(&config).unwrap();
    let heartbeat = Heartbeat::from_config(&config).unwrap();
    let feed = SyntheticFeed::default();
    let now = feed.start + TimeDelta::minutes(16);

    let mut store = AggregationStore::new();
    for trade in feed.trades(100_000) {
        processor.process(&trade, &mut store, now);
    }

    let emitter = OutputFormat::Text.emitter(BucketZone::Utc, std::io::sink());
    c.bench_function("heartbeat_report_and_emit", |b| {
        b.iter(|| {
            let record = heartbeat.report(&store, black_box(now));
            emitter
                .emit(&record, barcast_aggregate::EmitTrigger::Heartbeat)
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    process_benchmark,
    decode_benchmark,
    heartbeat_benchmark
);
criterion_main!(benches);

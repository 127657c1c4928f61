//! # GeoAI Dispatch Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | geoai-types | envelope encode / decode |
//! | geoai-dispatch | correlation table register + settle |
//! | end to end | `run` round trip through a live worker |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geoai_dispatch::{CorrelationTable, DispatcherConfig};
use geoai_tests::fixtures::{sample_polygon, Harness};
use geoai_types::{codec, CallResponse, RequestId, Response, TaskDescriptor};
use serde_json::{json, Value};
use std::time::Duration;

// ============================================================================
// CODEC
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoai-types-codec");
    let payload = json!({
        "task": "building-detection",
        "instance_id": "0f6c2b8e4d7a4e1b9c3f5a2d8e7b6c4a",
        "input": { "polygon": sample_polygon() }
    });
    let wire = codec::encode(RequestId::new(42), "call", payload.clone());

    group.bench_function("encode_call", |b| {
        b.iter(|| black_box(codec::encode(RequestId::new(42), "call", payload.clone())))
    });
    group.bench_function("decode_call", |b| {
        b.iter(|| black_box(codec::decode(&wire).is_ok()))
    });
    group.finish();
}

// ============================================================================
// CORRELATION TABLE
// ============================================================================

fn bench_correlation_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoai-dispatch-correlation");

    for size in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("register_settle", size), &size, |b, &size| {
            b.iter(|| {
                let table = CorrelationTable::new();
                let receivers: Vec<_> = (1..=size)
                    .map(|n| {
                        table
                            .register(RequestId::new(n), "call", Duration::from_secs(30))
                            .unwrap()
                    })
                    .collect();
                for n in 1..=size {
                    table.settle(
                        RequestId::new(n),
                        Ok(Response::Call(CallResponse { output: Value::Null })),
                    );
                }
                black_box(receivers.len())
            })
        });
    }
    group.finish();
}

// ============================================================================
// END TO END
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (harness, handle) = runtime.block_on(async {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
            .await
            .unwrap();
        (harness, handle)
    });
    let input = json!({ "polygon": sample_polygon() });

    let mut group = c.benchmark_group("geoai-round-trip");
    group.bench_function("run_building_detection", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                harness
                    .client
                    .run(&handle.task, &handle.instance_id, input.clone())
                    .await
                    .unwrap(),
            )
        })
    });
    group.finish();

    runtime.block_on(async { harness.client.terminate() });
}

criterion_group!(
    benches,
    bench_codec,
    bench_correlation_table,
    bench_round_trip
);
criterion_main!(benches);

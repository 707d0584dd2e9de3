/// Performance benchmarks for the GraphLink multiplexing layer
///
/// Run with: cargo bench -p glink-tests

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glink_core::{CallOptions, ClientConfig, RequestBatcher};
use glink_test_utils::{Delivery, Loopback, TestRequest};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_config() -> ClientConfig {
    ClientConfig::new()
        .with_worker_count(2)
        .with_batch_windows(Duration::from_micros(200), Duration::from_micros(500))
}

fn bench_unary_immediate(c: &mut Criterion) {
    let batcher = RequestBatcher::new(&bench_config()).unwrap();
    let loopback = Loopback::open(&batcher, 100, Delivery::InOrder).unwrap();

    let mut group = c.benchmark_group("unary_immediate");
    group.throughput(Throughput::Elements(1));
    group.bench_function("echo", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            loopback
                .stream
                .execute_unary_with(black_box(TestRequest::Echo(counter)), CallOptions::new().immediate())
                .unwrap()
        });
    });
    group.finish();
    loopback.shutdown();
}

fn bench_pipelined_batched(c: &mut Criterion) {
    let batcher = RequestBatcher::new(&bench_config()).unwrap();
    let loopback = Loopback::open(&batcher, 100, Delivery::Reversed).unwrap();

    let mut group = c.benchmark_group("pipelined_batched");
    for depth in [16u64, 128, 1024] {
        group.throughput(Throughput::Elements(depth));
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let pending: Vec<_> = (0..depth)
                    .map(|i| {
                        loopback
                            .stream
                            .submit(TestRequest::Echo(i), CallOptions::new())
                            .unwrap()
                    })
                    .collect();
                for response in pending {
                    black_box(response.wait().unwrap());
                }
            });
        });
    }
    group.finish();
    loopback.shutdown();
}

fn bench_concurrent_callers(c: &mut Criterion) {
    let batcher = RequestBatcher::new(&bench_config()).unwrap();
    let loopback = Arc::new(Loopback::open(&batcher, 100, Delivery::Reversed).unwrap());

    let mut group = c.benchmark_group("concurrent_callers");
    for threads in [2u64, 8, 32] {
        group.throughput(Throughput::Elements(threads * 10));
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let stream = loopback.stream.clone();
                        thread::spawn(move || {
                            for i in 0..10 {
                                stream.execute_unary(TestRequest::Echo(t * 10 + i)).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let batcher = RequestBatcher::new(&bench_config()).unwrap();

    let mut group = c.benchmark_group("streaming");
    for page_size in [10u64, 100, 1000] {
        let loopback = Loopback::open(&batcher, page_size, Delivery::InOrder).unwrap();
        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(BenchmarkId::new("page_size", page_size), &page_size, |b, _| {
            b.iter(|| {
                let total = loopback
                    .stream
                    .execute_streaming(TestRequest::Stream { count: 10_000 }, Ok)
                    .unwrap()
                    .count();
                black_box(total)
            });
        });
        loopback.shutdown();
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_unary_immediate,
    bench_pipelined_batched,
    bench_concurrent_callers,
    bench_streaming
);
criterion_main!(benches);

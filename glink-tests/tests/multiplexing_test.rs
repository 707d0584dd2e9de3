/// Multiplexing integration tests for GraphLink
///
/// Many callers share one transaction stream; responses must reach the
/// caller that sent the matching request no matter how the server orders
/// them.

use glink_core::{CallOptions, ClientConfig, RequestBatcher};
use glink_test_utils::{init_tracing, test_config, Delivery, Loopback, Manual, TestRequest};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_concurrent_unary_requests_share_one_stream() {
    init_tracing();
    let batcher = RequestBatcher::new(&test_config(2)).unwrap();
    let loopback = Arc::new(Loopback::open(&batcher, 10, Delivery::Reversed).unwrap());

    let num_threads = 8;
    let requests_per_thread = 50;
    let mut handles = vec![];

    for thread_id in 0..num_threads {
        let loopback = Arc::clone(&loopback);
        handles.push(thread::spawn(move || {
            for i in 0..requests_per_thread {
                let value = thread_id * 1000 + i;
                let answer = loopback
                    .stream
                    .execute_unary(TestRequest::Echo(value))
                    .unwrap();
                assert_eq!(answer, vec![value]);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(loopback.stream.outstanding(), 0);
    assert_eq!(
        loopback.sink.requests().len(),
        (num_threads * requests_per_thread) as usize
    );

    if let Ok(loopback) = Arc::try_unwrap(loopback) {
        loopback.shutdown();
    }
}

#[test]
fn test_batched_requests_share_frames() {
    let config = ClientConfig::new()
        .with_worker_count(1)
        .with_batch_windows(Duration::from_millis(50), Duration::from_millis(50));
    let batcher = RequestBatcher::new(&config).unwrap();
    let loopback = Loopback::open(&batcher, 10, Delivery::InOrder).unwrap();

    let pending: Vec<_> = (0..10)
        .map(|i| {
            loopback
                .stream
                .submit(TestRequest::Echo(i), CallOptions::new())
                .unwrap()
        })
        .collect();

    for (i, response) in pending.into_iter().enumerate() {
        assert_eq!(response.wait().unwrap(), vec![i as u64]);
    }

    let frames = loopback.sink.frames();
    assert!(
        frames.len() < 10,
        "expected batching, got {} frames",
        frames.len()
    );
    assert_eq!(frames.iter().map(Vec::len).sum::<usize>(), 10);

    loopback.shutdown();
}

#[test]
fn test_immediate_requests_bypass_batching() {
    let config = ClientConfig::new()
        .with_worker_count(1)
        .with_batch_windows(Duration::from_secs(5), Duration::from_secs(5));
    let batcher = RequestBatcher::new(&config).unwrap();
    let loopback = Loopback::open(&batcher, 10, Delivery::InOrder).unwrap();

    let answer = loopback
        .stream
        .execute_unary_with(TestRequest::Echo(9), CallOptions::new().immediate())
        .unwrap();
    assert_eq!(answer, vec![9]);
    assert_eq!(loopback.sink.frames().len(), 1);

    loopback.shutdown();
}

#[test]
fn test_requests_leave_in_submission_order() {
    let batcher = RequestBatcher::new(&test_config(1)).unwrap();
    let manual = Manual::open(&batcher).unwrap();

    let pending: Vec<_> = (0..20)
        .map(|i| {
            manual
                .stream
                .submit(TestRequest::Echo(i), CallOptions::new())
                .unwrap()
        })
        .collect();
    let ids: Vec<_> = pending.iter().map(|p| p.id()).collect();

    assert!(glink_test_utils::wait_until(Duration::from_secs(2), || {
        manual.sink.requests().len() == 20
    }));
    let sent: Vec<_> = manual.sink.requests().into_iter().map(|r| r.id).collect();
    assert_eq!(sent, ids);

    manual.stream.close();
}

#[test]
fn test_responses_routed_out_of_order() {
    let batcher = RequestBatcher::new(&test_config(1)).unwrap();
    let manual = Manual::open(&batcher).unwrap();

    let first = manual
        .stream
        .submit(TestRequest::Echo(1), CallOptions::new().immediate())
        .unwrap();
    let second = manual
        .stream
        .submit(TestRequest::Echo(2), CallOptions::new().immediate())
        .unwrap();

    manual
        .listener
        .on_message(glink_core::Response::ok(second.id(), vec![20]));
    assert!(second.is_ready());
    assert!(!first.is_ready());
    manual
        .listener
        .on_message(glink_core::Response::ok(first.id(), vec![10]));

    assert_eq!(first.wait().unwrap(), vec![10]);
    assert_eq!(second.wait().unwrap(), vec![20]);
    assert_eq!(manual.stream.outstanding(), 0);
}

#[test]
fn test_transactions_spread_over_workers() {
    let batcher = RequestBatcher::new(&test_config(3)).unwrap();

    let streams: Vec<_> = (0..6).map(|_| Manual::open(&batcher).unwrap()).collect();
    let workers: Vec<usize> = streams.iter().map(|m| m.stream.worker()).collect();

    assert_eq!(workers, (0..6).map(|i| i % 3).collect::<Vec<usize>>());
}

#[test]
fn test_metadata_reaches_the_wire() {
    let batcher = RequestBatcher::new(&test_config(1)).unwrap();
    let loopback = Loopback::open(&batcher, 10, Delivery::InOrder).unwrap();

    loopback
        .stream
        .execute_unary_with(
            TestRequest::Echo(1),
            CallOptions::new().with_metadata("traceparent", "00-abc-def-01"),
        )
        .unwrap();

    let requests = loopback.sink.requests();
    assert_eq!(
        requests[0].metadata.get("traceparent").map(String::as_str),
        Some("00-abc-def-01")
    );

    loopback.shutdown();
}

//! # Failure Modes
//!
//! Every request settles exactly once, whatever goes wrong:
//!
//! - **Timeout**: the caller is rejected at the deadline; the worker's late
//!   answer is ignored
//! - **Worker failure**: every outstanding request is rejected, and the
//!   channel refuses new ones
//! - **Termination**: pending requests are rejected and the worker releases
//!   its instances

#[cfg(test)]
mod tests {
    use crate::fixtures::{sample_polygon, Harness};
    use futures::future::join_all;
    use geoai_channel::{MessageReceiver, WorkerEndpoint};
    use geoai_dispatch::{DispatchError, DispatcherConfig, InferenceClient};
    use geoai_types::{InstanceId, TaskDescriptor};
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::{timeout, Instant};

    // =============================================================================
    // TIMEOUTS
    // =============================================================================

    #[tokio::test]
    async fn test_timeout_then_late_response_is_dropped() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        let started = Instant::now();
        let err = harness
            .client
            .run_with_timeout(
                &handle.task,
                &handle.instance_id,
                json!("late"),
                Some(Duration::from_millis(10)),
            )
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("10ms"));
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed < Duration::from_millis(50));

        // The worker still answers at ~50 ms; nobody is waiting any more.
        let stats = harness.client.dispatcher().stats();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(stats.total_timeouts.load(Ordering::Relaxed), 1);
        assert_eq!(stats.total_unknown.load(Ordering::Relaxed), 1);

        // The channel is unaffected.
        let output = harness
            .client
            .run(&handle.task, &handle.instance_id, json!("on time"))
            .await
            .unwrap();
        assert_eq!(output, json!("on time"));
    }

    #[tokio::test]
    async fn test_default_timeout_applies() {
        let config = DispatcherConfig::default().with_default_timeout(Duration::from_millis(10));
        let harness = Harness::start(config);
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        let err = harness
            .client
            .run(&handle.task, &handle.instance_id, Value::Null)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_backpressure_does_not_outlast_timeout() {
        let config = DispatcherConfig::default().with_channel_capacity(1);
        let harness = Harness::start(config);
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        // One call runs in the worker, one fills the queue, the rest wait to
        // be queued. Every one of them gives up at its own deadline.
        let short = Some(Duration::from_millis(20));
        let calls = (0..4).map(|n| {
            harness
                .client
                .run_with_timeout(&handle.task, &handle.instance_id, json!(n), short)
        });
        let results = timeout(Duration::from_millis(500), join_all(calls))
            .await
            .expect("every call bounded by its timeout");

        for result in results {
            assert!(result.unwrap_err().is_timeout());
        }
        assert_eq!(harness.client.dispatcher().pending_count(), 0);

        // Once the worker catches up the channel works again.
        let output = harness
            .client
            .run(&handle.task, &handle.instance_id, json!("after"))
            .await
            .unwrap();
        assert_eq!(output, json!("after"));
    }

    // =============================================================================
    // WORKER FAILURE
    // =============================================================================

    /// Accept `expected` requests without answering, then report a crash.
    async fn crash_after(worker: WorkerEndpoint, expected: usize) {
        let (poster, mut receiver) = worker.into_parts();
        for _ in 0..expected {
            receiver.recv().await.unwrap();
        }
        poster.fail("worker crashed").await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_crash_rejects_all_pending() {
        let config = DispatcherConfig::default();
        let (caller, worker) = config.channel_pair();
        let client = InferenceClient::connect(caller, config).unwrap();
        let crash = tokio::spawn(crash_after(worker, 3));

        let instance = InstanceId::from("abc123");
        let (a, b, c) = tokio::join!(
            client.run("building-detection", &instance, json!(1)),
            client.run("building-detection", &instance, json!(2)),
            client.ping(),
        );
        crash.await.unwrap();

        let expected = DispatchError::ChannelClosed("worker crashed".into());
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(c.unwrap_err(), expected);
        assert_eq!(client.dispatcher().pending_count(), 0);

        // Fails immediately, without waiting for any timeout.
        let rejected = timeout(Duration::from_millis(100), client.ping())
            .await
            .expect("rejected immediately");
        assert_eq!(rejected.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn test_worker_disappearing_rejects_pending() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        let client = &harness.client;
        let pending = client.run(&handle.task, &handle.instance_id, Value::Null);
        let kill = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            harness.worker.abort();
        };
        let (result, ()) = tokio::join!(pending, kill);

        assert!(matches!(result, Err(DispatchError::ChannelClosed(_))));
        assert!(client.dispatcher().is_closed());
    }

    // =============================================================================
    // TERMINATION
    // =============================================================================

    #[tokio::test]
    async fn test_terminate_rejects_pending_and_stops_worker() {
        let mut harness = Harness::start(DispatcherConfig::default());
        harness
            .client
            .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
            .await
            .unwrap();
        let slow = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        let client = &harness.client;
        let pending = client.run(&slow.task, &slow.instance_id, Value::Null);
        let terminate = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (client.terminate(), client.terminate())
        };
        let (result, (first, second)) = tokio::join!(pending, terminate);

        assert_eq!(result, Err(DispatchError::Terminated));
        assert_eq!((first, second), (1, 0));
        assert!(matches!(
            client
                .run(&slow.task, &slow.instance_id, json!({ "polygon": sample_polygon() }))
                .await,
            Err(DispatchError::ChannelClosed(_))
        ));

        // The worker notices the closed channel and releases its instances.
        timeout(Duration::from_secs(1), &mut harness.worker)
            .await
            .expect("worker stopped")
            .unwrap();
        assert_eq!(harness.released(), 1);
    }

    #[tokio::test]
    async fn test_dropping_client_stops_worker() {
        let harness = Harness::start(DispatcherConfig::default());
        harness
            .client
            .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
            .await
            .unwrap();

        let Harness {
            client,
            worker,
            released,
            ..
        } = harness;
        drop(client);

        let received = timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker stopped")
            .unwrap();
        assert_eq!(received, 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    // =============================================================================
    // OBSERVABILITY
    // =============================================================================

    #[tokio::test]
    async fn test_outcomes_are_exported() {
        geoai_telemetry::register_metrics().unwrap();
        let harness = Harness::start(DispatcherConfig::default());
        harness.client.ping().await.unwrap();

        let text = geoai_telemetry::encode_metrics().unwrap();
        assert!(text.contains("geoai_dispatch_requests_total"));
        assert!(text.contains("geoai_worker_messages_total"));
    }
}

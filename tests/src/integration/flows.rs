//! # Caller ⇄ Worker Flows
//!
//! The normal lifecycle of a pipeline instance, driven end to end through
//! the dispatcher, an in-memory channel and the worker runtime:
//!
//! 1. **init**: the worker builds a pipeline and returns its instance id
//! 2. **call**: inference on that instance; output returned verbatim
//! 3. **dispose**: the instance is released and forgotten
//!
//! Plus concurrency: many in-flight requests, each settled with its own answer.

#[cfg(test)]
mod tests {
    use crate::fixtures::{sample_polygon, Harness};
    use futures::future::join_all;
    use geoai_dispatch::{DispatchError, DispatcherConfig};
    use geoai_types::{ErrorKind, InstanceId, TaskDescriptor};
    use geoai_worker::SessionApi;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_building_detection_round_trip() {
        let harness = Harness::start(DispatcherConfig::default());

        let handle = harness
            .client
            .initialize(
                vec![TaskDescriptor::new("building-detection")],
                json!({ "provider": "geobase", "projectRef": "demo" }),
                None,
            )
            .await
            .unwrap();
        assert_eq!(handle.task, "building-detection");
        assert!(!handle.instance_id.as_str().is_empty());

        let output = harness
            .client
            .run(
                &handle.task,
                &handle.instance_id,
                json!({ "polygon": sample_polygon() }),
            )
            .await
            .unwrap();

        assert_eq!(output["type"], "FeatureCollection");
        assert_eq!(output["features"][0]["properties"]["class"], "building");
        assert_eq!(
            output["features"][0]["geometry"]["coordinates"][0],
            sample_polygon()
        );
    }

    #[tokio::test]
    async fn test_unknown_instance_is_rejected() {
        let harness = Harness::start(DispatcherConfig::default());

        let err = harness
            .client
            .run(
                "building-detection",
                &InstanceId::from("does-not-exist"),
                json!({ "polygon": sample_polygon() }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.remote_kind(), Some(ErrorKind::UnknownInstance));
        assert!(err.to_string().contains("does-not-exist"));
        assert_eq!(harness.session.instance_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_error_passes_through() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
            .await
            .unwrap();

        let err = harness
            .client
            .run(&handle.task, &handle.instance_id, json!({ "bbox": [0, 0, 1, 1] }))
            .await
            .unwrap_err();

        match err {
            DispatchError::Remote { kind, message, .. } => {
                assert_eq!(kind, ErrorKind::PipelineFailed);
                assert!(message.contains("polygon"));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        // The instance survives a failed call.
        assert!(harness.session.contains(&handle.instance_id));
    }

    #[tokio::test]
    async fn test_unsupported_task_fails_init() {
        let harness = Harness::start(DispatcherConfig::default());
        let err = harness
            .client
            .initialize(vec![TaskDescriptor::new("wetland-segmentation")], Value::Null, None)
            .await
            .unwrap_err();

        assert_eq!(err.remote_kind(), Some(ErrorKind::InitFailed));
        assert_eq!(harness.session.instance_count(), 0);
    }

    #[tokio::test]
    async fn test_chained_tasks_share_one_instance() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(
                vec![
                    TaskDescriptor::new("object-detection"),
                    TaskDescriptor::new("mask-generation").with_model_id("sam"),
                ],
                Value::Null,
                Some("owlv2".into()),
            )
            .await
            .unwrap();
        assert_eq!(handle.task, "object-detection+mask-generation");

        let output = harness
            .client
            .run(&handle.task, &handle.instance_id, Value::Null)
            .await
            .unwrap();
        assert_eq!(
            output,
            json!({ "stages": ["object-detection", "mask-generation"], "model": "owlv2" })
        );
    }

    #[tokio::test]
    async fn test_repeated_init_creates_distinct_instances() {
        let harness = Harness::start(DispatcherConfig::default());
        let tasks = || vec![TaskDescriptor::new("building-detection")];

        let a = harness.client.initialize(tasks(), Value::Null, None).await.unwrap();
        let b = harness.client.initialize(tasks(), Value::Null, None).await.unwrap();

        assert_ne!(a.instance_id, b.instance_id);
        assert_eq!(harness.client.ping().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dispose_forgets_instance() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
            .await
            .unwrap();

        assert!(harness.client.dispose(&handle.instance_id).await.unwrap());
        assert!(!harness.client.dispose(&handle.instance_id).await.unwrap());
        assert_eq!(harness.released(), 1);

        let err = harness
            .client
            .run(&handle.task, &handle.instance_id, json!({ "polygon": sample_polygon() }))
            .await
            .unwrap_err();
        assert_eq!(err.remote_kind(), Some(ErrorKind::UnknownInstance));
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test]
    async fn test_interleaved_requests_are_correlated() {
        let harness = Harness::start(DispatcherConfig::default());
        let handle = harness
            .client
            .initialize(vec![TaskDescriptor::new("slow-echo")], Value::Null, None)
            .await
            .unwrap();

        let calls = (0..20).map(|n| {
            harness
                .client
                .run(&handle.task, &handle.instance_id, json!({ "n": n }))
        });
        let outputs = join_all(calls).await;

        for (n, output) in outputs.into_iter().enumerate() {
            assert_eq!(output.unwrap(), json!({ "n": n }));
        }

        let dispatcher = harness.client.dispatcher();
        assert_eq!(dispatcher.pending_count(), 0);
        // 1 init + 20 calls, each settled exactly once.
        assert_eq!(dispatcher.stats().total_completed.load(Ordering::Relaxed), 21);
        assert_eq!(dispatcher.stats().total_unknown.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_independent_clients_do_not_interfere() {
        let first = Harness::start(DispatcherConfig::default());
        let second = Harness::start(DispatcherConfig::default());

        let tasks = || vec![TaskDescriptor::new("building-detection")];
        let a = first.client.initialize(tasks(), Value::Null, None).await.unwrap();
        second.client.initialize(tasks(), Value::Null, None).await.unwrap();
        second.client.initialize(tasks(), Value::Null, None).await.unwrap();

        assert_eq!(first.client.ping().await.unwrap(), 1);
        assert_eq!(second.client.ping().await.unwrap(), 2);

        // An instance id is only meaningful to the worker that issued it.
        let err = second
            .client
            .run(&a.task, &a.instance_id, json!({ "polygon": sample_polygon() }))
            .await
            .unwrap_err();
        assert_eq!(err.remote_kind(), Some(ErrorKind::UnknownInstance));
    }
}

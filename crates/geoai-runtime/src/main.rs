//! # GeoAI Runtime
//!
//! Runs one building-detection round trip through an in-process worker.
//!
//! ```bash
//! geoai-runtime                 # bundled sample polygon
//! geoai-runtime input.json      # {"polygon": [[lon, lat], ...]}
//! ```
//!
//! Configuration comes from the environment; see `RuntimeConfig::from_env`.

use anyhow::{Context, Result};
use geoai_runtime::demo::{demo_factory, sample_input};
use geoai_runtime::{RuntimeConfig, WorkerNode};
use geoai_telemetry::{encode_metrics, init_telemetry};
use geoai_types::TaskDescriptor;
use serde_json::Value;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    config.validate().context("invalid configuration")?;
    let _telemetry = init_telemetry(&config.telemetry).context("telemetry setup failed")?;

    let input = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {path}"))?;
            serde_json::from_str::<Value>(&text)
                .with_context(|| format!("{path} is not valid JSON"))?
        }
        None => sample_input(),
    };

    let node = WorkerNode::start(&config, demo_factory())?;
    let client = node.client();

    let handle = client
        .initialize(vec![TaskDescriptor::new("building-detection")], Value::Null, None)
        .await
        .context("pipeline initialization failed")?;
    info!(instance_id = %handle.instance_id, task = %handle.task, "Pipeline ready");

    let output = client
        .run(&handle.task, &handle.instance_id, input)
        .await
        .context("inference failed")?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    client.dispose(&handle.instance_id).await?;
    node.shutdown().await;

    debug!(metrics = %encode_metrics()?, "Final metrics");
    Ok(())
}

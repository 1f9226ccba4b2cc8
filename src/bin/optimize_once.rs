//! Runs a single optimization from a JSON request and prints the result.
//!
//! ```bash
//! hvac-optimize-once demos/scenario_a.json
//! cat demos/cold_start.json | hvac-optimize-once
//! ```

use anyhow::{Context, Result};
use hvac_scheduler::{config::Config, domain::ScheduleRequest, optimizer::HvacOptimizer, telemetry};
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the result, logs go to stderr
    telemetry::init_tracing_with_writer(std::io::stderr);

    let cfg = Config::load()?;

    let raw = match std::env::args().nth(1) {
        Some(path) if path != "-" => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read request file {path}"))?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read request from stdin")?;
            buf
        }
    };

    let request: ScheduleRequest = serde_json::from_str(&raw).context("malformed schedule request")?;

    let optimizer = HvacOptimizer::default()
        .with_time_limit(cfg.optimizer.time_limit())
        .with_horizon_warning(cfg.optimizer.horizon_warning_hours);
    let result = tokio::task::spawn_blocking(move || optimizer.optimize(&request))
        .await
        .context("optimization task panicked")??;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

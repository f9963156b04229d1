//! Recording replay binary.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use focus_worker::{load_recording, run_replay, ReplayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("focus_vision=info".parse()?)
        .add_directive("focus_worker=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut config = ReplayConfig::from_env();
    if let Some(path) = std::env::args_os().nth(1) {
        config.replay_file = Some(path.into());
    }
    info!("Replay config: {:?}", config);

    let metrics = if config.metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install Prometheus recorder")?,
        )
    } else {
        None
    };

    let path = config.replay_path()?.to_path_buf();
    let monitor_config = config
        .monitor_config()
        .await
        .context("failed to resolve monitor configuration")?;
    let frames = load_recording(&path)
        .await
        .with_context(|| format!("failed to read recording {}", path.display()))?;

    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let report = run_replay(monitor_config, frames, config.idle_ticks, &label).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(handle) = metrics {
        info!("Metrics:\n{}", handle.render());
    }

    Ok(())
}

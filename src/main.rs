use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use applog::config::{self, LogConfig, DEFAULT_APP_NAME};
use applog::logging::{Logger, PanicHook, TracingBridge};
use applog::{log_info, log_warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config::config_file_path(DEFAULT_APP_NAME);
    let log_config = LogConfig::load(&config_path)?;

    // Route tracing events into the logger once it is initialized
    let bridge = TracingBridge::new();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(bridge.layer())
        .init();

    let logger = Logger::builder()
        .hook(bridge)
        .hook(PanicHook::new())
        .build();
    logger
        .initialize(log_config)
        .context("Failed to initialize logging")?;

    match logger.log_file_path() {
        Some(path) => tracing::info!("Logging to: {}", path.display()),
        None => tracing::info!("Logging to console only"),
    }
    tracing::debug!(config = %config_path.display(), "Loaded logger config");

    let mut workers = Vec::new();
    for worker in 0..4 {
        let logger = logger.clone();
        workers.push(tokio::spawn(async move {
            for tick in 0..5 {
                log_info!(logger, category: "worker", "worker {} tick {}", worker, tick);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }));
    }

    for worker in workers {
        if let Err(e) = worker.await {
            log_warn!(logger, "worker task failed: {}", e);
        }
    }

    logger.info("demo", "All workers finished");
    logger.shutdown();
    Ok(())
}

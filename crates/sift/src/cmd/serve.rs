//! The serve command
//!
//! Assembles the whole system: store connection, consumer-group
//! provisioning on the raw topic, the splitter task, the connection
//! manager, and the HTTP/WebSocket surface. Shutdown first disables
//! the splitter gate as the cooperative stop signal; every blocking
//! read underneath has a bounded timeout, so nothing needs forced
//! interruption.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sift_api::{build_router, AppState};
use sift_config::{Config, LogFormat};
use sift_splitter::{SplitterConfig, SplitterGate, StreamSplitter};
use sift_store::{LogStore, RedisStore};
use sift_viewer::{ConnectionManager, ViewerConfig};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/sift.toml")]
    pub config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Run the server
pub async fn run(args: ServeArgs) -> Result<()> {
    let (config, from_file) = load_config(&args.config)?;
    init_logging(args.log_level.as_deref(), &config)?;
    if from_file {
        info!(path = %args.config.display(), "configuration loaded");
    } else {
        info!(path = %args.config.display(), "no config file, using defaults");
    }

    let store: Arc<dyn LogStore> = Arc::new(
        RedisStore::connect(&config.store.url)
            .await
            .with_context(|| format!("connecting to store at {}", config.store.url))?,
    );
    info!(url = %config.store.url, "store connected");

    // Provision both role groups on the raw topic up front so early
    // viewers and the splitter can read it immediately.
    store
        .create_group(&config.stream.raw_topic, &config.stream.splitter_group, true)
        .await?;
    store
        .create_group(&config.stream.raw_topic, &config.stream.viewer_group, true)
        .await?;

    let gate = SplitterGate::new();

    let splitter = StreamSplitter::new(
        Arc::clone(&store),
        gate.clone(),
        SplitterConfig {
            raw_topic: config.stream.raw_topic.clone(),
            group: config.stream.splitter_group.clone(),
            batch_size: config.splitter.batch_size,
            block: Duration::from_millis(config.splitter.block_ms),
            idle_interval: Duration::from_millis(config.splitter.idle_ms),
            maxlen: config.stream.maxlen,
        },
    );
    let splitter_metrics = splitter.metrics();
    let splitter_task = tokio::spawn(splitter.run());

    let manager = Arc::new(ConnectionManager::new(
        Arc::clone(&store),
        gate.clone(),
        ViewerConfig {
            raw_topic: config.stream.raw_topic.clone(),
            group: config.stream.viewer_group.clone(),
            heartbeat_interval: Duration::from_secs(config.viewer.heartbeat_secs),
            empty_idle: Duration::from_millis(config.viewer.empty_idle_ms),
            block: Duration::from_millis(config.viewer.block_ms),
        },
    ));

    let state = AppState::new(manager, store).with_splitter_metrics(splitter_metrics);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.api.bind)
        .await
        .with_context(|| format!("binding {}", config.api.bind))?;
    info!(addr = %config.api.bind, "sift listening");

    let shutdown_gate = gate.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received, disabling splitter");
            shutdown_gate.disable();
        })
        .await?;

    splitter_task.abort();
    info!("sift stopped");
    Ok(())
}

/// Load configuration, falling back to defaults when no file exists
fn load_config(path: &PathBuf) -> Result<(Config, bool)> {
    if path.exists() {
        let config = Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((Config::default(), false))
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(override_level: Option<&str>, config: &Config) -> Result<()> {
    let level = override_level.unwrap_or(config.log.level.as_str());
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.log.format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}

/// Wait for SIGINT
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

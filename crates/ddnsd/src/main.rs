// # ddnsd - DDNS Daemon
//
// This is a thin integration layer: all reconciliation logic lives in
// ddns-core. The daemon is responsible for:
// 1. Reading the JSON configuration file
// 2. Initializing logging and the runtime
// 3. Building the resolver, updater and state store
// 4. Running the reconciliation loop until SIGTERM/SIGINT
//
// ## Environment
//
// - `DDNS_CONFIG`: Path to the JSON configuration (default `config.json`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
// - `DDNS_MODE`: `development` to resolve and persist without updating
//   records; overrides `engine.mode` from the file
//
// ## Example
//
// ```bash
// export DDNS_CONFIG=/etc/ddns/config.json
// export DDNS_LOG_LEVEL=debug
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::config::{DdnsConfig, Mode, StateStoreConfig, UpdaterConfig};
use ddns_core::traits::{AddressResolver, RecordUpdater, StateStore};
use ddns_core::{
    DirectUpdater, EngineEvent, FileStateStore, MemoryStateStore, ReconciliationLoop,
    TextFileStateStore,
};
use ddns_ip_http::HttpAddressResolver;
use ddns_provider_cloudflare::CloudflareProvider;
use ddns_relay::RelayUpdater;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process-level settings read from the environment
struct Settings {
    config_path: String,
    log_level: Level,
    mode: Option<Mode>,
}

impl Settings {
    fn from_env() -> Result<Self> {
        let config_path = env::var("DDNS_CONFIG").unwrap_or_else(|_| "config.json".to_string());

        let log_level = env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_level = parse_log_level(&log_level).with_context(|| {
            format!(
                "DDNS_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                log_level
            )
        })?;

        let mode = match env::var("DDNS_MODE") {
            Ok(mode) => Some(Mode::parse(&mode).with_context(|| {
                format!(
                    "DDNS_MODE '{}' is not valid. Valid modes: live, development",
                    mode
                )
            })?),
            Err(_) => None,
        };

        Ok(Self {
            config_path,
            log_level,
            mode,
        })
    }
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Load the configuration file and apply environment overrides
fn load_config(settings: &Settings) -> Result<DdnsConfig> {
    let mut config = DdnsConfig::load(&settings.config_path)?;
    if let Some(mode) = settings.mode {
        config.engine.mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let config = match load_config(&settings) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!(
        "Configuration loaded from {}: {} target(s), updater {}, mode {:?}",
        settings.config_path,
        config.targets.len(),
        config.updater.type_name(),
        config.engine.mode
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (engine, event_rx) = match build_engine(config).await {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(engine, event_rx).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build every component named by the configuration
async fn build_engine(
    config: DdnsConfig,
) -> Result<(ReconciliationLoop, mpsc::Receiver<EngineEvent>)> {
    let resolver: Box<dyn AddressResolver> =
        Box::new(HttpAddressResolver::from_config(&config.resolver)?);
    info!("Resolver: {}", config.resolver.url);

    let updater: Box<dyn RecordUpdater> = match &config.updater {
        UpdaterConfig::Direct => {
            let provider = CloudflareProvider::new()?;
            Box::new(DirectUpdater::new(Arc::new(provider)))
        }
        relay @ UpdaterConfig::Relay { .. } => {
            let updater = RelayUpdater::from_config(relay)?;
            info!("Relay endpoint: {}", updater.endpoint());
            Box::new(updater)
        }
    };

    let state_store: Box<dyn StateStore> = match &config.state_store {
        StateStoreConfig::Text { dir } => Box::new(TextFileStateStore::new(dir)),
        StateStoreConfig::File { path } => Box::new(
            FileStateStore::new(path)
                .await
                .with_context(|| format!("Failed to open state file {}", path))?,
        ),
        StateStoreConfig::Memory => Box::new(MemoryStateStore::new()),
    };

    for target in &config.targets {
        info!(
            "Managing {} record {}: {}",
            target.record_type,
            target.label(),
            target.domain_names.join(", ")
        );
    }

    Ok(ReconciliationLoop::new(
        resolver,
        updater,
        state_store,
        config,
    )?)
}

/// Run the loop until a shutdown signal arrives
async fn run_daemon(
    engine: ReconciliationLoop,
    mut event_rx: mpsc::Receiver<EngineEvent>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let signals = tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Signal handling error: {:#}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let events = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let result = engine.run_with_shutdown(Some(shutdown_rx)).await;

    signals.abort();
    drop(engine);
    let _ = events.await;

    result?;
    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}

// # ddns-relayd - DDNS Relay Daemon
//
// Thin integration layer around ddns-relay:
// 1. Reads configuration from environment variables
// 2. Binds the listener
// 3. Serves the relay router until SIGTERM/SIGINT, then drains in-flight requests
//
// ## Environment
//
// - `RELAY_BIND`: Listen address (default `0.0.0.0:12322`)
// - `RELAY_CLIENT_KEYS`: Comma-separated client keys; the position is the client id
// - `RELAY_CONFIG`: JSON file `{"CLIENTS": [..]}`, used when `RELAY_CLIENT_KEYS` is unset
// - `RELAY_PROVIDER_TIMEOUT_SECS`: Provider call timeout (default 30)
// - `RELAY_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)

use anyhow::{Context, Result};
use ddns_provider_cloudflare::{CLOUDFLARE_API_BASE, CloudflareProvider, UpdateMethod};
use ddns_relay::{RelayConfig, RelayState, router};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum RelayExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or bind failure
    StartupError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<RelayExitCode> for ExitCode {
    fn from(code: RelayExitCode) -> Self {
        ExitCode::from(code as u8)
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

fn main() -> ExitCode {
    let log_level = env::var("RELAY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let Some(log_level) = parse_log_level(&log_level) else {
        eprintln!(
            "RELAY_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            log_level
        );
        return RelayExitCode::StartupError.into();
    };

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RelayExitCode::StartupError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RelayExitCode::StartupError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RelayExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let (listener, state) = match startup(&config).await {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return RelayExitCode::StartupError;
            }
        };

        if let Err(e) = serve(listener, state).await {
            error!("Relay error: {:#}", e);
            RelayExitCode::RuntimeError
        } else {
            RelayExitCode::CleanShutdown
        }
    })
    .into()
}

/// Build the provider and bind the listener
async fn startup(config: &RelayConfig) -> Result<(TcpListener, RelayState)> {
    let provider = CloudflareProvider::with_api_base(
        CLOUDFLARE_API_BASE,
        UpdateMethod::Patch,
        config.provider_timeout(),
    )?;
    let state = RelayState::new(config.clients.clone(), Arc::new(provider));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!(
        "Relay listening on {} ({} client slot(s), provider timeout {:?})",
        config.bind,
        state.client_count(),
        config.provider_timeout()
    );

    Ok((listener, state))
}

async fn serve(listener: TcpListener, state: RelayState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Signal handling error: {:#}", e),
            }
        })
        .await
        .context("Server error")?;

    info!("Relay stopped");
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

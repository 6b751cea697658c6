//! Relay service configuration
//!
//! Loaded from the environment:
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `RELAY_BIND` | `0.0.0.0:12322` | listen address |
//! | `RELAY_CLIENT_KEYS` | - | comma-separated allow-list; index = client id |
//! | `RELAY_CONFIG` | - | JSON file `{"CLIENTS": [..]}`, used when `RELAY_CLIENT_KEYS` is unset |
//! | `RELAY_PROVIDER_TIMEOUT_SECS` | `30` | provider call timeout |

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use ddns_core::{Error, Result};
use serde::Deserialize;

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:12322";

/// Default provider call timeout (seconds)
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Allow-list file format
#[derive(Deserialize)]
struct ClientsFile {
    #[serde(rename = "CLIENTS")]
    clients: Vec<String>,
}

/// Relay service configuration
#[derive(Clone)]
pub struct RelayConfig {
    /// Listen address
    pub bind: SocketAddr,

    /// Client keys; the index is the client id
    /// ⚠️ NEVER log these values
    pub clients: Vec<String>,

    /// Provider call timeout in seconds
    pub provider_timeout_secs: u64,
}

impl RelayConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("RELAY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse()
            .map_err(|e| Error::config(format!("Invalid RELAY_BIND '{}': {}", bind, e)))?;

        let clients = match (lookup("RELAY_CLIENT_KEYS"), lookup("RELAY_CONFIG")) {
            (Some(keys), _) => parse_client_keys(&keys),
            (None, Some(path)) => load_clients_file(&path)?,
            (None, None) => Vec::new(),
        };

        let provider_timeout_secs = match lookup("RELAY_PROVIDER_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| {
                Error::config(format!("Invalid RELAY_PROVIDER_TIMEOUT_SECS '{}'", value))
            })?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        let config = Self {
            bind,
            clients,
            provider_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.clients.iter().all(String::is_empty) {
            return Err(Error::config(
                "No relay clients configured (set RELAY_CLIENT_KEYS or RELAY_CONFIG)",
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(Error::config("Provider timeout must be > 0"));
        }
        Ok(())
    }

    /// Provider call timeout
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind", &self.bind)
            .field("clients", &format!("<{} REDACTED>", self.clients.len()))
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .finish()
    }
}

/// Split a comma-separated allow-list, keeping positions
///
/// Empty slots are kept so that later ids keep their index; an empty key
/// can never authenticate.
fn parse_client_keys(keys: &str) -> Vec<String> {
    keys.split(',').map(|key| key.trim().to_string()).collect()
}

fn load_clients_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "could not read relay config file {}: {}",
            path.display(),
            e
        ))
    })?;
    let file: ClientsFile = serde_json::from_str(&json)
        .map_err(|e| Error::config(format!("could not parse relay config file: {}", e)))?;
    Ok(file.clients)
}

//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate.
//! The daemon loads [`DdnsConfig`] from a JSON document.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::traits::UpdateTarget;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Discovery endpoint configuration
    pub resolver: ResolverConfig,

    /// How record updates are applied
    #[serde(default)]
    pub updater: UpdaterConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// DNS records to keep in sync
    pub targets: Vec<UpdateTarget>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("could not parse config: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "could not read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.targets.is_empty() {
            return Err(crate::Error::config("No targets configured"));
        }

        for target in &self.targets {
            target.validate()?;
        }

        self.resolver.validate()?;
        self.updater.validate()?;
        self.state_store.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

fn validate_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.trim().is_empty() {
        return Err(crate::Error::config(format!("{} URL cannot be empty", what)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} URL must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

/// Discovery endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// URL returning the caller's address
    pub url: String,

    /// Client id for own-hosted discovery services
    #[serde(default)]
    pub client_id: Option<u32>,

    /// Client key for own-hosted discovery services
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub client_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_resolver_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Create a resolver configuration for a bare URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_id: None,
            client_key: None,
            timeout_secs: default_resolver_timeout_secs(),
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        validate_url("Resolver", &self.url)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Resolver timeout must be > 0"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_key", &self.client_key.as_ref().map(|_| "<REDACTED>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// How record updates are applied
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdaterConfig {
    /// Call the DNS provider directly with each target's credential
    #[default]
    Direct,

    /// Forward each update to a relay service
    Relay {
        /// Relay base URL
        url: String,
        /// Relay-level client id (index into the relay's allow-list)
        client_id: u32,
        /// Relay-level client key
        /// ⚠️ NEVER log this value
        client_key: String,
        /// Request timeout in seconds
        #[serde(default = "default_relay_timeout_secs")]
        timeout_secs: u64,
    },
}

impl UpdaterConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        match self {
            UpdaterConfig::Direct => Ok(()),
            UpdaterConfig::Relay {
                url,
                client_key,
                timeout_secs,
                ..
            } => {
                validate_url("Relay", url)?;
                if client_key.is_empty() {
                    return Err(crate::Error::config("Relay client key cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Relay timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the updater type name
    pub fn type_name(&self) -> &'static str {
        match self {
            UpdaterConfig::Direct => "direct",
            UpdaterConfig::Relay { .. } => "relay",
        }
    }
}

impl std::fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdaterConfig::Direct => f.write_str("Direct"),
            UpdaterConfig::Relay {
                url,
                client_id,
                timeout_secs,
                ..
            } => f
                .debug_struct("Relay")
                .field("url", url)
                .field("client_id", client_id)
                .field("client_key", &"<REDACTED>")
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

/// State store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// Plain-text file per key: `{dir}/{key}.last`
    Text {
        /// Directory holding the state files
        #[serde(default = "default_state_dir")]
        dir: String,
    },

    /// JSON state file with backup recovery
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    Memory,
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        StateStoreConfig::Text {
            dir: default_state_dir(),
        }
    }
}

impl StateStoreConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Persistence policy applied by the reconciliation loop
///
/// A loop applies exactly one policy for its whole life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePolicy {
    /// Persist only when every attempted update succeeded; otherwise keep
    /// the previous address and retry after `retry_delay_secs`
    #[default]
    Confirmatory,

    /// Persist after the attempts regardless of their outcome; failed names
    /// are not retried until the address changes again
    Optimistic,
}

/// Whether provider calls are issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Issue real updates
    #[default]
    Live,

    /// Resolve, compare and persist, but never call the updater
    Development,
}

impl Mode {
    /// Parse a mode name (`live`, `development`, `dev`, `dry-run`)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "live" | "production" => Some(Mode::Live),
            "development" | "dev" | "dry-run" => Some(Mode::Development),
            _ => None,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Polling interval (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Delay before the next cycle after a confirmatory cycle with failures
    /// (in seconds); 0 re-cycles immediately
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// When the resolved address is persisted
    #[serde(default)]
    pub persistence_policy: PersistencePolicy,

    /// Key of this loop's entry in the state store
    #[serde(default = "default_state_key")]
    pub state_key: String,

    /// Live or development (dry-run) mode
    #[serde(default)]
    pub mode: Mode,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Polling interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Delay after a failed confirmatory cycle
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Polling interval must be > 0"));
        }
        if self.state_key.trim().is_empty() {
            return Err(crate::Error::config("State key cannot be empty"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            persistence_policy: PersistencePolicy::default(),
            state_key: default_state_key(),
            mode: Mode::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_resolver_timeout_secs() -> u64 {
    10
}

fn default_relay_timeout_secs() -> u64 {
    30
}

fn default_state_dir() -> String {
    ".".to_string()
}

fn default_interval_secs() -> u64 {
    300
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_state_key() -> String {
    "ip".to_string()
}

fn default_event_channel_capacity() -> usize {
    100
}

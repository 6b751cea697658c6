//! Relay client
//!
//! [`RelayUpdater`] forwards each record update to a relay service instead of
//! calling the DNS provider. The relay authenticates the host with its own
//! client id/key; the target's provider credential rides in the body.
//!
//! One request carries exactly one target's credential.

use std::time::Duration;

use async_trait::async_trait;
use ddns_core::config::UpdaterConfig;
use ddns_core::traits::{RecordUpdater, UpdateOutcome, UpdateTarget};
use ddns_core::{Address, Error, Result};
use tracing::{info, warn};

use crate::wire::RelayResponse;

/// Default relay request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const UPDATE_PATH: &str = "/update-dns";

/// Applies updates through a relay service
pub struct RelayUpdater {
    /// `{base}/update-dns`
    endpoint: String,

    /// Index into the relay's allow-list
    client_id: u32,

    /// ⚠️ NEVER log this value
    client_key: String,

    client: reqwest::Client,
}

impl RelayUpdater {
    /// Create a relay updater for the relay at `base_url`
    pub fn new(
        base_url: &str,
        client_id: u32,
        client_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), UPDATE_PATH),
            client_id,
            client_key: client_key.into(),
            client,
        })
    }

    /// Create from the `relay` updater configuration
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        match config {
            UpdaterConfig::Relay {
                url,
                client_id,
                client_key,
                timeout_secs,
            } => Self::new(
                url,
                *client_id,
                client_key.clone(),
                Duration::from_secs(*timeout_secs),
            ),
            other => Err(Error::config(format!(
                "RelayUpdater requires a relay updater config, got {}",
                other.type_name()
            ))),
        }
    }

    /// The relay update endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for RelayUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayUpdater")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_key", &"<REDACTED>")
            .finish()
    }
}

#[async_trait]
impl RecordUpdater for RelayUpdater {
    async fn apply(&self, target: &UpdateTarget, name: &str, address: &Address) -> UpdateOutcome {
        let update = target.record_update(name, address);

        let result = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client_id", self.client_id.to_string()),
                ("client_key", self.client_key.clone()),
            ])
            .json(&update)
            .send()
            .await;

        // The URL carries the client key: strip it from transport errors
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let e = e.without_url();
                warn!("Relay request for {} failed: {}", name, e);
                return UpdateOutcome::failed(target, name, None, e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let e = e.without_url();
                warn!("Failed to read relay response for {}: {}", name, e);
                return UpdateOutcome::failed(target, name, Some(status.as_u16()), e.to_string());
            }
        };

        match serde_json::from_str::<RelayResponse>(&body) {
            Ok(reply) if status.is_success() && reply.success => {
                info!("DNS record for {} updated to {} via relay", name, address);
                UpdateOutcome::succeeded(target, name, Some(status.as_u16()), reply.message)
            }
            _ => {
                warn!("Relay rejected update for {}: {} - {}", name, status, body);
                UpdateOutcome::failed(target, name, Some(status.as_u16()), body)
            }
        }
    }

    fn updater_name(&self) -> &'static str {
        "relay"
    }
}

//! Direct record updater
//!
//! The polling host holds each target's credential and calls the DNS
//! provider itself.

use async_trait::async_trait;
use std::sync::Arc;

use crate::Error;
use crate::address::Address;
use crate::traits::{DnsProvider, RecordUpdater, UpdateOutcome, UpdateTarget};

/// Applies updates by calling the DNS provider with the target's own credential
pub struct DirectUpdater {
    provider: Arc<dyn DnsProvider>,
}

impl DirectUpdater {
    /// Create a direct updater over a provider
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RecordUpdater for DirectUpdater {
    async fn apply(&self, target: &UpdateTarget, name: &str, address: &Address) -> UpdateOutcome {
        let update = target.record_update(name, address);

        match self.provider.update_record(&update).await {
            Ok(response) if response.is_success() => {
                tracing::info!(
                    "DNS record for {} updated to {} via {}",
                    name,
                    address,
                    self.provider.provider_name()
                );
                UpdateOutcome::succeeded(
                    target,
                    name,
                    Some(response.status),
                    format!("DNS record updated successfully for {}", name),
                )
            }
            Ok(response) => {
                let error = Error::provider(
                    self.provider.provider_name(),
                    format!("{} - {}", response.status, response.body),
                );
                tracing::warn!("Update for {} rejected: {}", name, error);
                UpdateOutcome::failed(target, name, Some(response.status), response.body)
            }
            Err(e) => {
                tracing::warn!("Update request for {} failed: {}", name, e);
                UpdateOutcome::failed(target, name, None, e.to_string())
            }
        }
    }

    fn updater_name(&self) -> &'static str {
        "direct"
    }
}

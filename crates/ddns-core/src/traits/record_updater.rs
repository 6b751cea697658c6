// # Record Updater Trait
//
// Defines the interface for applying one DNS record update: one target,
// one domain name, one address.
//
// ## Implementations
//
// - `DirectUpdater` (this crate): calls the DNS provider with the target's credential
// - `RelayUpdater` (`ddns-relay` crate): forwards the update to a relay service
//
// Both variants carry exactly one target's credential per call.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::address::Address;
use crate::traits::dns_provider::RecordUpdate;

/// One DNS record to keep in sync with the current address
///
/// Each entry in `domain_names` is updated independently using the same
/// credential and zone/record coordinates.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTarget {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone identifier
    pub zone_id: String,

    /// Record identifier within the zone
    pub record_id: String,

    /// Record type (A, AAAA, CNAME, ...)
    pub record_type: String,

    /// Names to point at the address, in update order
    ///
    /// Accepts either a list or a comma-separated string.
    #[serde(deserialize_with = "deserialize_domain_names")]
    pub domain_names: Vec<String>,

    /// Time-to-live
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Whether the record is proxied by the provider
    #[serde(default)]
    pub proxied: bool,
}

impl UpdateTarget {
    /// Create a target with the default TTL and no proxying
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        record_type: impl Into<String>,
        domain_names: Vec<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            record_type: record_type.into(),
            domain_names,
            ttl: default_ttl(),
            proxied: false,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable proxying
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Short identifier for logs: `zone_id/record_id`
    pub fn label(&self) -> String {
        format!("{}/{}", self.zone_id, self.record_id)
    }

    /// Build the provider payload for one of this target's names
    pub fn record_update(&self, name: &str, address: &Address) -> RecordUpdate {
        RecordUpdate {
            api_token: self.api_token.clone(),
            zone_id: self.zone_id.clone(),
            record_id: self.record_id.clone(),
            record_type: self.record_type.clone(),
            name: name.to_string(),
            content: address.to_string(),
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }

    /// Validate that every coordinate is present
    pub fn validate(&self) -> Result<(), crate::Error> {
        let label = self.label();
        for (field, value) in [
            ("api_token", &self.api_token),
            ("zone_id", &self.zone_id),
            ("record_id", &self.record_id),
            ("record_type", &self.record_type),
        ] {
            if value.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "target {}: {} cannot be empty",
                    label, field
                )));
            }
        }

        if self.domain_names.is_empty() {
            return Err(crate::Error::config(format!(
                "target {}: at least one domain name is required",
                label
            )));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for UpdateTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateTarget")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("record_type", &self.record_type)
            .field("domain_names", &self.domain_names)
            .field("ttl", &self.ttl)
            .field("proxied", &self.proxied)
            .finish()
    }
}

fn default_ttl() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DomainNames {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_domain_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match DomainNames::deserialize(deserializer)? {
        DomainNames::List(names) => names,
        DomainNames::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Result of one record update attempt
///
/// Never persisted; consumed by the loop for logging and the persistence decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Target label (`zone_id/record_id`)
    pub target: String,
    /// The name that was updated
    pub domain_name: String,
    /// Whether the record now points at the address
    pub success: bool,
    /// Provider (or relay) HTTP status, if a response was received
    pub provider_status: Option<u16>,
    /// Human-readable detail; the raw provider body on failure
    pub message: String,
}

impl UpdateOutcome {
    /// A successful outcome
    pub fn succeeded(
        target: &UpdateTarget,
        domain_name: &str,
        provider_status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.label(),
            domain_name: domain_name.to_string(),
            success: true,
            provider_status,
            message: message.into(),
        }
    }

    /// A failed outcome
    pub fn failed(
        target: &UpdateTarget,
        domain_name: &str,
        provider_status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.label(),
            domain_name: domain_name.to_string(),
            success: false,
            provider_status,
            message: message.into(),
        }
    }
}

/// Trait for record updater implementations
///
/// # Contract
///
/// - Failures are reported in the returned [`UpdateOutcome`], never as errors,
///   so one failing name cannot stop the loop from attempting the others
/// - Each call carries exactly one target's credential
/// - No retries: a failed update is retried on the next scheduled cycle
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Point `name` (one of `target.domain_names`) at `address`
    async fn apply(&self, target: &UpdateTarget, name: &str, address: &Address) -> UpdateOutcome;

    /// Name of this updater (for logging)
    fn updater_name(&self) -> &'static str;
}

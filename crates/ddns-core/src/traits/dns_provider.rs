// # DNS Provider Trait
//
// Defines the single provider call the system needs: update one DNS record
// identified by zone and record id, authenticated by a per-call credential.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Callers
//
// - `DirectUpdater` (polling host holds the credential)
// - The relay service (credential arrives inside the relay request)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One record update, carrying exactly one target's credential
///
/// The serialized form is the relay's `DNSUpdateRequest` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub api_token: String,
    /// Zone identifier
    pub zone_id: String,
    /// Record identifier within the zone
    pub record_id: String,
    /// Record type (A, AAAA, CNAME, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// Record content (the address)
    pub content: String,
    /// Time-to-live; 1 means "automatic" for Cloudflare
    pub ttl: u32,
    /// Whether the record is proxied by the provider
    pub proxied: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for RecordUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordUpdate")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("record_type", &self.record_type)
            .field("name", &self.name)
            .field("content", &self.content)
            .field("ttl", &self.ttl)
            .field("proxied", &self.proxied)
            .finish()
    }
}

/// Raw provider answer: HTTP status plus the untouched response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, verbatim
    pub body: String,
}

impl ProviderResponse {
    /// Providers signal a successful record update with HTTP 200
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The body as JSON, or as a JSON string when it isn't valid JSON
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|_| serde_json::Value::String(self.body.clone()))
    }
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Return the provider's status and body
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (owned by `ReconciliationLoop`)
/// - ❌ Hold credentials beyond one call
/// - ❌ Access the state store
///
/// A provider never decides success: any HTTP answer is returned as a
/// [`ProviderResponse`]. Only transport failures (connect, timeout, body
/// read) are errors.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Update one DNS record
    ///
    /// # Returns
    ///
    /// - `Ok(ProviderResponse)`: The provider answered (any status)
    /// - `Err(Error::Http)`: The provider could not be reached
    async fn update_record(&self, update: &RecordUpdate)
    -> Result<ProviderResponse, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

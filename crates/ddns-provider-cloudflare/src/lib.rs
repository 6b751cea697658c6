// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the DDNS system.
//
// ## Behavior
//
// - ✅ Makes exactly one HTTP request per call
// - ✅ Returns Cloudflare's status and raw body untouched; the caller decides
//   what success means
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ PUT (full replace) or PATCH (partial update) of the record
// - ❌ NO retry logic (owned by ReconciliationLoop)
// - ❌ NO zone or record lookup: ids come with every update
// - ❌ NO stored credentials: the token travels with each `RecordUpdate`
// - Zone and record ids are percent-encoded as single path segments; dot
//   segments are rejected
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - Transport errors are reported without the request URL
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, ProviderResponse, RecordUpdate};
use ddns_core::{Error, Result};
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method used for the record update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMethod {
    /// Overwrite the whole record (used by the polling host)
    #[default]
    Put,
    /// Update the given fields only (used by the relay)
    Patch,
}

/// Request body sent to Cloudflare
#[derive(Debug, Serialize)]
struct RecordBody<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl<'a> From<&'a RecordUpdate> for RecordBody<'a> {
    fn from(update: &'a RecordUpdate) -> Self {
        Self {
            record_type: &update.record_type,
            name: &update.name,
            content: &update.content,
            ttl: update.ttl,
            proxied: update.proxied,
        }
    }
}

/// Cloudflare DNS provider
///
/// # Trust Level: Untrusted
///
/// This provider is isolated, stateless, and single-shot. It holds no
/// credential: every [`RecordUpdate`] carries its own API token.
#[derive(Debug, Clone)]
pub struct CloudflareProvider {
    /// API base URL (overridable for tests)
    api_base: Url,

    /// PUT or PATCH
    method: UpdateMethod,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl CloudflareProvider {
    /// Create a provider using PUT against the public API
    pub fn new() -> Result<Self> {
        Self::with_method(UpdateMethod::Put)
    }

    /// Create a provider using the given method against the public API
    pub fn with_method(method: UpdateMethod) -> Result<Self> {
        Self::with_api_base(CLOUDFLARE_API_BASE, method, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a provider against another API base URL
    pub fn with_api_base(
        api_base: impl Into<String>,
        method: UpdateMethod,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = api_base.into();
        let api_base = Url::parse(&api_base)
            .map_err(|e| Error::config(format!("Invalid Cloudflare API base {}: {}", api_base, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Cloudflare API base cannot carry a path: {}",
                api_base
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            method,
            client,
        })
    }

    /// The method used for updates
    pub fn method(&self) -> UpdateMethod {
        self.method
    }

    fn record_url(&self, update: &RecordUpdate) -> Result<Url> {
        for id in [update.zone_id.as_str(), update.record_id.as_str()] {
            if matches!(id, "" | "." | "..") {
                return Err(Error::provider(
                    "cloudflare",
                    format!("Invalid zone or record id: {:?}", id),
                ));
            }
        }

        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("Cloudflare API base cannot carry a path"))?
            .pop_if_empty()
            .extend([
                "zones",
                update.zone_id.as_str(),
                "dns_records",
                update.record_id.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn update_record(&self, update: &RecordUpdate) -> Result<ProviderResponse> {
        let url = self.record_url(update)?;
        let request = match self.method {
            UpdateMethod::Put => self.client.put(url),
            UpdateMethod::Patch => self.client.patch(url),
        };

        tracing::debug!(
            "Cloudflare {:?} {} ({} -> {})",
            self.method,
            update.record_id,
            update.name,
            update.content
        );

        let response = request
            .bearer_auth(&update.api_token)
            .json(&RecordBody::from(update))
            .send()
            .await
            .map_err(|e| Error::http(format!("Cloudflare request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read Cloudflare response: {}", e)))?;

        if status != 200 {
            tracing::debug!("Cloudflare answered {} for {}", status, update.name);
        }

        Ok(ProviderResponse { status, body })
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

// # HTTP Address Resolver
//
// This crate provides an HTTP-based address resolver for the DDNS system.
//
// ## Architecture
//
// Issues one GET per call against a discovery endpoint that answers with
// the caller's address as plain text (e.g. api.ipify.org, ifconfig.me, or
// an own-hosted "who am I" service).
//
// - Own-hosted services may require `?id=<client_id>&key=<client_key>`;
//   the query is only sent when both are configured
// - Multi-homed services may answer `a, b`; only the first element is used
// - Nothing is cached: every call is a live lookup

use ddns_core::config::ResolverConfig;
use ddns_core::traits::AddressResolver;
use ddns_core::{Address, Error, Result};

use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP discovery endpoint resolver
pub struct HttpAddressResolver {
    /// Discovery endpoint URL
    url: String,

    /// Optional credentials for own-hosted services
    credentials: Option<(u32, String)>,

    /// HTTP client (carries the timeout)
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a resolver for a bare URL with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::build(url.into(), None, DEFAULT_TIMEOUT)
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let credentials = match (config.client_id, &config.client_key) {
            (Some(id), Some(key)) => Some((id, key.clone())),
            _ => None,
        };
        Self::build(config.url.clone(), credentials, config.timeout())
    }

    /// Attach discovery credentials
    pub fn with_credentials(mut self, client_id: u32, client_key: impl Into<String>) -> Self {
        self.credentials = Some((client_id, client_key.into()));
        self
    }

    fn build(url: String, credentials: Option<(u32, String)>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            credentials,
            client,
        })
    }

    /// Fetch the raw discovery body
    async fn fetch(&self) -> Result<String> {
        let mut request = self.client.get(&self.url);
        if let Some((id, key)) = &self.credentials {
            request = request.query(&[("id", id.to_string()), ("key", key.clone())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolution(format!("HTTP error: {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("Failed to read response: {}", e)))
    }
}

impl std::fmt::Debug for HttpAddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAddressResolver")
            .field("url", &self.url)
            .field("client_id", &self.credentials.as_ref().map(|(id, _)| id))
            .field(
                "client_key",
                &self.credentials.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

#[async_trait::async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<Address> {
        let body = self.fetch().await?;
        let address = Address::from_discovery_body(&body)?;
        tracing::debug!("Resolved address {} from {}", address, self.url);
        Ok(address)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}

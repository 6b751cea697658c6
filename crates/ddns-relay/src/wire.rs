//! Relay wire types
//!
//! The request body is a `RecordUpdate` (see `ddns-core`); on the server it is
//! parsed through [`UpdateDnsPayload`] so that missing fields can be reported
//! by name instead of as a generic parse failure.

use ddns_core::traits::RecordUpdate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relay-level credentials, sent as query parameters
#[derive(Clone, Default)]
pub struct ClientAuth {
    /// Index into the relay's allow-list
    pub client_id: Option<String>,
    /// Key expected at that index
    /// ⚠️ NEVER log this value
    pub client_key: Option<String>,
}

impl ClientAuth {
    /// Pick the credentials out of decoded query pairs
    ///
    /// The first occurrence of a repeated parameter wins; unknown parameters
    /// are ignored.
    pub fn from_query_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut auth = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "client_id" => &mut auth.client_id,
                "client_key" => &mut auth.client_key,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        auth
    }
}

impl std::fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuth")
            .field("client_id", &self.client_id)
            .field("client_key", &self.client_key.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Normalized relay answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,

    /// Provider payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Provider error body (or internal error detail) on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl RelayResponse {
    /// The provider accepted the update for `name`
    pub fn updated(name: &str, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: format!("DNS record updated successfully for {}", name),
            data,
            error: None,
        }
    }

    /// The provider rejected the update for `name`
    pub fn rejected(name: &str, error: Value) -> Self {
        Self {
            success: false,
            message: format!("Failed to update DNS record for {}", name),
            data: None,
            error: Some(error),
        }
    }

    /// A failure that never reached the provider
    pub fn failure(message: impl Into<String>, error: Option<Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}

/// Update request as received by the relay
///
/// Every field is optional at parse time; [`UpdateDnsPayload::into_record_update`]
/// enforces presence.
#[derive(Default, Deserialize)]
pub struct UpdateDnsPayload {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

impl UpdateDnsPayload {
    /// Names of the required fields that are absent or empty, in wire order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("api_token", &self.api_token),
            ("zone_id", &self.zone_id),
            ("record_id", &self.record_id),
            ("type", &self.record_type),
            ("name", &self.name),
            ("content", &self.content),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(field, _)| field)
        .collect()
    }

    /// Validate and convert, applying defaults (`ttl` 0 or absent → 1,
    /// `proxied` absent → false)
    ///
    /// On failure, returns the missing field names.
    pub fn into_record_update(self) -> Result<RecordUpdate, Vec<&'static str>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(RecordUpdate {
            api_token: self.api_token.unwrap_or_default(),
            zone_id: self.zone_id.unwrap_or_default(),
            record_id: self.record_id.unwrap_or_default(),
            record_type: self.record_type.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            ttl: match self.ttl {
                None | Some(0) => 1,
                Some(ttl) => ttl,
            },
            proxied: self.proxied.unwrap_or(false),
        })
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for UpdateDnsPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateDnsPayload")
            .field("api_token", &self.api_token.as_ref().map(|_| "<REDACTED>"))
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

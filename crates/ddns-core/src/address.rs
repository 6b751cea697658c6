//! The resolved public address
//!
//! An [`Address`] is the textual IP value the loop keeps DNS pointed at.
//! It is created fresh on every poll and compared bytewise against the
//! last applied value.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single public IP address (v4 or v6), kept in its textual form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse an address from text
    ///
    /// Surrounding whitespace is trimmed. The remainder must be a valid
    /// IPv4 or IPv6 address.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::resolution("empty address"));
        }

        text.parse::<IpAddr>()
            .map_err(|_| Error::resolution(format!("invalid IP address: {}", text)))?;

        Ok(Self(text.to_string()))
    }

    /// Extract the address from a discovery endpoint body
    ///
    /// Multi-homed resolver services may return a comma-separated list;
    /// only the first element is used.
    pub fn from_discovery_body(body: &str) -> Result<Self> {
        let first = body.split(',').next().unwrap_or_default();
        Self::parse(first)
    }

    /// The address as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address as a typed IP
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }

    /// Whether this is an IPv6 address
    pub fn is_ipv6(&self) -> bool {
        self.ip().is_some_and(|ip| ip.is_ipv6())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

// # ddns-relay
//
// Relay protocol for the DDNS system.
//
// A relay performs the DNS provider call on behalf of a polling host, so the
// host only needs network access to the relay. Both ends live here:
//
// - **Server side**: [`router`] builds the axum service (`/update-dns`,
//   `/health`, `/`), authenticating callers against an index-addressed
//   allow-list of client keys
// - **Client side**: [`RelayUpdater`] implements `RecordUpdater` by
//   forwarding one record update per request
//
// ## Wire Contract
//
// ```text
// POST /update-dns?client_id=<index>&client_key=<key>
// { "api_token", "zone_id", "record_id", "type", "name", "content", "ttl", "proxied" }
//
// → { "success": bool, "message": string, "data"?: any, "error"?: any }
// ```

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod wire;

pub use client::RelayUpdater;
pub use config::RelayConfig;
pub use error::RelayError;
pub use server::{RelayState, router};
pub use wire::{ClientAuth, RelayResponse, UpdateDnsPayload};
